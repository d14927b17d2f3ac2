/// Digital filter design and application
pub mod filter;

/// Frequency and time-domain analysis of designed filters
pub mod response;

/// Magnitude spectra
pub mod spectral;

/// Capability traits implemented by the engine kernels
pub mod traits;

/// Waveform and test-signal generation
pub mod wave;

use core::{error, fmt};

/// Errors raised whilst running sigforge.
///
/// Every variant is a deterministic function of the caller's input, so none
/// of them are worth retrying without changing that input.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A parameter was malformed or out of range.
    InvalidSpec {
        /// The offending field.
        field: String,
        /// Explaining why the field is invalid.
        reason: String,
    },
    /// The design method has no formula for the requested band type.
    UnsupportedCombination {
        /// Requested design method.
        design: String,
        /// Requested band type.
        band: String,
    },
    /// The transfer-function denominator evaluated to zero.
    DegenerateFilter {
        /// Frequency in Hz at which the denominator vanished.
        frequency: f64,
    },
    /// A required buffer had zero length.
    EmptyInput {
        /// Name of the empty argument.
        arg: String,
    },
}

impl Error {
    /// Shorthand for [`Error::InvalidSpec`].
    pub fn invalid_spec(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidSpec {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::EmptyInput`].
    pub fn empty_input(arg: impl Into<String>) -> Self {
        Error::EmptyInput { arg: arg.into() }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSpec { field, reason } => {
                write!(f, "Invalid specification `{field}`: {reason}")
            }
            Error::UnsupportedCombination { design, band } => {
                write!(f, "Design method `{design}` does not support `{band}` filters.")
            }
            Error::DegenerateFilter { frequency } => {
                write!(f, "Filter denominator vanished at {frequency} Hz.")
            }
            Error::EmptyInput { arg } => write!(f, "Input `{arg}` was empty."),
        }
    }
}

impl error::Error for Error {}

/// Result alias used across the workspace.
pub type Result<T> = core::result::Result<T, Error>;

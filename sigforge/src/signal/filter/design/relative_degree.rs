use nalgebra::Complex;

use crate::kernel::ExecInvariantViolation;

/// `len(poles) - len(zeros)`, rejecting improper transfer functions.
pub(crate) fn relative_degree_checked<F>(
    zeros: &[Complex<F>],
    poles: &[Complex<F>],
) -> Result<usize, ExecInvariantViolation> {
    poles
        .len()
        .checked_sub(zeros.len())
        .ok_or(ExecInvariantViolation::InvalidState {
            reason: "improper transfer function; poles must be >= zeros",
        })
}

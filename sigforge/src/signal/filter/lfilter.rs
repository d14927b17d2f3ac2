use ndarray::{Array1, ArrayView1};
use num_traits::NumAssign;
use sigforge_core::{Error, Result};

use super::{design::BaFormatFilter, LFilterConfig, LFilterKernel};
use crate::kernel::KernelLifecycle;
use crate::signal::traits::LFilter1D;

/// Direct-form difference equation
///
/// ```text
/// y[n] = sum_k b[k] x[n - k] - sum_{k >= 1} a[k] y[n - k]
/// ```
///
/// Samples before the start of `x` and `y` are taken as zero. `a[0]` is not
/// divided out, so coefficient sets with `a[0] != 1` are filtered exactly as
/// given.
pub(crate) fn direct_form<T>(b: &[T], a: &[T], x: &[T], y: &mut [T])
where
    T: NumAssign + Copy,
{
    for n in 0..x.len() {
        let mut acc = T::zero();
        for (k, bk) in b.iter().enumerate().take(n + 1) {
            acc += *bk * x[n - k];
        }
        for (k, ak) in a.iter().enumerate().skip(1).take(n) {
            acc -= *ak * y[n - k];
        }
        y[n] = acc;
    }
}

/// Filter `x` with the rational transfer function `b / a`.
///
/// The output has the same length as `x`.
///
/// # Errors
/// [`Error::EmptyInput`] if any of `b`, `a` or `x` is empty.
///
/// ```
/// use ndarray::array;
/// use sigforge::signal::filter::lfilter;
///
/// let b = array![5., 4., 1., 2.];
/// let a = array![1.];
/// let x = array![1., 2., 3., 4., 3., 5., 6.];
/// let y = lfilter(b.view(), a.view(), x.view()).unwrap();
/// assert_eq!(y.to_vec(), vec![5., 14., 24., 36., 38., 47., 61.]);
/// ```
pub fn lfilter<T>(b: ArrayView1<T>, a: ArrayView1<T>, x: ArrayView1<T>) -> Result<Array1<T>>
where
    T: NumAssign + Copy,
{
    let kernel = LFilterKernel::try_new(LFilterConfig {
        b: b.to_vec(),
        a: a.to_vec(),
    })?;
    // Strided views are copied rather than rejected.
    let x = x.to_vec();
    Ok(Array1::from_vec(kernel.run_alloc(&x)?))
}

/// Slice-based [`lfilter`].
pub fn lfilter_dyn<T>(b: &[T], a: &[T], x: &[T]) -> Result<Vec<T>>
where
    T: NumAssign + Copy,
{
    let kernel = LFilterKernel::try_new(LFilterConfig {
        b: b.to_vec(),
        a: a.to_vec(),
    })?;
    kernel.run_alloc(x).map_err(Error::from)
}

/// Run a designed filter over `input`.
pub fn apply<T>(coeffs: &BaFormatFilter<T>, input: &[T]) -> Result<Vec<T>>
where
    T: NumAssign + Copy,
{
    lfilter_dyn(&coeffs.b, &coeffs.a, input)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn one_dim_fir() {
        {
            // b.sum() > 1.
            let b = array![5., 4., 1., 2.];
            let a = array![1.];
            let x = array![1., 2., 3., 4., 3., 5., 6.];
            let expected = array![5., 14., 24., 36., 38., 47., 61.];

            let result = lfilter(b.view(), a.view(), x.view()).expect("fir");
            assert_eq!(result, expected);
        }
        {
            // b[i] < 0 for some i, such that b.sum() = 1.
            let b = array![0.7, -0.3, 0.6];
            let a = array![1.];
            let x = array![1., 2., 3., 4., 3., 5., 6.];
            let expected = array![0.7, 1.1, 2.1, 3.1, 2.7, 5., 4.5];

            let result = lfilter(b.view(), a.view(), x.view()).expect("fir");
            assert_eq!(result.len(), expected.len());
            result.into_iter().zip(expected).for_each(|(r, e)| {
                assert_relative_eq!(r, e, max_relative = 1e-6);
            })
        }
    }

    #[test]
    fn one_pole_recursion() {
        // y[n] = x[n] + 0.5 y[n - 1]
        let y = lfilter_dyn(&[1.0f64], &[1.0, -0.5], &[1.0, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(y, vec![1.0, 0.5, 0.25, 0.125]);
    }

    #[test]
    fn leading_denominator_is_not_divided_out() {
        let y = lfilter_dyn(&[2.0f64], &[4.0, 0.0], &[1.0, 1.0]).unwrap();
        assert_eq!(y, vec![2.0, 2.0]);
    }

    #[test]
    fn output_length_tracks_input() {
        let b = [0.25f64, 0.5, 0.25, 0.1, 0.1];
        let y = lfilter_dyn(&b, &[1.0, -0.2], &[1.0, 2.0]).unwrap();
        assert_eq!(y.len(), 2);
        assert_relative_eq!(y[1], 0.25 * 2.0 + 0.5 * 1.0 + 0.2 * 0.25);
    }

    #[test]
    fn strided_view_is_filtered() {
        let x = array![1.0f64, 9.0, 2.0, 9.0, 3.0, 9.0];
        let view = x.slice(ndarray::s![..;2]);
        let b = array![1.0f64, 1.0];
        let a = array![1.0f64];
        let y = lfilter(b.view(), a.view(), view).unwrap();
        assert_eq!(y.to_vec(), vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn empty_operands_are_reported() {
        assert_eq!(
            lfilter_dyn::<f64>(&[1.0], &[1.0], &[]).unwrap_err(),
            Error::EmptyInput { arg: "x".into() }
        );
        assert_eq!(
            lfilter_dyn(&[], &[1.0], &[1.0]).unwrap_err(),
            Error::EmptyInput { arg: "b".into() }
        );
        let coeffs = BaFormatFilter::new(vec![1.0f64], Vec::new());
        assert_eq!(
            apply(&coeffs, &[1.0]).unwrap_err(),
            Error::EmptyInput { arg: "a".into() }
        );
    }
}

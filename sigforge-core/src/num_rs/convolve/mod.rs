use crate::{Error, Result};
use ndarray::{s, Array1, ArrayView1};
use num_traits::NumAssign;

/// Convolution mode determines behavior near edges and output size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConvolveMode {
    /// Full convolution, output size is `a.len() + v.len() - 1`
    #[default]
    Full,
    /// Valid convolution, output size is `max(a.len(), v.len()) - min(a.len(), v.len()) + 1`
    Valid,
    /// Same convolution, output size is `max(a.len(), v.len())`
    Same,
}

/// Best effort parallel behaviour with numpy's convolve method.
///
/// Returns the discrete, linear convolution of two one-dimensional sequences. Treating the
/// inputs as polynomial coefficient sequences, the [`ConvolveMode::Full`] output is the
/// coefficient sequence of their product, which is how filter sections are combined.
///
/// # Parameters
/// * `a` : (N,) [[array_like]]([ndarray::Array1])  
///   First one-dimensional input.
/// * `v` : (M,) [[array_like]]([ndarray::Array1])  
///   Second one-dimensional input.
/// * `mode` : [ConvolveMode]  
///   [ConvolveMode::Full]:  
///   Convolution at each point of overlap, with an output shape of (N+M-1,).
///
///   [ConvolveMode::Same]:  
///   Output of length ``max(M, N)``, centred with respect to the full output.
///
///   [ConvolveMode::Valid]:  
///   Output of length ``max(M, N) - min(M, N) + 1``, only where the inputs overlap completely.
///
/// # Errors
/// [`Error::EmptyInput`] if either operand has zero length.
///
/// # Examples
/// ```
/// use ndarray::array;
/// use sigforge_core::num_rs::{convolve, ConvolveMode};
///
/// let p = array![1., 2.];
/// let q = array![1., 1.];
/// let result = convolve(p.view(), q.view(), ConvolveMode::Full).unwrap();
/// assert_eq!(result, array![1., 3., 2.]);
/// ```
pub fn convolve<T>(a: ArrayView1<T>, v: ArrayView1<T>, mode: ConvolveMode) -> Result<Array1<T>>
where
    T: NumAssign + Copy,
{
    if a.is_empty() {
        return Err(Error::empty_input("a"));
    }
    if v.is_empty() {
        return Err(Error::empty_input("v"));
    }

    let n = a.len();
    let m = v.len();
    let mut full = Array1::from_elem(n + m - 1, T::zero());
    for (i, &ai) in a.iter().enumerate() {
        for (j, &vj) in v.iter().enumerate() {
            full[i + j] += ai * vj;
        }
    }

    let (long, short) = if n >= m { (n, m) } else { (m, n) };
    let out = match mode {
        ConvolveMode::Full => full,
        ConvolveMode::Same => {
            let start = (full.len() - long) / 2;
            full.slice(s![start..start + long]).to_owned()
        }
        ConvolveMode::Valid => {
            let start = short - 1;
            full.slice(s![start..start + long - short + 1]).to_owned()
        }
    };
    Ok(out)
}

/// Full-mode [`convolve`] over plain slices.
///
/// Polynomial products in the filter designers go through here.
pub fn polymul<T>(p: &[T], q: &[T]) -> Result<Vec<T>>
where
    T: NumAssign + Copy,
{
    convolve(ArrayView1::from(p), ArrayView1::from(q), ConvolveMode::Full).map(|out| out.to_vec())
}

#[cfg(test)]
mod linear_convolve {
    use super::*;
    use ndarray::array;

    #[test]
    fn full() {
        let a = array![1., 2., 3.];
        let v = array![0., 1., 0.5];

        let expected = array![0., 1., 2.5, 4., 1.5];
        let result = convolve(a.view(), v.view(), ConvolveMode::Full).unwrap();
        assert_eq!(result, expected);
    }

    #[test]
    fn same() {
        let a = array![1., 2., 3., 4.];
        let v = array![0., 1., 0.5];

        let expected = array![1., 2.5, 4., 5.5];
        let result = convolve(a.view(), v.view(), ConvolveMode::Same).unwrap();
        assert_eq!(result, expected);
    }

    #[test]
    fn valid_is_symmetric_in_operand_order() {
        let a = array![1., 2., 3.];
        let v = array![0., 1., 0.5];

        let expected = array![2.5];
        assert_eq!(
            convolve(a.view(), v.view(), ConvolveMode::Valid).unwrap(),
            expected
        );
        assert_eq!(
            convolve(v.view(), a.view(), ConvolveMode::Valid).unwrap(),
            expected
        );
    }

    #[test]
    fn polynomial_product() {
        assert_eq!(polymul(&[1., 2.], &[1., 1.]).unwrap(), vec![1., 3., 2.]);
        assert_eq!(polymul(&[3], &[1, -1, 2]).unwrap(), vec![3, -3, 6]);
    }

    #[test]
    fn empty_operands_are_rejected() {
        let empty: [f64; 0] = [];
        assert_eq!(
            polymul(&empty, &[1.0]).unwrap_err(),
            Error::EmptyInput { arg: "a".into() }
        );
        assert_eq!(
            polymul(&[1.0], &empty).unwrap_err(),
            Error::EmptyInput { arg: "v".into() }
        );
    }
}

use nalgebra::{Complex, RealField};

use super::ZpkFormatFilter;
use crate::complex::cmul;

/// Pole angles `theta_k = pi (2k + 1) / (2 N)`, `k = 0..N`.
fn pole_angles<F>(order: usize) -> impl Iterator<Item = (usize, F)>
where
    F: RealField + Copy,
{
    let two_n: F = nalgebra::convert(2.0 * order as f64);
    (0..order).map(move |k| {
        let num: F = nalgebra::convert((2 * k + 1) as f64);
        (k, F::pi() * num / two_n)
    })
}

/// Gain that makes the prototype's DC response `1`, i.e. `re(prod(-p))`.
fn unit_dc_gain<F>(p: &[Complex<F>]) -> F
where
    F: RealField + Copy,
{
    p.iter()
        .fold(Complex::new(F::one(), F::zero()), |acc, pk| {
            cmul(acc, Complex::new(-pk.re, -pk.im))
        })
        .re
}

/// Analog Butterworth lowpass prototype with unit cutoff.
///
/// The poles sit on the left half of the unit circle at
/// `-sin(theta_k) + j cos(theta_k)`. The middle pole of an odd order is
/// exactly real.
pub fn buttap<F>(order: usize) -> ZpkFormatFilter<F>
where
    F: RealField + Copy,
{
    let p = pole_angles::<F>(order)
        .map(|(k, theta)| {
            let im = if 2 * k + 1 == order {
                F::zero()
            } else {
                theta.cos()
            };
            Complex::new(-theta.sin(), im)
        })
        .collect::<Vec<_>>();
    let k = unit_dc_gain(&p);
    ZpkFormatFilter::new(Vec::new(), p, k)
}

/// Analog Chebyshev type I lowpass prototype with unit ripple-band edge.
///
/// `rp` is the peak-to-peak passband ripple in dB. With
/// `eps = sqrt(10^(rp/10) - 1)` and `v = asinh(1/eps) / N`, the poles are
/// `-sinh(v) sin(theta_k) + j cosh(v) cos(theta_k)`. Even orders start the
/// passband at the bottom of the ripple, so their gain is scaled by
/// `1 / sqrt(1 + eps^2)`.
pub fn cheb1ap<F>(order: usize, rp: F) -> ZpkFormatFilter<F>
where
    F: RealField + Copy,
{
    let ten: F = nalgebra::convert(10.0);
    let eps = (ten.powf(rp / ten) - F::one()).sqrt();
    let n: F = nalgebra::convert(order as f64);
    let v = (F::one() / eps).asinh() / n;
    let (sinh_v, cosh_v) = (v.sinh(), v.cosh());

    let p = pole_angles::<F>(order)
        .map(|(k, theta)| {
            let im = if 2 * k + 1 == order {
                F::zero()
            } else {
                cosh_v * theta.cos()
            };
            Complex::new(-sinh_v * theta.sin(), im)
        })
        .collect::<Vec<_>>();

    let mut k = unit_dc_gain(&p);
    if order % 2 == 0 {
        k /= (F::one() + eps * eps).sqrt();
    }
    ZpkFormatFilter::new(Vec::new(), p, k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::magnitude;
    use approx::assert_abs_diff_eq;

    #[test]
    fn butterworth_poles_lie_on_unit_circle() {
        let zpk = buttap::<f64>(5);
        assert!(zpk.z.is_empty());
        assert_eq!(zpk.p.len(), 5);
        zpk.p.iter().for_each(|p| {
            assert_abs_diff_eq!(magnitude(*p), 1.0, epsilon = 1e-12);
            assert!(p.re < 0.0);
        });
        assert_eq!(zpk.p[2], Complex::new(-1.0, 0.0));
        assert_abs_diff_eq!(zpk.k, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn chebyshev_poles_match_reference() {
        // scipy.signal.cheb1ap(3, 1.0)
        let zpk = cheb1ap::<f64>(3, 1.0);
        let mut p = zpk.p.clone();
        p.sort_by(|a, b| a.im.partial_cmp(&b.im).unwrap());
        assert_abs_diff_eq!(p[0].re, -0.24708530, epsilon = 1e-7);
        assert_abs_diff_eq!(p[0].im, -0.96599867, epsilon = 1e-7);
        assert_abs_diff_eq!(p[1].re, -0.49417060, epsilon = 1e-7);
        assert_abs_diff_eq!(p[1].im, 0.0);
        assert_abs_diff_eq!(zpk.k, 0.49130668, epsilon = 1e-7);
    }

    #[test]
    fn even_order_chebyshev_gain_sits_on_ripple_floor() {
        let rp = 0.5f64;
        let zpk = cheb1ap::<f64>(4, rp);
        let eps2 = 10f64.powf(rp / 10.0) - 1.0;
        let dc = unit_dc_gain(&zpk.p);
        assert_abs_diff_eq!(zpk.k * (1.0 + eps2).sqrt(), dc, epsilon = 1e-12);
    }
}

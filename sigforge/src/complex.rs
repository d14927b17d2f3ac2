//! Complex arithmetic over [`nalgebra::Complex`].
//!
//! These helpers are written against `RealField` rather than `Float` so that
//! filter synthesis stays generic over the scalar type.

use nalgebra::{Complex, RealField};

/// `a + b`.
#[inline]
pub fn cadd<F: RealField + Copy>(a: Complex<F>, b: Complex<F>) -> Complex<F> {
    Complex::new(a.re + b.re, a.im + b.im)
}

/// `a * b`.
#[inline]
pub fn cmul<F: RealField + Copy>(a: Complex<F>, b: Complex<F>) -> Complex<F> {
    Complex::new(a.re * b.re - a.im * b.im, a.re * b.im + a.im * b.re)
}

/// `a / b`.
///
/// Dividing by exactly `0 + 0j` yields non-finite parts; callers that can hit
/// a zero divisor check for it first.
#[inline]
pub fn cdiv<F: RealField + Copy>(a: Complex<F>, b: Complex<F>) -> Complex<F> {
    let den = b.re * b.re + b.im * b.im;
    Complex::new(
        (a.re * b.re + a.im * b.im) / den,
        (a.im * b.re - a.re * b.im) / den,
    )
}

/// `z^n` for any integer `n`, by repeated squaring.
pub fn cpowi<F: RealField + Copy>(z: Complex<F>, n: i32) -> Complex<F> {
    let one = Complex::new(F::one(), F::zero());
    if n == 0 {
        return one;
    }
    let mut base = if n < 0 { cdiv(one, z) } else { z };
    let mut exp = n.unsigned_abs();
    let mut acc = one;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = cmul(acc, base);
        }
        base = cmul(base, base);
        exp >>= 1;
    }
    acc
}

/// `|z|`.
#[inline]
pub fn magnitude<F: RealField + Copy>(z: Complex<F>) -> F {
    (z.re * z.re + z.im * z.im).sqrt()
}

/// `arg(z)` in radians on `(-pi, pi]`.
#[inline]
pub fn argument<F: RealField + Copy>(z: Complex<F>) -> F {
    z.im.atan2(z.re)
}

/// `r * e^{j theta}`.
#[inline]
pub fn from_polar<F: RealField + Copy>(r: F, theta: F) -> Complex<F> {
    Complex::new(r * theta.cos(), r * theta.sin())
}

/// `sum_i coeffs[i] * z^-i`, evaluated with Horner's scheme in `z^-1`.
pub fn polyval_inv<F: RealField + Copy>(coeffs: &[F], z: Complex<F>) -> Complex<F> {
    let zinv = cdiv(Complex::new(F::one(), F::zero()), z);
    coeffs
        .iter()
        .rev()
        .fold(Complex::new(F::zero(), F::zero()), |acc, &c| {
            cadd(cmul(acc, zinv), Complex::new(c, F::zero()))
        })
}

/// `prod_i (w - roots[i])`.
pub fn prod_diff<F: RealField + Copy>(w: Complex<F>, roots: &[Complex<F>]) -> Complex<F> {
    roots
        .iter()
        .fold(Complex::new(F::one(), F::zero()), |acc, r| {
            cmul(acc, Complex::new(w.re - r.re, w.im - r.im))
        })
}

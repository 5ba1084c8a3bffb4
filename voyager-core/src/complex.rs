use std::ops::{Add, Mul, Neg, Sub};
use std::sync::OnceLock;

use crate::error::{ArithmeticError, ConfigError};
use crate::functions::{special, FunctionRegistry};
use crate::value::{exact_exponent_in_range, ComplexValue};

/// A complex number represented as two `f64` components.
///
/// This is the hardware-precision backend: a lightweight, `Copy` type used by
/// the specialised Mandelbrot loop and anywhere 53 bits of mantissa suffice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };
    pub const ONE: Self = Self { re: 1.0, im: 0.0 };

    #[inline]
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Returns `re² + im²` without taking the square root.
    #[inline]
    pub fn norm_sq(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    /// Returns `√(re² + im²)`.
    #[inline]
    pub fn norm(self) -> f64 {
        self.re.hypot(self.im)
    }

    /// Principal argument in `(-π, π]`.
    #[inline]
    pub fn arg(self) -> f64 {
        self.im.atan2(self.re)
    }

    /// Division, or `None` when `rhs` is exactly zero.
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.re == 0.0 && rhs.im == 0.0 {
            return None;
        }
        let d = rhs.norm_sq();
        Some(Self {
            re: (self.re * rhs.re + self.im * rhs.im) / d,
            im: (self.im * rhs.re - self.re * rhs.im) / d,
        })
    }

    pub fn exp(self) -> Self {
        let m = self.re.exp();
        Self::new(m * self.im.cos(), m * self.im.sin())
    }

    /// Principal logarithm; `None` at zero.
    pub fn ln(self) -> Option<Self> {
        if self.re == 0.0 && self.im == 0.0 {
            return None;
        }
        Some(Self::new(self.norm().ln(), self.arg()))
    }

    pub fn sin(self) -> Self {
        Self::new(
            self.re.sin() * self.im.cosh(),
            self.re.cos() * self.im.sinh(),
        )
    }

    /// Principal square root (non-negative real part).
    pub fn sqrt(self) -> Self {
        if self.re == 0.0 && self.im == 0.0 {
            return Self::ZERO;
        }
        let r = self.norm();
        let re = ((r + self.re) / 2.0).sqrt();
        let im = ((r - self.re) / 2.0).sqrt();
        Self::new(re, if self.im < 0.0 { -im } else { im })
    }
}

// -- Arithmetic operators --

impl Add for Complex {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl Sub for Complex {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            re: self.re - rhs.re,
            im: self.im - rhs.im,
        }
    }
}

impl Mul for Complex {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            re: self.re * rhs.re - self.im * rhs.im,
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}

impl Neg for Complex {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            re: -self.re,
            im: -self.im,
        }
    }
}

impl ComplexValue for Complex {
    type Real = f64;
    type Context = ();

    const BACKEND: &'static str = "f64";

    #[inline]
    fn context(&self) {}

    #[inline]
    fn from_f64(_: (), re: f64, im: f64) -> Self {
        Self::new(re, im)
    }

    #[inline]
    fn real_from_f64(_: (), value: f64) -> f64 {
        value
    }

    #[inline]
    fn real_square_from_f64(_: (), value: f64) -> f64 {
        value * value
    }

    fn from_literal(_: (), re: &str, im: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(parse_component(re)?, parse_component(im)?))
    }

    fn precision_bits(_: ()) -> u32 {
        f64::MANTISSA_DIGITS
    }

    fn widen(_: (), _extra_bits: u32) {}

    fn with_context(&self, _: ()) -> Self {
        *self
    }

    fn standard_registry() -> &'static FunctionRegistry<Self> {
        static REGISTRY: OnceLock<FunctionRegistry<Complex>> = OnceLock::new();
        REGISTRY.get_or_init(FunctionRegistry::standard)
    }

    fn pi(_: ()) -> Self {
        Self::new(std::f64::consts::PI, 0.0)
    }

    #[inline]
    fn re_f64(&self) -> f64 {
        self.re
    }

    #[inline]
    fn im_f64(&self) -> f64 {
        self.im
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.re == 0.0 && self.im == 0.0
    }

    #[inline]
    fn norm_sq(&self) -> f64 {
        Complex::norm_sq(*self)
    }

    fn log2_abs(&self) -> f64 {
        Complex::norm(*self).log2()
    }

    fn as_small_integer(&self) -> Option<i32> {
        if self.im != 0.0 {
            return None;
        }
        exact_exponent_in_range(self.re)
    }

    fn is_real_integer(&self) -> bool {
        self.im == 0.0 && self.re.is_finite() && self.re.fract() == 0.0
    }

    #[inline]
    fn add(&self, rhs: &Self) -> Self {
        *self + *rhs
    }

    #[inline]
    fn sub(&self, rhs: &Self) -> Self {
        *self - *rhs
    }

    #[inline]
    fn mul(&self, rhs: &Self) -> Self {
        *self * *rhs
    }

    #[inline]
    fn neg(&self) -> Self {
        -*self
    }

    fn div(&self, rhs: &Self) -> Result<Self, ArithmeticError> {
        self.checked_div(*rhs).ok_or(ArithmeticError::DivisionByZero)
    }

    fn exp(&self) -> Self {
        Complex::exp(*self)
    }

    fn ln(&self) -> Result<Self, ArithmeticError> {
        Complex::ln(*self).ok_or_else(|| ArithmeticError::domain("ln", "logarithm of zero"))
    }

    fn sin(&self) -> Self {
        Complex::sin(*self)
    }

    fn sqrt(&self) -> Self {
        Complex::sqrt(*self)
    }

    fn gamma(&self) -> Result<Self, ArithmeticError> {
        special::lanczos_gamma(self)
    }
}

fn parse_component(value: &str) -> Result<f64, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed
        .parse::<f64>()
        .map_err(|e| ConfigError::InvalidNumber {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn zero_constant() {
        let z = Complex::ZERO;
        assert_eq!(z.re, 0.0);
        assert_eq!(z.im, 0.0);
    }

    #[test]
    fn addition() {
        let a = Complex::new(1.0, 2.0);
        let b = Complex::new(3.0, 4.0);
        let c = a + b;
        assert!(approx_eq(c.re, 4.0));
        assert!(approx_eq(c.im, 6.0));
    }

    #[test]
    fn multiplication() {
        // (1 + 2i)(3 + 4i) = 3 + 4i + 6i + 8i² = -5 + 10i
        let a = Complex::new(1.0, 2.0);
        let b = Complex::new(3.0, 4.0);
        let c = a * b;
        assert!(approx_eq(c.re, -5.0));
        assert!(approx_eq(c.im, 10.0));
    }

    #[test]
    fn division() {
        // (-5 + 10i) / (3 + 4i) = 1 + 2i
        let q = Complex::new(-5.0, 10.0)
            .checked_div(Complex::new(3.0, 4.0))
            .unwrap();
        assert!(approx_eq(q.re, 1.0));
        assert!(approx_eq(q.im, 2.0));
    }

    #[test]
    fn division_by_exact_zero_fails() {
        let a = Complex::new(1.0, 1.0);
        assert!(a.checked_div(Complex::ZERO).is_none());
        assert_eq!(
            ComplexValue::div(&a, &Complex::ZERO),
            Err(ArithmeticError::DivisionByZero)
        );
    }

    #[test]
    fn norm_sq() {
        let a = Complex::new(3.0, 4.0);
        assert!(approx_eq(a.norm_sq(), 25.0));
        assert!(approx_eq(a.norm(), 5.0));
    }

    #[test]
    fn exp_of_i_pi_is_minus_one() {
        let z = Complex::new(0.0, std::f64::consts::PI).exp();
        assert!(approx_eq(z.re, -1.0));
        assert!(approx_eq(z.im, 0.0));
    }

    #[test]
    fn ln_inverts_exp() {
        let z = Complex::new(0.3, -1.1);
        let back = z.exp().ln().unwrap();
        assert!(approx_eq(back.re, z.re));
        assert!(approx_eq(back.im, z.im));
        assert!(Complex::ZERO.ln().is_none());
    }

    #[test]
    fn sin_of_imaginary_is_sinh() {
        let s = Complex::new(0.0, 1.0).sin();
        assert!(approx_eq(s.re, 0.0));
        assert!(approx_eq(s.im, 1.0f64.sinh()));
    }

    #[test]
    fn sqrt_principal_branch() {
        let s = Complex::new(-4.0, 0.0).sqrt();
        assert!(approx_eq(s.re, 0.0));
        assert!(approx_eq(s.im, 2.0));
        let t = Complex::new(3.0, -4.0).sqrt();
        assert!(approx_eq(t.re, 2.0));
        assert!(approx_eq(t.im, -1.0));
    }

    #[test]
    fn fractional_power_uses_principal_branch() {
        // i^i = e^(-π/2)
        let i = Complex::new(0.0, 1.0);
        let p = ComplexValue::pow(&i, &i).unwrap();
        assert!(approx_eq(p.re, (-std::f64::consts::FRAC_PI_2).exp()));
        assert!(approx_eq(p.im, 0.0));
    }

    #[test]
    fn squaring() {
        // z² where z = 1 + i → 0 + 2i
        let z = Complex::new(1.0, 1.0);
        let z2 = z * z;
        assert!(approx_eq(z2.re, 0.0));
        assert!(approx_eq(z2.im, 2.0));
    }

    #[test]
    fn literal_parsing() {
        let z = Complex::from_literal((), " -0.75", "").unwrap();
        assert_eq!(z, Complex::new(-0.75, 0.0));
        assert!(Complex::from_literal((), "1.0", "i").is_err());
    }
}

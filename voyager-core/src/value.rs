use std::fmt;

use crate::error::{ArithmeticError, ConfigError};
use crate::functions::FunctionRegistry;

/// Largest exponent magnitude handled by exact repeated multiplication.
pub(crate) const MAX_EXACT_EXPONENT: i32 = 1 << 16;

/// Arithmetic shared by the hardware and arbitrary-precision backends.
///
/// Every operation yields a new value at the precision of `self`; the two
/// backends never mix inside one evaluation. Precision travels with the value
/// through [`Context`](Self::Context), so constants created mid-evaluation
/// (zero, one, π) match the operands they are combined with.
pub trait ComplexValue: Clone + PartialEq + fmt::Debug + Send + Sync + Sized + 'static {
    /// Magnitude type used for the escape comparison.
    type Real: Clone + PartialOrd + fmt::Debug + Send + Sync;

    /// Precision of a value: `()` for hardware doubles, a bit count otherwise.
    type Context: Copy + fmt::Debug + PartialEq + Send + Sync;

    /// Short backend name for logs.
    const BACKEND: &'static str;

    fn context(&self) -> Self::Context;

    fn from_f64(ctx: Self::Context, re: f64, im: f64) -> Self;

    fn real_from_f64(ctx: Self::Context, value: f64) -> Self::Real;

    /// `value²` rounded once in `ctx`, so tiny or huge radii keep their square.
    fn real_square_from_f64(ctx: Self::Context, value: f64) -> Self::Real;

    /// Parse decimal component strings; blank components read as zero.
    fn from_literal(ctx: Self::Context, re: &str, im: &str) -> Result<Self, ConfigError>;

    /// Significant bits carried by values in `ctx`.
    fn precision_bits(ctx: Self::Context) -> u32;

    /// A context with `extra_bits` more precision, where the backend supports it.
    fn widen(ctx: Self::Context, extra_bits: u32) -> Self::Context;

    /// Re-round `self` into `ctx`.
    fn with_context(&self, ctx: Self::Context) -> Self;

    /// The process-wide registry of named functions for this backend.
    fn standard_registry() -> &'static FunctionRegistry<Self>;

    fn pi(ctx: Self::Context) -> Self;

    fn re_f64(&self) -> f64;

    fn im_f64(&self) -> f64;

    fn is_zero(&self) -> bool;

    /// `re² + im²`.
    fn norm_sq(&self) -> Self::Real;

    /// `log2|self|`, or negative infinity for zero.
    fn log2_abs(&self) -> f64;

    /// `Some(n)` when `self` is a real integer small enough for exact powers.
    fn as_small_integer(&self) -> Option<i32>;

    /// `true` when `self` is a real integer of any magnitude.
    fn is_real_integer(&self) -> bool;

    fn add(&self, rhs: &Self) -> Self;

    fn sub(&self, rhs: &Self) -> Self;

    fn mul(&self, rhs: &Self) -> Self;

    fn neg(&self) -> Self;

    /// Fails with [`ArithmeticError::DivisionByZero`] when `rhs` is exactly zero.
    fn div(&self, rhs: &Self) -> Result<Self, ArithmeticError>;

    fn exp(&self) -> Self;

    /// Principal logarithm. `ln(0)` is a domain error.
    fn ln(&self) -> Result<Self, ArithmeticError>;

    fn sin(&self) -> Self;

    fn sqrt(&self) -> Self;

    fn gamma(&self) -> Result<Self, ArithmeticError>;

    /// Principal-branch power for exponents that are not small integers.
    ///
    /// Called by [`pow`](Self::pow) only after the zero base and integer
    /// exponent cases are handled.
    fn pow_general(&self, exponent: &Self) -> Result<Self, ArithmeticError> {
        Ok(exponent.mul(&self.ln()?).exp())
    }

    fn zero(ctx: Self::Context) -> Self {
        Self::from_f64(ctx, 0.0, 0.0)
    }

    fn one(ctx: Self::Context) -> Self {
        Self::from_f64(ctx, 1.0, 0.0)
    }

    /// Exact integer power by repeated squaring.
    fn powi(&self, n: i32) -> Result<Self, ArithmeticError> {
        match n {
            0 => return Ok(Self::one(self.context())),
            1 => return Ok(self.clone()),
            2 => return Ok(self.mul(self)),
            _ => {}
        }
        if n < 0 && self.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }

        let mut base = self.clone();
        let mut acc: Option<Self> = None;
        let mut e = n.unsigned_abs();
        while e > 0 {
            if e & 1 == 1 {
                acc = Some(match acc {
                    Some(a) => a.mul(&base),
                    None => base.clone(),
                });
            }
            e >>= 1;
            if e > 0 {
                base = base.mul(&base);
            }
        }
        let positive = acc.unwrap_or_else(|| Self::one(self.context()));
        if n < 0 {
            Self::one(self.context()).div(&positive)
        } else {
            Ok(positive)
        }
    }

    /// General complex power `exp(exponent · ln(self))`.
    ///
    /// Small real integer exponents use exact multiplication, so `z^2` agrees
    /// bit for bit with `z·z`. For a zero base, `0^0 = 1` and `0^w = 0` when
    /// `Re(w) > 0`; any other exponent is rejected.
    fn pow(&self, exponent: &Self) -> Result<Self, ArithmeticError> {
        if let Some(n) = exponent.as_small_integer() {
            return self.powi(n);
        }
        if self.is_zero() {
            return if exponent.re_f64() > 0.0 {
                Ok(Self::zero(self.context()))
            } else {
                Err(ArithmeticError::domain(
                    "pow",
                    "zero raised to an exponent with non-positive real part",
                ))
            };
        }
        self.pow_general(exponent)
    }
}

pub(crate) fn exact_exponent_in_range(n: f64) -> Option<i32> {
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT_EXPONENT as f64 {
        Some(n as i32)
    } else {
        None
    }
}

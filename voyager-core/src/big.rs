use std::collections::HashMap;
use std::f64::consts::LOG2_10;
use std::sync::{Arc, OnceLock, RwLock};

use rug::float::Constant;
use rug::ops::Pow;
use rug::Float;

use crate::error::{ArithmeticError, ConfigError};
use crate::functions::special::SpougeTable;
use crate::functions::FunctionRegistry;
use crate::value::{ComplexValue, MAX_EXACT_EXPONENT};

/// Number of mantissa bits needed to carry `digits` significant decimal digits.
pub fn digits_to_bits(digits: u32) -> u32 {
    ((digits as f64) * LOG2_10).ceil() as u32
}

/// An arbitrary-precision complex number backed by MPC.
///
/// Precision is fixed per value at construction and carried through every
/// operation, so two values created from the same context never need
/// conversion before they are combined.
#[derive(Debug, Clone, PartialEq)]
pub struct BigComplex(pub rug::Complex);

impl BigComplex {
    /// Zero at `bits` of precision.
    pub fn zero(bits: u32) -> Self {
        Self(rug::Complex::new(bits))
    }

    pub fn from_f64(bits: u32, re: f64, im: f64) -> Self {
        Self(rug::Complex::with_val(bits, (re, im)))
    }

    pub fn from_parts(bits: u32, re: Float, im: Float) -> Self {
        Self(rug::Complex::with_val(bits, (re, im)))
    }

    /// Parse decimal strings for both components at `bits` of precision.
    ///
    /// The strings are converted directly, so literals such as `"0.1"` keep
    /// every digit the precision allows instead of passing through `f64`.
    pub fn parse(re: &str, im: &str, bits: u32) -> Result<Self, ConfigError> {
        Ok(Self::from_parts(
            bits,
            parse_float(re, bits)?,
            parse_float(im, bits)?,
        ))
    }

    pub fn bits(&self) -> u32 {
        self.0.prec().0
    }

    pub fn real(&self) -> &Float {
        self.0.real()
    }

    pub fn imag(&self) -> &Float {
        self.0.imag()
    }

    pub fn inner(&self) -> &rug::Complex {
        &self.0
    }

    /// `re² + im²` as a real value.
    pub fn norm_sq_float(&self) -> Float {
        norm_sq(&self.0)
    }
}

/// `re² + im²`, each square rounded before the sum.
///
/// Every escape test on MPC values goes through here so the specialised and
/// general loops compare identically rounded magnitudes.
pub fn norm_sq(z: &rug::Complex) -> Float {
    let mut re2 = z.real().clone();
    re2.square_mut();
    let mut im2 = z.imag().clone();
    im2.square_mut();
    re2 += &im2;
    re2
}

/// Parse one decimal component. Blank strings read as zero.
pub fn parse_float(value: &str, bits: u32) -> Result<Float, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(Float::new(bits));
    }
    Float::parse(trimmed)
        .map(|parsed| Float::with_val(bits, parsed))
        .map_err(|e| ConfigError::InvalidNumber {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

impl ComplexValue for BigComplex {
    type Real = Float;
    type Context = u32;

    const BACKEND: &'static str = "mpc";

    fn context(&self) -> u32 {
        self.bits()
    }

    fn from_f64(bits: u32, re: f64, im: f64) -> Self {
        BigComplex::from_f64(bits, re, im)
    }

    fn real_from_f64(bits: u32, value: f64) -> Float {
        Float::with_val(bits, value)
    }

    fn real_square_from_f64(bits: u32, value: f64) -> Float {
        Float::with_val(bits, value).square()
    }

    fn from_literal(bits: u32, re: &str, im: &str) -> Result<Self, ConfigError> {
        BigComplex::parse(re, im, bits)
    }

    fn precision_bits(bits: u32) -> u32 {
        bits
    }

    fn widen(bits: u32, extra_bits: u32) -> u32 {
        bits.saturating_add(extra_bits)
    }

    fn with_context(&self, bits: u32) -> Self {
        Self(rug::Complex::with_val(bits, &self.0))
    }

    fn standard_registry() -> &'static FunctionRegistry<Self> {
        static REGISTRY: OnceLock<FunctionRegistry<BigComplex>> = OnceLock::new();
        REGISTRY.get_or_init(FunctionRegistry::standard)
    }

    fn pi(bits: u32) -> Self {
        Self::from_parts(bits, Float::with_val(bits, Constant::Pi), Float::new(bits))
    }

    fn re_f64(&self) -> f64 {
        self.0.real().to_f64()
    }

    fn im_f64(&self) -> f64 {
        self.0.imag().to_f64()
    }

    fn is_zero(&self) -> bool {
        self.0.real().is_zero() && self.0.imag().is_zero()
    }

    fn norm_sq(&self) -> Float {
        self.norm_sq_float()
    }

    fn log2_abs(&self) -> f64 {
        if ComplexValue::is_zero(self) {
            return f64::NEG_INFINITY;
        }
        self.norm_sq_float().log2().to_f64() / 2.0
    }

    fn as_small_integer(&self) -> Option<i32> {
        let re = self.0.real();
        if !self.0.imag().is_zero() || !re.is_integer() {
            return None;
        }
        if *re > MAX_EXACT_EXPONENT || *re < -MAX_EXACT_EXPONENT {
            return None;
        }
        re.to_i32_saturating()
    }

    fn is_real_integer(&self) -> bool {
        self.0.imag().is_zero() && self.0.real().is_integer()
    }

    fn add(&self, rhs: &Self) -> Self {
        let mut out = self.0.clone();
        out += &rhs.0;
        Self(out)
    }

    fn sub(&self, rhs: &Self) -> Self {
        let mut out = self.0.clone();
        out -= &rhs.0;
        Self(out)
    }

    fn mul(&self, rhs: &Self) -> Self {
        let mut out = self.0.clone();
        out *= &rhs.0;
        Self(out)
    }

    fn neg(&self) -> Self {
        Self(-self.0.clone())
    }

    fn div(&self, rhs: &Self) -> Result<Self, ArithmeticError> {
        if ComplexValue::is_zero(rhs) {
            return Err(ArithmeticError::DivisionByZero);
        }
        let mut out = self.0.clone();
        out /= &rhs.0;
        Ok(Self(out))
    }

    fn exp(&self) -> Self {
        Self(self.0.clone().exp())
    }

    fn ln(&self) -> Result<Self, ArithmeticError> {
        if ComplexValue::is_zero(self) {
            return Err(ArithmeticError::domain("ln", "logarithm of zero"));
        }
        Ok(Self(self.0.clone().ln()))
    }

    fn sin(&self) -> Self {
        Self(self.0.clone().sin())
    }

    fn sqrt(&self) -> Self {
        Self(self.0.clone().sqrt())
    }

    fn gamma(&self) -> Result<Self, ArithmeticError> {
        spouge_table(self.bits())?.gamma(self)
    }

    fn pow_general(&self, exponent: &Self) -> Result<Self, ArithmeticError> {
        Ok(Self(self.0.clone().pow(&exponent.0)))
    }
}

type SharedSpougeTable = Arc<SpougeTable<BigComplex>>;

/// Shared Spouge table for `bits`, built on first use.
fn spouge_table(bits: u32) -> Result<SharedSpougeTable, ArithmeticError> {
    static TABLES: OnceLock<RwLock<HashMap<u32, SharedSpougeTable>>> = OnceLock::new();
    let tables = TABLES.get_or_init(Default::default);

    if let Some(table) = tables.read().ok().and_then(|t| t.get(&bits).cloned()) {
        return Ok(table);
    }
    let table = Arc::new(SpougeTable::new(bits)?);
    if let Ok(mut t) = tables.write() {
        return Ok(Arc::clone(t.entry(bits).or_insert(table)));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BITS: u32 = 128;

    fn big(re: f64, im: f64) -> BigComplex {
        BigComplex::from_f64(BITS, re, im)
    }

    #[test]
    fn digits_to_bits_rounds_up() {
        assert_eq!(digits_to_bits(1), 4);
        assert_eq!(digits_to_bits(16), 54);
        assert_eq!(digits_to_bits(100), 333);
    }

    #[test]
    fn parse_keeps_requested_precision() {
        let z = BigComplex::parse("-0.8130614", "0.3311725", 200).unwrap();
        assert_eq!(z.bits(), 200);
        assert!((z.re_f64() + 0.8130614).abs() < 1e-15);
        assert!((z.im_f64() - 0.3311725).abs() < 1e-15);
    }

    #[test]
    fn parse_blank_is_zero_and_garbage_fails() {
        let z = BigComplex::parse("1.5", "", BITS).unwrap();
        assert!(z.imag().is_zero());
        assert!(matches!(
            BigComplex::parse("one", "0", BITS),
            Err(ConfigError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn arithmetic() {
        let a = big(1.0, 2.0);
        let b = big(3.0, 4.0);
        assert_eq!(a.add(&b), big(4.0, 6.0));
        assert_eq!(b.sub(&a), big(2.0, 2.0));
        assert_eq!(a.mul(&b), big(-5.0, 10.0));
        assert_eq!(big(-5.0, 10.0).div(&b).unwrap(), a);
    }

    #[test]
    fn division_by_exact_zero_fails() {
        assert_eq!(
            big(1.0, 0.0).div(&BigComplex::zero(BITS)),
            Err(ArithmeticError::DivisionByZero)
        );
    }

    #[test]
    fn norm_sq_is_sum_of_squares() {
        assert_eq!(big(3.0, 4.0).norm_sq(), 25);
        assert!((big(3.0, 4.0).log2_abs() - 5f64.log2()).abs() < 1e-12);
        assert_eq!(BigComplex::zero(BITS).log2_abs(), f64::NEG_INFINITY);
    }

    #[test]
    fn small_integer_detection() {
        assert_eq!(big(2.0, 0.0).as_small_integer(), Some(2));
        assert_eq!(big(-3.0, 0.0).as_small_integer(), Some(-3));
        assert_eq!(big(2.5, 0.0).as_small_integer(), None);
        assert_eq!(big(2.0, 1.0).as_small_integer(), None);
        assert_eq!(big(1e9, 0.0).as_small_integer(), None);
    }

    #[test]
    fn integer_power_matches_square() {
        let z = big(-0.8130614, 0.3311725);
        assert_eq!(z.pow(&big(2.0, 0.0)).unwrap(), z.mul(&z));
    }

    #[test]
    fn general_power_follows_principal_branch() {
        // i^i = e^(-π/2)
        let i = big(0.0, 1.0);
        let p = i.pow(&i).unwrap();
        assert!((p.re_f64() - (-std::f64::consts::FRAC_PI_2).exp()).abs() < 1e-15);
        assert!(p.im_f64().abs() < 1e-30);
    }

    #[test]
    fn precision_survives_operations() {
        let a = BigComplex::from_f64(300, 1.0, 0.0);
        let third = a.div(&BigComplex::from_f64(300, 3.0, 0.0)).unwrap();
        assert_eq!(third.bits(), 300);
        assert_eq!(third.with_context(64).bits(), 64);
    }
}

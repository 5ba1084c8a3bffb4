//! Gamma and Gauss hypergeometric functions over either backend.

use std::f64::consts::{LN_2, PI};

use crate::error::ArithmeticError;
use crate::value::ComplexValue;

/// Lanczos parameters (g = 7, n = 9), good to roughly 15 digits.
const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Hard cap on hypergeometric series terms before giving up.
const MAX_SERIES_TERMS: usize = 200_000;

/// Guard bits beyond the working precision for series truncation.
const SERIES_GUARD_BITS: f64 = 8.0;

/// Radius inside which the direct hypergeometric series is used.
const DIRECT_RADIUS_SQ: f64 = 0.81;

/// Radius outside which the `1/w` connection formula is used.
const INVERSE_RADIUS_SQ: f64 = 1.21;

/// Γ(z) from the Lanczos approximation. Used by the hardware backend.
pub fn lanczos_gamma<C: ComplexValue>(z: &C) -> Result<C, ArithmeticError> {
    reflect(z, lanczos_right_half)
}

/// Spouge coefficients for one working precision.
///
/// The arbitrary-precision backend builds one table per precision and shares
/// it between every gamma evaluation at that precision.
#[derive(Debug, Clone)]
pub struct SpougeTable<C: ComplexValue> {
    wide: C::Context,
    order: u32,
    /// `√(2π)` followed by `c₁ … c_(order−1)`, all at the widened precision.
    coeffs: Vec<C>,
}

impl<C: ComplexValue> SpougeTable<C> {
    /// Coefficients good to every bit of `ctx`.
    ///
    /// Spouge's error bound shrinks geometrically in its order, so the order
    /// is chosen from the precision and the sum runs a little wider.
    pub fn new(ctx: C::Context) -> Result<Self, ArithmeticError> {
        let order = spouge_order(C::precision_bits(ctx));
        let wide = C::widen(ctx, 2 * order + 32);
        let a = order as f64;

        let two_pi = C::pi(wide).add(&C::pi(wide));
        let mut coeffs = Vec::with_capacity(order as usize);
        coeffs.push(two_pi.sqrt());
        let mut factorial = C::one(wide);
        for k in 1..order {
            let shift = C::from_f64(wide, a - k as f64, 0.0);
            let mut coeff = shift
                .pow(&C::from_f64(wide, k as f64 - 0.5, 0.0))?
                .mul(&shift.exp())
                .div(&factorial)?;
            if k % 2 == 0 {
                coeff = coeff.neg();
            }
            coeffs.push(coeff);
            factorial = factorial.mul(&C::from_f64(wide, k as f64, 0.0));
        }

        Ok(Self {
            wide,
            order,
            coeffs,
        })
    }

    /// Γ(z), rounded back to the precision of `z`.
    pub fn gamma(&self, z: &C) -> Result<C, ArithmeticError> {
        let g = reflect(&z.with_context(self.wide), |w| self.right_half(w))?;
        Ok(g.with_context(z.context()))
    }

    /// Γ(x + 1) = (x + a)^(x + ½) e^−(x + a) [c₀ + Σ c_k / (x + k)].
    fn right_half(&self, z: &C) -> Result<C, ArithmeticError> {
        let ctx = z.context();
        let x = z.sub(&C::one(ctx));

        let mut sum = self.coeffs[0].clone();
        for (k, coeff) in self.coeffs.iter().enumerate().skip(1) {
            sum = sum.add(&coeff.div(&x.add(&C::from_f64(ctx, k as f64, 0.0)))?);
        }

        let t = x.add(&C::from_f64(ctx, self.order as f64, 0.0));
        let power = t.pow(&x.add(&C::from_f64(ctx, 0.5, 0.0)))?;
        Ok(power.mul(&t.neg().exp()).mul(&sum))
    }
}

/// Reciprocal gamma, zero at the poles of Γ.
fn reciprocal_gamma<C: ComplexValue>(z: &C) -> Result<C, ArithmeticError> {
    if is_non_positive_integer(z) {
        return Ok(C::zero(z.context()));
    }
    C::one(z.context()).div(&z.gamma()?)
}

fn spouge_order(bits: u32) -> u32 {
    ((bits as f64) * LN_2 / (2.0 * PI).ln()).ceil() as u32 + 1
}

fn is_non_positive_integer<C: ComplexValue>(z: &C) -> bool {
    z.is_real_integer() && z.re_f64() <= 0.0
}

fn is_integer<C: ComplexValue>(z: &C) -> bool {
    z.is_real_integer()
}

/// Extends a right-half-plane evaluator with `Γ(z)Γ(1−z) = π / sin(πz)`.
fn reflect<C, F>(z: &C, right_half: F) -> Result<C, ArithmeticError>
where
    C: ComplexValue,
    F: Fn(&C) -> Result<C, ArithmeticError>,
{
    if is_non_positive_integer(z) {
        return Err(ArithmeticError::domain(
            "gamma",
            "pole at a non-positive integer",
        ));
    }
    if z.re_f64() >= 0.5 {
        return right_half(z);
    }
    let ctx = z.context();
    let pi = C::pi(ctx);
    let reflected = right_half(&C::one(ctx).sub(z))?;
    pi.div(&pi.mul(z).sin().mul(&reflected))
}

fn lanczos_right_half<C: ComplexValue>(z: &C) -> Result<C, ArithmeticError> {
    let ctx = z.context();
    let x = z.sub(&C::one(ctx));

    let mut sum = C::from_f64(ctx, LANCZOS_COEFFS[0], 0.0);
    for (i, &coeff) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
        let denom = x.add(&C::from_f64(ctx, i as f64, 0.0));
        sum = sum.add(&C::from_f64(ctx, coeff, 0.0).div(&denom)?);
    }

    let t = x.add(&C::from_f64(ctx, LANCZOS_G + 0.5, 0.0));
    let power = t.pow(&x.add(&C::from_f64(ctx, 0.5, 0.0)))?;
    let sqrt_two_pi = C::from_f64(ctx, (2.0 * PI).sqrt(), 0.0);
    Ok(sqrt_two_pi.mul(&power).mul(&t.neg().exp()).mul(&sum))
}

/// Gauss hypergeometric function ₂F₁(a, b; c; w).
///
/// Evaluated by the direct series near the origin and by the Pfaff, `1 − w`
/// and `1/w` transformations elsewhere. Points close to `|w| = 1` that none
/// of those reach, and the degenerate parameter cases of the connection
/// formulas, are reported as domain errors.
pub fn hyp2f1<C: ComplexValue>(a: &C, b: &C, c: &C, w: &C) -> Result<C, ArithmeticError> {
    if is_non_positive_integer(c) {
        return Err(ArithmeticError::domain(
            "hyp2f1",
            "c is a non-positive integer",
        ));
    }

    let ctx = w.context();
    let one = C::one(ctx);
    let radius_sq = w.norm_sq();

    if is_non_positive_integer(a)
        || is_non_positive_integer(b)
        || radius_sq < C::real_from_f64(ctx, DIRECT_RADIUS_SQ)
    {
        return hyp2f1_series(a, b, c, w);
    }

    // Pfaff: (1 − w)^(−a) ₂F₁(a, c − b; c; w / (w − 1))
    let one_minus_w = one.sub(w);
    if !one_minus_w.is_zero() {
        let image = w.div(&w.sub(&one))?;
        if image.norm_sq() < C::real_from_f64(ctx, DIRECT_RADIUS_SQ) {
            let scale = one_minus_w.pow(&a.neg())?;
            return Ok(scale.mul(&hyp2f1(a, &c.sub(b), c, &image)?));
        }
    }

    if radius_sq > C::real_from_f64(ctx, INVERSE_RADIUS_SQ) {
        return hyp2f1_inverse(a, b, c, w);
    }

    let c_minus_ab = c.sub(a).sub(b);
    if one_minus_w.norm_sq() < C::real_from_f64(ctx, DIRECT_RADIUS_SQ) && !is_integer(&c_minus_ab)
    {
        return hyp2f1_reflected(a, b, c, w);
    }

    if radius_sq < C::real_from_f64(ctx, 1.0) {
        return hyp2f1_series(a, b, c, w);
    }

    Err(ArithmeticError::domain(
        "hyp2f1",
        "argument too close to the unit circle",
    ))
}

/// The defining power series, summed until terms drop below the precision.
fn hyp2f1_series<C: ComplexValue>(a: &C, b: &C, c: &C, w: &C) -> Result<C, ArithmeticError> {
    let ctx = w.context();
    let cutoff = C::precision_bits(ctx) as f64 + SERIES_GUARD_BITS;
    let one = C::one(ctx);

    let mut sum = one.clone();
    let mut term = one.clone();
    for n in 0..MAX_SERIES_TERMS {
        let nc = C::from_f64(ctx, n as f64, 0.0);
        let numer = a.add(&nc).mul(&b.add(&nc));
        let denom = c.add(&nc).mul(&nc.add(&one));
        term = term.mul(&numer).div(&denom)?.mul(w);
        if term.is_zero() {
            return Ok(sum);
        }
        sum = sum.add(&term);
        if term.log2_abs() < sum.log2_abs() - cutoff {
            return Ok(sum);
        }
    }
    Err(ArithmeticError::domain(
        "hyp2f1",
        "series did not converge",
    ))
}

/// Connection formula in `1/w`, valid when `a − b` is not an integer.
fn hyp2f1_inverse<C: ComplexValue>(a: &C, b: &C, c: &C, w: &C) -> Result<C, ArithmeticError> {
    let a_minus_b = a.sub(b);
    if is_integer(&a_minus_b) {
        return Err(ArithmeticError::domain(
            "hyp2f1",
            "a - b is an integer outside the unit disc",
        ));
    }
    let ctx = w.context();
    let one = C::one(ctx);
    let inv = one.div(w)?;
    let minus_w = w.neg();
    let gamma_c = c.gamma()?;

    let first = gamma_c
        .mul(&a_minus_b.neg().gamma()?)
        .mul(&reciprocal_gamma(b)?)
        .mul(&reciprocal_gamma(&c.sub(a))?)
        .mul(&minus_w.pow(&a.neg())?)
        .mul(&hyp2f1(a, &a.sub(c).add(&one), &one.add(&a_minus_b), &inv)?);

    let second = gamma_c
        .mul(&a_minus_b.gamma()?)
        .mul(&reciprocal_gamma(a)?)
        .mul(&reciprocal_gamma(&c.sub(b))?)
        .mul(&minus_w.pow(&b.neg())?)
        .mul(&hyp2f1(b, &b.sub(c).add(&one), &one.sub(&a_minus_b), &inv)?);

    Ok(first.add(&second))
}

/// Connection formula in `1 − w`, valid when `c − a − b` is not an integer.
fn hyp2f1_reflected<C: ComplexValue>(a: &C, b: &C, c: &C, w: &C) -> Result<C, ArithmeticError> {
    let ctx = w.context();
    let one = C::one(ctx);
    let u = one.sub(w);
    let s = c.sub(a).sub(b);
    let gamma_c = c.gamma()?;

    let first = gamma_c
        .mul(&s.gamma()?)
        .mul(&reciprocal_gamma(&c.sub(a))?)
        .mul(&reciprocal_gamma(&c.sub(b))?)
        .mul(&hyp2f1(a, b, &one.sub(&s), &u)?);

    let second = u
        .pow(&s)?
        .mul(&gamma_c)
        .mul(&s.neg().gamma()?)
        .mul(&reciprocal_gamma(a)?)
        .mul(&reciprocal_gamma(b)?)
        .mul(&hyp2f1(&c.sub(a), &c.sub(b), &one.add(&s), &u)?);

    Ok(first.add(&second))
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Maximum number of additive terms in one recurrence.
pub const MAX_TERMS: usize = 3;

/// Which number representation the pure Mandelbrot recurrence runs in.
///
/// General recurrences always iterate in arbitrary precision; this flag only
/// selects between the two specialised Mandelbrot loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecisionMode {
    /// Native `f64` arithmetic.
    Hardware,
    /// MPC arithmetic at the configured digit count.
    #[default]
    Arbitrary,
}

/// Working precision for a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precision {
    /// Significant decimal digits carried by arbitrary-precision values.
    pub digits: u32,
    #[serde(default)]
    pub mode: PrecisionMode,
}

impl Precision {
    pub const DEFAULT_DIGITS: u32 = 32;

    pub fn new(digits: u32, mode: PrecisionMode) -> Result<Self, ConfigError> {
        if digits < 1 {
            return Err(ConfigError::InvalidPrecision(digits));
        }
        Ok(Self { digits, mode })
    }

    pub fn arbitrary(digits: u32) -> Result<Self, ConfigError> {
        Self::new(digits, PrecisionMode::Arbitrary)
    }

    pub fn hardware() -> Self {
        Self {
            digits: Self::DEFAULT_DIGITS,
            mode: PrecisionMode::Hardware,
        }
    }

    /// Mantissa bits for arbitrary-precision values.
    pub fn bits(&self) -> u32 {
        crate::big::digits_to_bits(self.digits)
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            digits: Self::DEFAULT_DIGITS,
            mode: PrecisionMode::Arbitrary,
        }
    }
}

/// Parameters shared by every sample of one render.
///
/// The cached `escape_radius_sq` field is recomputed on deserialization so a
/// loaded configuration never carries a stale square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IterationParams {
    /// Iteration cap; a sample that reaches it did not escape.
    pub max_iterations: u32,

    pub precision: Precision,

    /// Escape threshold on `|z|`. Only its square is used while iterating.
    pub escape_radius: f64,

    #[serde(skip)]
    escape_radius_sq: f64,
}

impl<'de> Deserialize<'de> for IterationParams {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            max_iterations: u32,
            #[serde(default)]
            precision: Precision,
            #[serde(default = "default_escape_radius")]
            escape_radius: f64,
        }
        let raw = Raw::deserialize(deserializer)?;
        IterationParams::new(raw.max_iterations, raw.precision, raw.escape_radius)
            .map_err(serde::de::Error::custom)
    }
}

fn default_escape_radius() -> f64 {
    IterationParams::DEFAULT_ESCAPE_RADIUS
}

impl IterationParams {
    pub const DEFAULT_MAX_ITERATIONS: u32 = 256;
    pub const DEFAULT_ESCAPE_RADIUS: f64 = 2.0;

    pub fn new(
        max_iterations: u32,
        precision: Precision,
        escape_radius: f64,
    ) -> Result<Self, ConfigError> {
        if max_iterations < 1 {
            return Err(ConfigError::InvalidMaxIterations(max_iterations));
        }
        if precision.digits < 1 {
            return Err(ConfigError::InvalidPrecision(precision.digits));
        }
        if escape_radius <= 0.0 || !escape_radius.is_finite() {
            return Err(ConfigError::InvalidEscapeRadius(escape_radius));
        }
        // The hardware loop compares against the f64 square directly.
        let hardware = precision.mode == PrecisionMode::Hardware;
        if hardware && !(escape_radius * escape_radius).is_normal() {
            return Err(ConfigError::InvalidEscapeRadius(escape_radius));
        }
        Ok(Self {
            max_iterations,
            precision,
            escape_radius,
            escape_radius_sq: escape_radius * escape_radius,
        })
    }

    /// Pre-computed squared escape radius in `f64`.
    ///
    /// Arbitrary-precision loops square the radius at their own precision.
    #[inline]
    pub fn escape_radius_sq(&self) -> f64 {
        self.escape_radius_sq
    }

}

impl Default for IterationParams {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            precision: Precision::default(),
            escape_radius: Self::DEFAULT_ESCAPE_RADIUS,
            escape_radius_sq: Self::DEFAULT_ESCAPE_RADIUS * Self::DEFAULT_ESCAPE_RADIUS,
        }
    }
}

/// A complex constant written as decimal strings.
///
/// Kept as text until the working precision is known, so `"0.1"` is rounded
/// once, directly into the target representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexLiteral {
    #[serde(default)]
    pub re: String,
    #[serde(default)]
    pub im: String,
}

impl ComplexLiteral {
    pub fn new(re: impl Into<String>, im: impl Into<String>) -> Self {
        Self {
            re: re.into(),
            im: im.into(),
        }
    }

    pub fn real(re: impl Into<String>) -> Self {
        Self::new(re, "0")
    }

    pub fn zero() -> Self {
        Self::real("0")
    }

    pub fn one() -> Self {
        Self::real("1")
    }
}

impl fmt::Display for ComplexLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let re = self.re.trim();
        let im = self.im.trim();
        let re = if re.is_empty() { "0" } else { re };
        if im.is_empty() || im.parse::<f64>() == Ok(0.0) {
            f.write_str(re)
        } else {
            write!(f, "({re}{}{im}i)", if im.starts_with('-') { "" } else { "+" })
        }
    }
}

/// Render a coefficient, showing a substituted position as a multiple of `z`.
fn describe_coefficient(value: &ComplexLiteral, substitute: bool) -> String {
    let text = value.to_string();
    match (substitute, text.as_str()) {
        (false, _) => text,
        (true, "1") => "z".to_string(),
        (true, _) => format!("{text}z"),
    }
}

/// A single coefficient with its own substitution flag (`J` and `K`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoefficientConfig {
    pub value: ComplexLiteral,
    #[serde(default)]
    pub substitute: bool,
}

impl CoefficientConfig {
    pub fn fixed(value: ComplexLiteral) -> Self {
        Self {
            value,
            substitute: false,
        }
    }

    pub fn substituted(value: ComplexLiteral) -> Self {
        Self {
            value,
            substitute: true,
        }
    }

    /// Fixed `1`.
    pub fn one() -> Self {
        Self::fixed(ComplexLiteral::one())
    }
}

impl Default for CoefficientConfig {
    fn default() -> Self {
        Self::one()
    }
}

/// One term `B·F(A·t^p, extras)^q`.
///
/// `substitute` holds one flag per position: `B, A, t, p, q`, then each extra.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermConfig {
    pub function: String,
    #[serde(default = "ComplexLiteral::one")]
    pub b: ComplexLiteral,
    #[serde(default = "ComplexLiteral::one")]
    pub a: ComplexLiteral,
    #[serde(default = "ComplexLiteral::one")]
    pub t: ComplexLiteral,
    #[serde(default = "ComplexLiteral::one")]
    pub p: ComplexLiteral,
    #[serde(default = "ComplexLiteral::one")]
    pub q: ComplexLiteral,
    #[serde(default)]
    pub extras: Vec<ComplexLiteral>,
    pub substitute: Vec<bool>,
}

impl TermConfig {
    /// `z²` through `identity`: `t = z`, `p = 2`, everything else one.
    pub fn mandelbrot() -> Self {
        Self {
            function: "identity".to_string(),
            b: ComplexLiteral::one(),
            a: ComplexLiteral::one(),
            t: ComplexLiteral::one(),
            p: ComplexLiteral::real("2"),
            q: ComplexLiteral::one(),
            extras: Vec::new(),
            substitute: vec![false, false, true, false, false],
        }
    }

    /// The five core coefficient literals in `B, A, t, p, q` order.
    pub fn coefficients(&self) -> [&ComplexLiteral; 5] {
        [&self.b, &self.a, &self.t, &self.p, &self.q]
    }

    /// `B·F(A·t^p, extras)^q` with substituted positions written as `z`.
    pub fn describe(&self) -> String {
        let flag = |i: usize| self.substitute.get(i).copied().unwrap_or(false);
        let [b, a, t, p, q] = self.coefficients();
        let mut args = format!(
            "{}·{}^{}",
            describe_coefficient(a, flag(1)),
            describe_coefficient(t, flag(2)),
            describe_coefficient(p, flag(3)),
        );
        for (i, extra) in self.extras.iter().enumerate() {
            args.push_str(", ");
            args.push_str(&describe_coefficient(extra, flag(5 + i)));
        }
        format!(
            "{}·{}({args})^{}",
            describe_coefficient(b, flag(0)),
            self.function,
            describe_coefficient(q, flag(4)),
        )
    }
}

/// The full recurrence `z ← ((Σ terms + c) / J)^K`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceConfig {
    /// Up to [`MAX_TERMS`] terms. Missing slots are empty.
    pub terms: Vec<TermConfig>,
    #[serde(default)]
    pub denominator: CoefficientConfig,
    #[serde(default)]
    pub exponent: CoefficientConfig,
}

impl RecurrenceConfig {
    pub fn mandelbrot() -> Self {
        Self {
            terms: vec![TermConfig::mandelbrot()],
            denominator: CoefficientConfig::one(),
            exponent: CoefficientConfig::one(),
        }
    }

    /// The whole recurrence as one line of text.
    pub fn describe(&self) -> String {
        let mut sum: Vec<String> = self.terms.iter().map(TermConfig::describe).collect();
        sum.push("c".to_string());
        format!(
            "(({}) / {})^{}",
            sum.join(" + "),
            describe_coefficient(&self.denominator.value, self.denominator.substitute),
            describe_coefficient(&self.exponent.value, self.exponent.substitute),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.terms.len() > MAX_TERMS {
            return Err(ConfigError::TooManyTerms {
                max: MAX_TERMS,
                actual: self.terms.len(),
            });
        }
        Ok(())
    }
}

/// Everything needed to build an [`IterationEngine`](crate::IterationEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub params: IterationParams,
    pub recurrence: RecurrenceConfig,
}

impl EngineConfig {
    pub fn new(params: IterationParams, recurrence: RecurrenceConfig) -> Self {
        Self { params, recurrence }
    }

    /// The canonical `z² + c` recurrence.
    pub fn mandelbrot(params: IterationParams) -> Self {
        Self::new(params, RecurrenceConfig::mandelbrot())
    }
}

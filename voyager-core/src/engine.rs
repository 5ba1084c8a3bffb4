use std::borrow::Cow;
use std::fmt;
use std::time::Instant;

use rug::Float;
use tracing::{debug, trace};

use crate::big::{self, BigComplex};
use crate::coefficient::{Binding, SubstitutableCoefficient};
use crate::config::{
    CoefficientConfig, EngineConfig, IterationParams, PrecisionMode, RecurrenceConfig, MAX_TERMS,
};
use crate::error::{ArithmeticError, ConfigError};
use crate::functions::FunctionRegistry;
use crate::term::Term;
use crate::value::ComplexValue;

/// Which loop an engine runs, decided once when it is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceKind {
    /// `z² + c` on two `f64`s.
    PureMandelbrotHardware,
    /// `z² + c` directly on MPC values.
    PureMandelbrotArbitrary,
    /// Any other recurrence, with the number of non-empty terms.
    General { terms: usize },
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PureMandelbrotHardware => f.write_str("mandelbrot (hardware)"),
            Self::PureMandelbrotArbitrary => f.write_str("mandelbrot (arbitrary)"),
            Self::General { terms } => write!(f, "general ({terms} term(s))"),
        }
    }
}

/// The general recurrence `z ← ((Σ terms + c) / J)^K` over one backend.
///
/// Empty terms are dropped when the recurrence is built, so a one-term
/// recurrence only ever evaluates one term.
#[derive(Debug, Clone)]
pub struct Recurrence<C: ComplexValue> {
    terms: Vec<Term<C>>,
    denominator: SubstitutableCoefficient<C>,
    exponent: SubstitutableCoefficient<C>,
    max_iterations: u32,
    escape_radius_sq: C::Real,
}

impl<C: ComplexValue> Recurrence<C> {
    pub fn new(
        terms: Vec<Term<C>>,
        denominator: SubstitutableCoefficient<C>,
        exponent: SubstitutableCoefficient<C>,
        params: &IterationParams,
    ) -> Result<Self, ConfigError> {
        if terms.len() > MAX_TERMS {
            return Err(ConfigError::TooManyTerms {
                max: MAX_TERMS,
                actual: terms.len(),
            });
        }
        let ctx = denominator.constant().context();
        Ok(Self {
            terms: terms.into_iter().filter(|t| !t.is_empty()).collect(),
            denominator,
            exponent,
            max_iterations: params.max_iterations,
            escape_radius_sq: C::real_square_from_f64(ctx, params.escape_radius),
        })
    }

    /// Parse and resolve a configured recurrence in `ctx`.
    pub fn from_config(
        registry: &FunctionRegistry<C>,
        config: &RecurrenceConfig,
        params: &IterationParams,
        ctx: C::Context,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let terms = config
            .terms
            .iter()
            .map(|term| Term::from_config(registry, term, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(
            terms,
            coefficient_from_config(&config.denominator, ctx)?,
            coefficient_from_config(&config.exponent, ctx)?,
            params,
        )
    }

    /// The canonical `z² + c` recurrence, evaluated through the general loop.
    pub fn mandelbrot(params: &IterationParams, ctx: C::Context) -> Self {
        Self {
            terms: vec![Term::mandelbrot(ctx)],
            denominator: SubstitutableCoefficient::fixed(C::one(ctx)),
            exponent: SubstitutableCoefficient::fixed(C::one(ctx)),
            max_iterations: params.max_iterations,
            escape_radius_sq: C::real_square_from_f64(ctx, params.escape_radius),
        }
    }

    /// Number of terms actually evaluated per step.
    pub fn active_terms(&self) -> usize {
        self.terms.len()
    }

    /// `true` for exactly `z² + c` with `J = K = 1`.
    pub fn is_pure_mandelbrot(&self) -> bool {
        self.terms.len() == 1
            && self.terms[0].is_mandelbrot()
            && self.denominator.is_fixed_one()
            && self.exponent.is_fixed_one()
    }

    /// One update of the loop variable.
    ///
    /// `J` and `K` are rebound to the current `z`, like every term.
    pub fn step(&mut self, z: &C, c: &C) -> Result<C, ArithmeticError> {
        let mut sum: Option<C> = None;
        for term in &mut self.terms {
            let value = term.evaluate(z)?;
            sum = Some(match sum {
                Some(acc) => acc.add(&value),
                None => value,
            });
        }
        let mut next = match sum {
            Some(acc) => acc.add(c),
            None => c.clone(),
        };

        if !self.denominator.is_fixed_one() {
            self.denominator.rebind(z);
            next = next.div(&self.denominator.scalar_value())?;
        }
        if !self.exponent.is_fixed_one() {
            self.exponent.rebind(z);
            next = next.pow(&self.exponent.scalar_value())?;
        }
        Ok(next)
    }

    /// Iterate from `z = 0` and return the number of completed iterations
    /// before escape, or the cap if `z` never escaped.
    pub fn iterate(&mut self, c: &C) -> Result<u32, ArithmeticError> {
        let mut z = C::zero(c.context());
        for n in 0..self.max_iterations {
            z = self.step(&z, c)?;
            if z.norm_sq() >= self.escape_radius_sq {
                return Ok(n);
            }
        }
        Ok(self.max_iterations)
    }
}

fn coefficient_from_config<C: ComplexValue>(
    config: &CoefficientConfig,
    ctx: C::Context,
) -> Result<SubstitutableCoefficient<C>, ConfigError> {
    let value = C::from_literal(ctx, &config.value.re, &config.value.im)?;
    Ok(SubstitutableCoefficient::new(value, Binding::from(config.substitute)))
}

/// `z² + c` on native doubles, returning the escape index or the cap.
#[inline]
pub fn mandelbrot_hardware(cr: f64, ci: f64, max_iterations: u32, escape_radius_sq: f64) -> u32 {
    let mut zr = 0.0f64;
    let mut zi = 0.0f64;
    for n in 0..max_iterations {
        let next_re = zr * zr - zi * zi + cr;
        zi = 2.0 * zr * zi + ci;
        zr = next_re;
        if zr * zr + zi * zi >= escape_radius_sq {
            return n;
        }
    }
    max_iterations
}

/// `z² + c` on MPC values at the precision of `c`.
pub fn mandelbrot_arbitrary(
    c: &rug::Complex,
    max_iterations: u32,
    escape_radius_sq: &Float,
) -> u32 {
    let mut z = rug::Complex::new(c.prec());
    for n in 0..max_iterations {
        z.square_mut();
        z += c;
        if big::norm_sq(&z) >= *escape_radius_sq {
            return n;
        }
    }
    max_iterations
}

#[derive(Debug, Clone)]
enum Path {
    Hardware { escape_radius_sq: f64 },
    Arbitrary { escape_radius_sq: Float },
    General(Recurrence<BigComplex>),
}

/// Iterates sample points under one configured recurrence.
///
/// Cloning is cheap relative to a render and gives each worker its own
/// rebinding state.
#[derive(Debug, Clone)]
pub struct IterationEngine {
    params: IterationParams,
    bits: u32,
    kind: RecurrenceKind,
    path: Path,
}

impl IterationEngine {
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        let params = config.params;
        let bits = params.precision.bits();
        let recurrence = Recurrence::<BigComplex>::from_config(
            BigComplex::standard_registry(),
            &config.recurrence,
            &params,
            bits,
        )?;

        let (kind, path) = if recurrence.is_pure_mandelbrot() {
            match params.precision.mode {
                PrecisionMode::Hardware => (
                    RecurrenceKind::PureMandelbrotHardware,
                    Path::Hardware {
                        escape_radius_sq: params.escape_radius_sq(),
                    },
                ),
                PrecisionMode::Arbitrary => (
                    RecurrenceKind::PureMandelbrotArbitrary,
                    Path::Arbitrary {
                        escape_radius_sq: BigComplex::real_square_from_f64(
                            bits,
                            params.escape_radius,
                        ),
                    },
                ),
            }
        } else {
            (
                RecurrenceKind::General {
                    terms: recurrence.active_terms(),
                },
                Path::General(recurrence),
            )
        };

        debug!(
            %kind,
            bits,
            max_iterations = params.max_iterations,
            escape_radius = params.escape_radius,
            "iteration engine ready"
        );

        Ok(Self {
            params,
            bits,
            kind,
            path,
        })
    }

    pub fn kind(&self) -> RecurrenceKind {
        self.kind
    }

    pub fn params(&self) -> &IterationParams {
        &self.params
    }

    /// Mantissa bits of the arbitrary-precision values this engine uses.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Iteration count for `c`, or the cap if it never escaped.
    pub fn iterate(&mut self, c: &BigComplex) -> Result<u32, ArithmeticError> {
        let max_iterations = self.params.max_iterations;
        match &mut self.path {
            Path::Hardware { escape_radius_sq } => Ok(mandelbrot_hardware(
                c.re_f64(),
                c.im_f64(),
                max_iterations,
                *escape_radius_sq,
            )),
            Path::Arbitrary { escape_radius_sq } => {
                let start = Instant::now();
                let c = at_precision(c, self.bits);
                let n = mandelbrot_arbitrary(c.inner(), max_iterations, escape_radius_sq);
                trace!(iterations = n, elapsed = ?start.elapsed(), "mandelbrot sample");
                Ok(n)
            }
            Path::General(recurrence) => {
                let start = Instant::now();
                let c = at_precision(c, self.bits);
                let n = recurrence.iterate(&c)?;
                trace!(
                    iterations = n,
                    precision = self.bits,
                    elapsed = ?start.elapsed(),
                    "general sample"
                );
                Ok(n)
            }
        }
    }
}

fn at_precision(c: &BigComplex, bits: u32) -> Cow<'_, BigComplex> {
    if c.bits() == bits {
        Cow::Borrowed(c)
    } else {
        Cow::Owned(c.with_context(bits))
    }
}

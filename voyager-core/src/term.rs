use crate::coefficient::{Binding, ExtendedParameterList, SubstitutableCoefficient};
use crate::config::TermConfig;
use crate::error::{ArithmeticError, ConfigError};
use crate::functions::{FunctionEntry, FunctionRegistry};
use crate::value::ComplexValue;

/// Number of fixed coefficient positions: `B, A, t, p, q`.
pub const CORE_COEFFICIENTS: usize = 5;

/// One additive term of a recurrence: `B·F(A·t^p, extras)^q`.
///
/// The function is resolved when the term is built. Each coefficient carries
/// its own binding, so evaluation only rebinds and combines values.
#[derive(Debug, Clone)]
pub struct Term<C> {
    function: FunctionEntry<C>,
    b: SubstitutableCoefficient<C>,
    a: SubstitutableCoefficient<C>,
    t: SubstitutableCoefficient<C>,
    p: SubstitutableCoefficient<C>,
    q: SubstitutableCoefficient<C>,
    extras: ExtendedParameterList<C>,
}

impl<C: ComplexValue> Term<C> {
    /// Build a term from its function name, the five core coefficients in
    /// `B, A, t, p, q` order, the extra arguments and one substitution flag
    /// per position (`5 + extras.len()` in total).
    pub fn new(
        registry: &FunctionRegistry<C>,
        function: &str,
        coefficients: [C; CORE_COEFFICIENTS],
        extras: Vec<C>,
        substitute: &[bool],
    ) -> Result<Self, ConfigError> {
        let function = registry.lookup(function)?;

        let expected = CORE_COEFFICIENTS + extras.len();
        if substitute.len() != expected {
            return Err(ConfigError::SubstitutionLengthMismatch {
                expected,
                actual: substitute.len(),
            });
        }
        if extras.len() != function.extras() {
            return Err(ConfigError::ArityMismatch {
                function: function.name().to_string(),
                expected: function.extras(),
                actual: extras.len(),
            });
        }

        let bindings: Vec<Binding> = substitute.iter().map(|&flag| Binding::from(flag)).collect();
        let (core, extra_bindings) = bindings.split_at(CORE_COEFFICIENTS);
        let [b, a, t, p, q] = coefficients;
        Ok(Self {
            function,
            b: SubstitutableCoefficient::new(b, core[0]),
            a: SubstitutableCoefficient::new(a, core[1]),
            t: SubstitutableCoefficient::new(t, core[2]),
            p: SubstitutableCoefficient::new(p, core[3]),
            q: SubstitutableCoefficient::new(q, core[4]),
            extras: ExtendedParameterList::new(extras, extra_bindings)?,
        })
    }

    /// Build a term from its configuration, parsing literals in `ctx`.
    pub fn from_config(
        registry: &FunctionRegistry<C>,
        config: &TermConfig,
        ctx: C::Context,
    ) -> Result<Self, ConfigError> {
        let [b, a, t, p, q] = config
            .coefficients()
            .map(|lit| C::from_literal(ctx, &lit.re, &lit.im));
        let extras = config
            .extras
            .iter()
            .map(|lit| C::from_literal(ctx, &lit.re, &lit.im))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(
            registry,
            &config.function,
            [b?, a?, t?, p?, q?],
            extras,
            &config.substitute,
        )
    }

    /// The term that contributes nothing: `0·identity(1·0^1)^1`.
    pub fn empty(ctx: C::Context) -> Self {
        let zero = C::zero(ctx);
        let one = C::one(ctx);
        Self {
            function: FunctionEntry::identity(),
            b: SubstitutableCoefficient::fixed(zero.clone()),
            a: SubstitutableCoefficient::fixed(one.clone()),
            t: SubstitutableCoefficient::fixed(zero),
            p: SubstitutableCoefficient::fixed(one.clone()),
            q: SubstitutableCoefficient::fixed(one),
            extras: ExtendedParameterList::empty(),
        }
    }

    /// The canonical Mandelbrot term `z²`: `t` bound to `z`, `p = 2`.
    pub fn mandelbrot(ctx: C::Context) -> Self {
        let one = C::one(ctx);
        Self {
            function: FunctionEntry::identity(),
            b: SubstitutableCoefficient::fixed(one.clone()),
            a: SubstitutableCoefficient::fixed(one.clone()),
            t: SubstitutableCoefficient::substituted(one.clone()),
            p: SubstitutableCoefficient::fixed(C::from_f64(ctx, 2.0, 0.0)),
            q: SubstitutableCoefficient::fixed(one),
            extras: ExtendedParameterList::empty(),
        }
    }

    pub fn function_name(&self) -> &'static str {
        self.function.name()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty(self.b.constant().context())
    }

    pub fn is_mandelbrot(&self) -> bool {
        *self == Self::mandelbrot(self.b.constant().context())
    }

    /// Rebind every substituted position to `z` and return
    /// `B·F(A·t^p, extras)^q`.
    pub fn evaluate(&mut self, z: &C) -> Result<C, ArithmeticError> {
        self.b.rebind(z);
        self.a.rebind(z);
        self.t.rebind(z);
        self.p.rebind(z);
        self.q.rebind(z);
        self.extras.rebind_all(z);

        let mut argument = self.t.scalar_value().pow(&self.p.scalar_value())?;
        if !self.a.is_fixed_one() {
            argument = self.a.scalar_value().mul(&argument);
        }

        let mut value = self
            .function
            .apply(&argument, &self.extras.scalar_array())?;
        if !self.q.is_fixed_one() {
            value = value.pow(&self.q.scalar_value())?;
        }
        if !self.b.is_fixed_one() {
            value = self.b.scalar_value().mul(&value);
        }
        Ok(value)
    }
}

/// Structural equality: function, coefficient constants, extras and flags.
impl<C: ComplexValue> PartialEq for Term<C> {
    fn eq(&self, other: &Self) -> bool {
        self.function.name() == other.function.name()
            && self.b == other.b
            && self.a == other.a
            && self.t == other.t
            && self.p == other.p
            && self.q == other.q
            && self.extras == other.extras
    }
}

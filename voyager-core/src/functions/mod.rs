//! Named complex functions available to recurrence terms.
//!
//! A function is a plain `fn(primary, extras) -> value` pointer, generic over
//! the numeric backend and stored in an immutable table. Terms resolve their
//! function once, at construction, so an unknown name can never surface while
//! samples are being iterated.

pub mod special;

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ArithmeticError, ConfigError};
use crate::value::ComplexValue;

/// Signature shared by every registered function.
pub type ComplexFn<C> = fn(&C, &[C]) -> Result<C, ArithmeticError>;

/// A resolved registry entry.
pub struct FunctionEntry<C> {
    name: &'static str,
    extras: usize,
    apply: ComplexFn<C>,
}

impl<C: ComplexValue> FunctionEntry<C> {
    /// The `identity` entry, available without a registry lookup.
    pub fn identity() -> Self {
        Self {
            name: "identity",
            extras: 0,
            apply: identity::<C>,
        }
    }
}

impl<C> FunctionEntry<C> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of extra arguments the function consumes after the primary one.
    pub fn extras(&self) -> usize {
        self.extras
    }

    #[inline]
    pub fn apply(&self, primary: &C, extras: &[C]) -> Result<C, ArithmeticError> {
        (self.apply)(primary, extras)
    }
}

// Manual impls: derives would require `C: Clone`/`C: Debug` for a fn pointer.
impl<C> Clone for FunctionEntry<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for FunctionEntry<C> {}

impl<C> fmt::Debug for FunctionEntry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionEntry")
            .field("name", &self.name)
            .field("extras", &self.extras)
            .finish()
    }
}

/// Immutable name → function table.
///
/// New functions are added with [`with_function`](Self::with_function) while
/// the registry is being built; once handed to a term it is only read.
pub struct FunctionRegistry<C> {
    entries: BTreeMap<&'static str, FunctionEntry<C>>,
}

impl<C: ComplexValue> FunctionRegistry<C> {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// The built-in functions: `identity`, `sin`, `gamma`, `pow`, `hyp2f1`.
    pub fn standard() -> Self {
        let builtins: [(&'static str, usize, ComplexFn<C>); 5] = [
            ("identity", 0, identity::<C>),
            ("sin", 0, sin::<C>),
            ("gamma", 0, gamma::<C>),
            ("pow", 1, pow::<C>),
            ("hyp2f1", 3, hyp2f1::<C>),
        ];
        let mut entries = BTreeMap::new();
        for (name, extras, apply) in builtins {
            entries.insert(
                name,
                FunctionEntry {
                    name,
                    extras,
                    apply,
                },
            );
        }
        Self { entries }
    }

    /// Add a function. Names are never replaced.
    pub fn with_function(
        mut self,
        name: &'static str,
        extras: usize,
        apply: ComplexFn<C>,
    ) -> Result<Self, ConfigError> {
        if self.entries.contains_key(name) {
            return Err(ConfigError::DuplicateFunction(name.to_string()));
        }
        self.entries.insert(
            name,
            FunctionEntry {
                name,
                extras,
                apply,
            },
        );
        Ok(self)
    }

    pub fn lookup(&self, name: &str) -> Result<FunctionEntry<C>, ConfigError> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownFunction(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}

impl<C> fmt::Debug for FunctionRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

fn identity<C: ComplexValue>(x: &C, _: &[C]) -> Result<C, ArithmeticError> {
    Ok(x.clone())
}

fn sin<C: ComplexValue>(x: &C, _: &[C]) -> Result<C, ArithmeticError> {
    Ok(x.sin())
}

fn gamma<C: ComplexValue>(x: &C, _: &[C]) -> Result<C, ArithmeticError> {
    x.gamma()
}

/// `pow(x, [e]) = x^e`: the primary argument is the base.
fn pow<C: ComplexValue>(x: &C, extras: &[C]) -> Result<C, ArithmeticError> {
    let [e] = extras else {
        return Err(wrong_extras("pow", 1, extras.len()));
    };
    x.pow(e)
}

/// `hyp2f1(x, [b, c, w]) = ₂F₁(x, b; c; w)`.
fn hyp2f1<C: ComplexValue>(x: &C, extras: &[C]) -> Result<C, ArithmeticError> {
    let [b, c, w] = extras else {
        return Err(wrong_extras("hyp2f1", 3, extras.len()));
    };
    special::hyp2f1(x, b, c, w)
}

fn wrong_extras(function: &'static str, expected: usize, actual: usize) -> ArithmeticError {
    ArithmeticError::domain(
        function,
        format!("expected {expected} extra argument(s), got {actual}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::big::BigComplex;
    use crate::complex::Complex;

    const EPSILON: f64 = 1e-12;

    fn approx(a: Complex, re: f64, im: f64) -> bool {
        (a.re - re).abs() < EPSILON && (a.im - im).abs() < EPSILON
    }

    #[test]
    fn standard_registry_has_builtins() {
        let reg = FunctionRegistry::<Complex>::standard();
        let names: Vec<_> = reg.names().collect();
        assert_eq!(names, ["gamma", "hyp2f1", "identity", "pow", "sin"]);
        assert_eq!(reg.lookup("pow").unwrap().extras(), 1);
        assert_eq!(reg.lookup("hyp2f1").unwrap().extras(), 3);
        assert_eq!(reg.lookup("sin").unwrap().extras(), 0);
    }

    #[test]
    fn unknown_name_is_config_error() {
        let reg = FunctionRegistry::<Complex>::standard();
        assert_eq!(
            reg.lookup("tan").unwrap_err(),
            ConfigError::UnknownFunction("tan".into())
        );
    }

    #[test]
    fn identity_ignores_extras() {
        let reg = Complex::standard_registry();
        let f = reg.lookup("identity").unwrap();
        let x = Complex::new(0.25, -3.0);
        assert_eq!(f.apply(&x, &[Complex::ONE, Complex::ONE]).unwrap(), x);
    }

    #[test]
    fn pow_raises_primary_to_first_extra() {
        let f = Complex::standard_registry().lookup("pow").unwrap();
        let r = f.apply(&Complex::new(2.0, 0.0), &[Complex::new(3.0, 0.0)]).unwrap();
        assert!(approx(r, 8.0, 0.0));
    }

    #[test]
    fn short_extras_are_domain_errors() {
        let reg = Complex::standard_registry();
        let x = Complex::new(2.0, 0.0);
        assert!(matches!(
            reg.lookup("pow").unwrap().apply(&x, &[]),
            Err(ArithmeticError::Domain { function: "pow", .. })
        ));
        assert!(matches!(
            reg.lookup("hyp2f1").unwrap().apply(&x, &[Complex::ONE]),
            Err(ArithmeticError::Domain { function: "hyp2f1", .. })
        ));
    }

    #[test]
    fn sin_and_gamma_dispatch() {
        let reg = Complex::standard_registry();
        let s = reg
            .lookup("sin")
            .unwrap()
            .apply(&Complex::new(std::f64::consts::FRAC_PI_2, 0.0), &[])
            .unwrap();
        assert!(approx(s, 1.0, 0.0));
        let g = reg
            .lookup("gamma")
            .unwrap()
            .apply(&Complex::new(5.0, 0.0), &[])
            .unwrap();
        assert!((g.re - 24.0).abs() < 1e-9);
    }

    #[test]
    fn custom_function_extends_registry() {
        fn double<C: ComplexValue>(x: &C, _: &[C]) -> Result<C, ArithmeticError> {
            Ok(x.add(x))
        }
        let reg = FunctionRegistry::<Complex>::standard()
            .with_function("double", 0, double::<Complex>)
            .unwrap();
        let r = reg.lookup("double").unwrap().apply(&Complex::ONE, &[]).unwrap();
        assert_eq!(r, Complex::new(2.0, 0.0));
    }

    #[test]
    fn builtins_cannot_be_replaced() {
        let result = FunctionRegistry::<Complex>::standard().with_function(
            "sin",
            0,
            identity::<Complex>,
        );
        assert!(matches!(result, Err(ConfigError::DuplicateFunction(name)) if name == "sin"));
    }

    #[test]
    fn arbitrary_backend_shares_the_table() {
        let reg = BigComplex::standard_registry();
        let f = reg.lookup("pow").unwrap();
        let r = f
            .apply(
                &BigComplex::from_f64(96, 3.0, 0.0),
                &[BigComplex::from_f64(96, 2.0, 0.0)],
            )
            .unwrap();
        assert_eq!(r, BigComplex::from_f64(96, 9.0, 0.0));
    }
}

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::value::ComplexValue;

/// Whether a coefficient slot holds its constant or is rebound to `z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binding {
    /// The slot's value is the stored constant.
    Fixed,
    /// The slot's value is the stored constant times the loop variable.
    Substitute,
}

impl From<bool> for Binding {
    fn from(substitute: bool) -> Self {
        if substitute {
            Self::Substitute
        } else {
            Self::Fixed
        }
    }
}

/// A coefficient that is either a constant `c` or `c·z`.
///
/// The loop variable is held as a separate partner rather than folded into
/// the constant, so the scalar value is always one of `c`, `z` or `c·z` and
/// can never compound into `z²` across iterations.
#[derive(Debug, Clone)]
pub struct SubstitutableCoefficient<C> {
    constant: C,
    binding: Binding,
    /// `c == 1`, so a substituted value is `z` itself.
    unit: bool,
    partner: Option<C>,
}

impl<C: ComplexValue> SubstitutableCoefficient<C> {
    pub fn new(constant: C, binding: Binding) -> Self {
        let unit = constant == C::one(constant.context());
        Self {
            constant,
            binding,
            unit,
            partner: None,
        }
    }

    pub fn fixed(constant: C) -> Self {
        Self::new(constant, Binding::Fixed)
    }

    pub fn substituted(constant: C) -> Self {
        Self::new(constant, Binding::Substitute)
    }

    pub fn constant(&self) -> &C {
        &self.constant
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    /// `true` for a fixed coefficient equal to one.
    pub fn is_fixed_one(&self) -> bool {
        self.binding == Binding::Fixed && self.unit
    }

    /// Bind the partner slot for the next [`scalar_value`](Self::scalar_value).
    ///
    /// Fixed coefficients keep no partner; substituted ones take `z`.
    #[inline]
    pub fn rebind(&mut self, z: &C) {
        self.partner = match self.binding {
            Binding::Fixed => None,
            Binding::Substitute => Some(z.clone()),
        };
    }

    /// The current value: the constant, or the constant times the bound `z`.
    #[inline]
    pub fn scalar_value(&self) -> C {
        match &self.partner {
            None => self.constant.clone(),
            Some(z) if self.unit => z.clone(),
            Some(z) => self.constant.mul(z),
        }
    }
}

/// Structural equality: constant and binding, never the transient partner.
impl<C: PartialEq> PartialEq for SubstitutableCoefficient<C> {
    fn eq(&self, other: &Self) -> bool {
        self.binding == other.binding && self.constant == other.constant
    }
}

/// The extra arguments of a multi-argument function, in call order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedParameterList<C> {
    params: Vec<SubstitutableCoefficient<C>>,
}

impl<C: ComplexValue> ExtendedParameterList<C> {
    /// Pair each value with its binding; both sequences must have equal length.
    pub fn new(values: Vec<C>, bindings: &[Binding]) -> Result<Self, ConfigError> {
        if values.len() != bindings.len() {
            return Err(ConfigError::SubstitutionLengthMismatch {
                expected: values.len(),
                actual: bindings.len(),
            });
        }
        let params = values
            .into_iter()
            .zip(bindings.iter().copied())
            .map(|(value, binding)| SubstitutableCoefficient::new(value, binding))
            .collect();
        Ok(Self { params })
    }

    pub fn empty() -> Self {
        Self { params: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubstitutableCoefficient<C>> {
        self.params.iter()
    }

    pub fn rebind_all(&mut self, z: &C) {
        for param in &mut self.params {
            param.rebind(z);
        }
    }

    pub fn scalar_array(&self) -> Vec<C> {
        self.params.iter().map(|p| p.scalar_value()).collect()
    }
}

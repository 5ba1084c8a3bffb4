use rug::Float;

use crate::big::{parse_float, BigComplex};
use crate::error::ConfigError;

/// A rectangular grid of sample points on the complex plane.
///
/// The grid is centred on `center`, with `spacing` complex-plane units
/// between neighbouring samples. Coordinates are kept in arbitrary
/// precision so deep grids do not collapse onto the same `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    center: BigComplex,
    spacing: Float,
    width: u32,
    height: u32,
}

impl SampleGrid {
    pub fn new(
        center: BigComplex,
        spacing: Float,
        width: u32,
        height: u32,
    ) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidGrid {
                reason: format!("dimensions must be > 0, got {width}×{height}"),
            });
        }
        if !spacing.is_finite() || spacing <= 0 {
            return Err(ConfigError::InvalidGrid {
                reason: format!("spacing must be positive and finite, got {spacing}"),
            });
        }
        Ok(Self {
            center,
            spacing,
            width,
            height,
        })
    }

    /// Parse a grid from decimal strings at `bits` of precision.
    pub fn parse(
        center_re: &str,
        center_im: &str,
        spacing: &str,
        width: u32,
        height: u32,
        bits: u32,
    ) -> Result<Self, ConfigError> {
        Self::new(
            BigComplex::parse(center_re, center_im, bits)?,
            parse_float(spacing, bits)?,
            width,
            height,
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn center(&self) -> &BigComplex {
        &self.center
    }

    pub fn spacing(&self) -> &Float {
        &self.spacing
    }

    pub fn bits(&self) -> u32 {
        self.center.bits()
    }

    /// The plane point for grid cell `(x, y)`.
    ///
    /// `(0, 0)` is the top-left cell; increasing `y` moves towards smaller
    /// imaginary parts.
    pub fn point(&self, x: u32, y: u32) -> BigComplex {
        let bits = self.bits();
        let dx = i64::from(x) - i64::from(self.width / 2);
        let dy = i64::from(self.height / 2) - i64::from(y);

        let mut re = Float::with_val(bits, &self.spacing * dx);
        re += self.center.real();
        let mut im = Float::with_val(bits, &self.spacing * dy);
        im += self.center.imag();
        BigComplex::from_parts(bits, re, im)
    }
}

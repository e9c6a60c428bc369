//! Parameter bounds implementation
//!
//! Bounds are applied with Minuit-style transformations: the optimizer works
//! on unbounded internal values while the model only ever sees external
//! values inside `[min, max]`.

use std::f64::consts::FRAC_PI_2;
use std::f64::{INFINITY, NEG_INFINITY};

use serde::{Deserialize, Serialize};

use crate::error::{FitLabError, Result};

/// Internal starting points are kept this far from the stationary points of
/// the transforms, where the Jacobian column would vanish.
const INTERIOR_OFFSET: f64 = 1e-3;

/// Represents the bounds constraints on a parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum allowed value for the parameter
    pub min: f64,

    /// Maximum allowed value for the parameter
    pub max: f64,
}

impl Serialize for Bounds {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Bounds", 2)?;

        // JSON has no infinities; open ends are written as null
        let min = if self.min.is_finite() { Some(self.min) } else { None };
        let max = if self.max.is_finite() { Some(self.max) } else { None };
        state.serialize_field("min", &min)?;
        state.serialize_field("max", &max)?;

        state.end()
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct BoundsHelper {
            #[serde(default)]
            min: Option<f64>,

            #[serde(default)]
            max: Option<f64>,
        }

        let helper = BoundsHelper::deserialize(deserializer)?;
        Bounds::new(
            helper.min.unwrap_or(NEG_INFINITY),
            helper.max.unwrap_or(INFINITY),
        )
        .map_err(serde::de::Error::custom)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: NEG_INFINITY,
            max: INFINITY,
        }
    }
}

impl Bounds {
    /// Create a new bounds constraint.
    ///
    /// # Examples
    ///
    /// ```
    /// use fitlab_rs::parameters::Bounds;
    ///
    /// let bounds = Bounds::new(0.0, 10.0).unwrap();
    /// assert_eq!(bounds.min, 0.0);
    /// assert!(Bounds::new(10.0, 0.0).is_err());
    /// ```
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(FitLabError::Configuration(format!(
                "invalid bounds: min ({}) must not exceed max ({})",
                min, max
            )));
        }

        Ok(Self { min, max })
    }

    /// Create an unbounded constraint (negative infinity to positive infinity)
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Create a bounds constraint with only a minimum value
    pub fn min_only(min: f64) -> Self {
        Self { min, max: INFINITY }
    }

    /// Create a bounds constraint with only a maximum value
    pub fn max_only(max: f64) -> Self {
        Self {
            min: NEG_INFINITY,
            max,
        }
    }

    pub fn is_within_bounds(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn has_lower_bound(&self) -> bool {
        self.min.is_finite()
    }

    pub fn has_upper_bound(&self) -> bool {
        self.max.is_finite()
    }

    /// Clamp a value to be within the bounds
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Minuit-style transformation between internal (unbounded) and external
/// (bounded) parameter values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsTransform {
    bounds: Bounds,
}

impl BoundsTransform {
    pub fn new(bounds: Bounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Transform an internal parameter value to an external value
    pub fn to_external(&self, internal_value: f64) -> f64 {
        match (self.bounds.has_lower_bound(), self.bounds.has_upper_bound()) {
            (false, false) => internal_value,
            (true, false) => self.bounds.min - 1.0 + (internal_value * internal_value + 1.0).sqrt(),
            (false, true) => self.bounds.max + 1.0 - (internal_value * internal_value + 1.0).sqrt(),
            (true, true) => {
                let bound_range = self.bounds.max - self.bounds.min;
                self.bounds.min + (internal_value.sin() + 1.0) * bound_range / 2.0
            }
        }
    }

    /// Transform an external parameter value to an internal value
    pub fn to_internal(&self, external_value: f64) -> Result<f64> {
        if !external_value.is_finite() {
            return Err(FitLabError::Fitting(format!(
                "parameter value {} is not finite",
                external_value
            )));
        }
        if !self.bounds.is_within_bounds(external_value) {
            return Err(FitLabError::Fitting(format!(
                "parameter value {} is outside bounds [{}, {}]",
                external_value, self.bounds.min, self.bounds.max
            )));
        }

        Ok(match (self.bounds.has_lower_bound(), self.bounds.has_upper_bound()) {
            (false, false) => external_value,
            (true, false) => ((external_value - self.bounds.min + 1.0).powi(2) - 1.0).sqrt(),
            (false, true) => ((self.bounds.max - external_value + 1.0).powi(2) - 1.0).sqrt(),
            (true, true) => {
                let bound_range = self.bounds.max - self.bounds.min;
                if bound_range == 0.0 {
                    0.0
                } else {
                    let scaled = 2.0 * (external_value - self.bounds.min) / bound_range - 1.0;
                    scaled.clamp(-1.0, 1.0).asin()
                }
            }
        })
    }

    /// Internal starting value for an initial guess.
    ///
    /// The guess is clamped into the bounds, and moved off a bound where the
    /// transform is flat so the optimizer can move away from it.
    pub fn start_internal(&self, guess: f64) -> Result<f64> {
        let internal = self.to_internal(self.bounds.clamp(guess))?;
        Ok(match (self.bounds.has_lower_bound(), self.bounds.has_upper_bound()) {
            (false, false) => internal,
            (true, true) => internal.clamp(-FRAC_PI_2 + INTERIOR_OFFSET, FRAC_PI_2 - INTERIOR_OFFSET),
            _ => internal.max(INTERIOR_OFFSET),
        })
    }
}

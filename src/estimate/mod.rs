pub mod material;
pub mod schema;
pub mod sealcoat;
pub mod striping;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::estimate::material::MaterialResult;
use crate::estimate::schema::{MixParseError, SurfaceParseError};
use crate::estimate::sealcoat::SealcoatResult;
use crate::estimate::striping::StripingResult;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EstimateError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<MixParseError> for EstimateError {
    fn from(value: MixParseError) -> Self {
        Self::Configuration(value.to_string())
    }
}

impl From<SurfaceParseError> for EstimateError {
    fn from(value: SurfaceParseError) -> Self {
        Self::Configuration(value.to_string())
    }
}

/// Rounds to the hundredth, ties away from zero on the stored binary value.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn require_positive(field: &str, value: f64) -> Result<(), EstimateError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EstimateError::Validation(format!(
            "{field} must be a positive number, got {value}"
        )));
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &str, value: f64) -> Result<(), EstimateError> {
    if !value.is_finite() || value < 0.0 {
        return Err(EstimateError::Validation(format!(
            "{field} must be zero or greater, got {value}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub label: String,
    pub quantity: f64,
    pub unit: String,
    pub cost: f64,
}

impl LineItem {
    pub fn new(label: impl Into<String>, quantity: f64, unit: impl Into<String>, cost: f64) -> Self {
        Self {
            label: label.into(),
            quantity,
            unit: unit.into(),
            cost,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimate {
    Sealcoat(SealcoatResult),
    Striping(StripingResult),
    Material(MaterialResult),
}

impl Estimate {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sealcoat(_) => "sealcoat",
            Self::Striping(_) => "striping",
            Self::Material(_) => "material",
        }
    }

    pub fn total_cost(&self) -> f64 {
        match self {
            Self::Sealcoat(r) => r.total_cost,
            Self::Striping(r) => r.total_cost,
            Self::Material(r) => r.total_cost,
        }
    }

    pub fn line_items(&self) -> Vec<LineItem> {
        match self {
            Self::Sealcoat(r) => r.line_items(),
            Self::Striping(r) => r.line_items(),
            Self::Material(r) => r.line_items(),
        }
    }
}

impl From<SealcoatResult> for Estimate {
    fn from(value: SealcoatResult) -> Self {
        Self::Sealcoat(value)
    }
}

impl From<StripingResult> for Estimate {
    fn from(value: StripingResult) -> Self {
        Self::Striping(value)
    }
}

impl From<MaterialResult> for Estimate {
    fn from(value: MaterialResult) -> Self {
        Self::Material(value)
    }
}

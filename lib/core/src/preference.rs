//! Student preference and college profile vectors.
//!
//! Both are fixed arrays indexed by [`ExperienceDimension::index`], so the two
//! sides of a similarity computation always share the same dimension set.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::dimension::{ExperienceDimension, DIMENSION_COUNT};
use crate::error::ValidationError;
use crate::vector::Vector;

pub const MIN_WEIGHT: f32 = 1.0;
pub const MAX_WEIGHT: f32 = 10.0;
pub const MIDPOINT_WEIGHT: f32 = 5.0;

/// Importance weights in `[1, 10]`, one per dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreferenceVector {
    weights: [f32; DIMENSION_COUNT],
}

impl PreferenceVector {
    /// Every dimension set to `value`, clamped into range.
    pub fn uniform(value: f32) -> Self {
        Self {
            weights: [clamp_weight(value); DIMENSION_COUNT],
        }
    }

    /// Strict parse of a raw `dimension -> value` map.
    ///
    /// Unknown keys, missing dimensions, non-finite values and values outside
    /// `[1, 10]` are all rejected.
    pub fn from_map(raw: &BTreeMap<String, f64>) -> Result<Self, ValidationError> {
        let mut weights = [f32::NAN; DIMENSION_COUNT];

        for (key, &value) in raw {
            let dim: ExperienceDimension = key.parse()?;
            if !value.is_finite() {
                return Err(ValidationError::NotFinite(dim));
            }
            if value < MIN_WEIGHT as f64 || value > MAX_WEIGHT as f64 {
                return Err(ValidationError::OutOfRange {
                    dimension: dim,
                    value,
                    min: MIN_WEIGHT as f64,
                    max: MAX_WEIGHT as f64,
                });
            }
            weights[dim.index()] = value as f32;
        }

        if let Some(dim) = ExperienceDimension::ALL
            .into_iter()
            .find(|d| weights[d.index()].is_nan())
        {
            return Err(ValidationError::MissingDimension(dim));
        }

        Ok(Self { weights })
    }

    #[inline]
    pub fn get(&self, dim: ExperienceDimension) -> f32 {
        self.weights[dim.index()]
    }

    /// Set a weight, clamped into `[1, 10]`.
    #[inline]
    pub fn set(&mut self, dim: ExperienceDimension, value: f32) {
        self.weights[dim.index()] = clamp_weight(value);
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.weights
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExperienceDimension, f32)> + '_ {
        ExperienceDimension::ALL.into_iter().map(|d| (d, self.get(d)))
    }

    /// Weights divided by 10, comparable with [`ProfileVector`] scores.
    pub fn to_unit_vector(&self) -> Vector {
        Vector::new(self.weights.iter().map(|w| w / MAX_WEIGHT).collect())
    }

    /// Rounded integer slider positions.
    pub fn to_sliders(&self) -> BTreeMap<ExperienceDimension, u8> {
        self.iter().map(|(d, w)| (d, w.round() as u8)).collect()
    }
}

impl Default for PreferenceVector {
    fn default() -> Self {
        Self::uniform(MIDPOINT_WEIGHT)
    }
}

impl Serialize for PreferenceVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_dimension_map(self.iter(), serializer)
    }
}

#[inline]
fn clamp_weight(value: f32) -> f32 {
    if value.is_nan() {
        MIDPOINT_WEIGHT
    } else {
        value.clamp(MIN_WEIGHT, MAX_WEIGHT)
    }
}

/// The scale alumni scores are published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreScale {
    /// Min-max normalized `[0, 1]`
    #[default]
    Unit,
    /// Raw survey scale `[0, 10]`
    Ten,
}

impl ScoreScale {
    pub fn max(self) -> f64 {
        match self {
            ScoreScale::Unit => 1.0,
            ScoreScale::Ten => 10.0,
        }
    }
}

/// A college's aggregated alumni experience scores, normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileVector {
    scores: [f32; DIMENSION_COUNT],
}

impl ProfileVector {
    pub fn new(scores: [f32; DIMENSION_COUNT]) -> Self {
        Self {
            scores: scores.map(|s| s.clamp(0.0, 1.0)),
        }
    }

    /// Strict parse of a raw `dimension -> score` map published in `scale`.
    pub fn from_map(raw: &BTreeMap<String, f64>, scale: ScoreScale) -> Result<Self, ValidationError> {
        let mut scores = [f32::NAN; DIMENSION_COUNT];

        for (key, &value) in raw {
            let dim: ExperienceDimension = key.parse()?;
            if !value.is_finite() {
                return Err(ValidationError::NotFinite(dim));
            }
            if value < 0.0 || value > scale.max() {
                return Err(ValidationError::OutOfRange {
                    dimension: dim,
                    value,
                    min: 0.0,
                    max: scale.max(),
                });
            }
            scores[dim.index()] = (value / scale.max()) as f32;
        }

        if let Some(dim) = ExperienceDimension::ALL
            .into_iter()
            .find(|d| scores[d.index()].is_nan())
        {
            return Err(ValidationError::MissingDimension(dim));
        }

        Ok(Self { scores })
    }

    #[inline]
    pub fn get(&self, dim: ExperienceDimension) -> f32 {
        self.scores[dim.index()]
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.scores
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExperienceDimension, f32)> + '_ {
        ExperienceDimension::ALL.into_iter().map(|d| (d, self.get(d)))
    }

    pub fn to_vector(&self) -> Vector {
        Vector::from_slice(&self.scores)
    }
}

impl Serialize for ProfileVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_dimension_map(self.iter(), serializer)
    }
}

fn serialize_dimension_map<S: Serializer>(
    entries: impl Iterator<Item = (ExperienceDimension, f32)>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(DIMENSION_COUNT))?;
    for (dim, value) in entries {
        map.serialize_entry(dim.as_str(), &value)?;
    }
    map.end()
}

//! Distance method selection and configuration.

use crate::error::{DistanceError, Result};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// How unit-to-unit squared distances are answered.
///
/// Serialized as its numeric mode so configs can say `"method": 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DistanceMethod {
    /// Mode 0: no precomputation, squared hypot per query.
    /// Best when few queries are issued per tick relative to n².
    Direct,
    /// Mode 1: condensed upper-triangle matrix once per tick.
    Condensed,
    /// Mode 2: full square matrix once per tick, with layout assertions.
    #[default]
    Square,
    /// Mode 3: full square matrix without layout assertions.
    /// Marginally faster; indexing bugs give opaque errors.
    SquareUnchecked,
}

impl DistanceMethod {
    pub const ALL: [DistanceMethod; 4] = [
        DistanceMethod::Direct,
        DistanceMethod::Condensed,
        DistanceMethod::Square,
        DistanceMethod::SquareUnchecked,
    ];

    /// Numeric mode, 0..=3.
    pub fn mode(self) -> u8 {
        match self {
            DistanceMethod::Direct => 0,
            DistanceMethod::Condensed => 1,
            DistanceMethod::Square => 2,
            DistanceMethod::SquareUnchecked => 3,
        }
    }

    /// Whether the method precomputes a matrix each tick.
    pub fn is_cached(self) -> bool {
        !matches!(self, DistanceMethod::Direct)
    }
}

impl TryFrom<u8> for DistanceMethod {
    type Error = DistanceError;

    fn try_from(mode: u8) -> Result<Self> {
        match mode {
            0 => Ok(DistanceMethod::Direct),
            1 => Ok(DistanceMethod::Condensed),
            2 => Ok(DistanceMethod::Square),
            3 => Ok(DistanceMethod::SquareUnchecked),
            other => Err(DistanceError::InvalidMethod(other)),
        }
    }
}

impl From<DistanceMethod> for u8 {
    fn from(method: DistanceMethod) -> Self {
        method.mode()
    }
}

/// Configuration for the distance engine.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceConfig {
    /// Method used for unit-to-unit queries for the whole session.
    pub method: DistanceMethod,
}

impl DistanceConfig {
    pub fn new(method: DistanceMethod) -> Self {
        Self { method }
    }

    /// Parse a config from JSON, e.g. `{"method": 1}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

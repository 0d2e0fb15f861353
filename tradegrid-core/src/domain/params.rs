//! Strategy parameters and the grids they are drawn from.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// A single scalar parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
}

impl ParamValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            ParamValue::Int(v) => v as f64,
            ParamValue::Float(v) => v,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("missing parameter '{0}'")]
    Missing(String),

    #[error("parameter '{name}' must be an integer, got {value}")]
    NotInteger { name: String, value: f64 },

    #[error("parameter '{name}' must be a positive period, got {value}")]
    NonPositivePeriod { name: String, value: i64 },

    #[error("parameter '{name}' must be finite, got {value}")]
    NonFinite { name: String, value: f64 },

    #[error("cannot parse parameter '{0}' (expected name=value)")]
    Unparseable(String),
}

/// Named parameter set for one strategy configuration.
///
/// Keys are unique and ordering is irrelevant; a `BTreeMap` keeps display
/// and serialization stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyParams(BTreeMap<String, ParamValue>);

impl StrategyParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.0.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Integer accessor. Floats with no fractional part are accepted.
    pub fn int(&self, name: &str) -> Result<i64, ParamError> {
        match self.get(name) {
            None => Err(ParamError::Missing(name.to_string())),
            Some(ParamValue::Int(v)) => Ok(v),
            Some(ParamValue::Float(v)) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
            Some(ParamValue::Float(v)) => Err(ParamError::NotInteger {
                name: name.to_string(),
                value: v,
            }),
        }
    }

    /// Lookback period: an integer >= 1.
    pub fn period(&self, name: &str) -> Result<usize, ParamError> {
        let value = self.int(name)?;
        if value < 1 {
            return Err(ParamError::NonPositivePeriod {
                name: name.to_string(),
                value,
            });
        }
        Ok(value as usize)
    }

    /// Float accessor. Integers are widened.
    pub fn float(&self, name: &str) -> Result<f64, ParamError> {
        let value = self
            .get(name)
            .ok_or_else(|| ParamError::Missing(name.to_string()))?
            .as_f64();
        if !value.is_finite() {
            return Err(ParamError::NonFinite {
                name: name.to_string(),
                value,
            });
        }
        Ok(value)
    }

    /// Parse `name=value` pairs, e.g. from CLI flags. Values without a
    /// decimal point or exponent become integers.
    pub fn parse_pairs<'a>(pairs: impl IntoIterator<Item = &'a str>) -> Result<Self, ParamError> {
        let mut params = StrategyParams::new();
        for pair in pairs {
            let (name, raw) = pair
                .split_once('=')
                .ok_or_else(|| ParamError::Unparseable(pair.to_string()))?;
            let (name, raw) = (name.trim(), raw.trim());
            if name.is_empty() {
                return Err(ParamError::Unparseable(pair.to_string()));
            }
            let value = if let Ok(v) = raw.parse::<i64>() {
                ParamValue::Int(v)
            } else if let Ok(v) = raw.parse::<f64>() {
                ParamValue::Float(v)
            } else {
                return Err(ParamError::Unparseable(pair.to_string()));
            };
            params.insert(name, value);
        }
        Ok(params)
    }
}

impl fmt::Display for StrategyParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromIterator<(String, ParamValue)> for StrategyParams {
    fn from_iter<T: IntoIterator<Item = (String, ParamValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Candidate values for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamRange {
    /// `start, start+step, ...` strictly below `stop`.
    IntStep { start: i64, stop: i64, step: i64 },
    /// Explicit list of float values.
    Floats(Vec<f64>),
}

impl ParamRange {
    pub fn values(&self) -> Vec<ParamValue> {
        match self {
            ParamRange::IntStep { start, stop, step } => {
                if *step <= 0 {
                    return Vec::new();
                }
                let mut out = Vec::new();
                let mut v = *start;
                while v < *stop {
                    out.push(ParamValue::Int(v));
                    v += step;
                }
                out
            }
            ParamRange::Floats(list) => list.iter().map(|&v| ParamValue::Float(v)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered parameter dimensions of a strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSpace {
    dims: Vec<(String, ParamRange)>,
}

impl ParamSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn int_step(mut self, name: &str, start: i64, stop: i64, step: i64) -> Self {
        self.dims
            .push((name.to_string(), ParamRange::IntStep { start, stop, step }));
        self
    }

    pub fn floats(mut self, name: &str, values: &[f64]) -> Self {
        self.dims
            .push((name.to_string(), ParamRange::Floats(values.to_vec())));
        self
    }

    /// Replace the range of an existing dimension, or append a new one.
    pub fn with_range(mut self, name: &str, range: ParamRange) -> Self {
        match self.dims.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = range,
            None => self.dims.push((name.to_string(), range)),
        }
        self
    }

    pub fn dims(&self) -> &[(String, ParamRange)] {
        &self.dims
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dims.iter().map(|(n, _)| n.as_str())
    }

    /// Size of the Cartesian product.
    pub fn cardinality(&self) -> usize {
        if self.dims.is_empty() {
            return 0;
        }
        self.dims.iter().map(|(_, r)| r.len()).product()
    }

    /// Full Cartesian product. The first declared parameter varies slowest.
    pub fn candidates(&self) -> Vec<StrategyParams> {
        if self.dims.is_empty() {
            return Vec::new();
        }
        let mut out = vec![StrategyParams::new()];
        for (name, range) in &self.dims {
            let values = range.values();
            let mut next = Vec::with_capacity(out.len() * values.len());
            for partial in &out {
                for value in &values {
                    next.push(partial.clone().with(name.as_str(), *value));
                }
            }
            out = next;
        }
        out
    }
}

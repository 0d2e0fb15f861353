//! Feasibility constraints that prune the candidate grid.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tradegrid_core::domain::StrategyParams;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot parse constraint '{0}' (expected e.g. 'ns < nl')")]
pub struct ConstraintParseError(pub String);

type Predicate = dyn Fn(&StrategyParams) -> bool + Send + Sync;

/// Predicate over a candidate parameter set.
#[derive(Clone)]
pub enum Constraint {
    /// `params[lhs] < params[rhs]`. Missing keys make the candidate infeasible.
    LessThan { lhs: String, rhs: String },
    Custom(Arc<Predicate>),
}

impl Constraint {
    pub fn less_than(lhs: impl Into<String>, rhs: impl Into<String>) -> Self {
        Constraint::LessThan {
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }

    pub fn custom(f: impl Fn(&StrategyParams) -> bool + Send + Sync + 'static) -> Self {
        Constraint::Custom(Arc::new(f))
    }

    pub fn allows(&self, params: &StrategyParams) -> bool {
        match self {
            Constraint::LessThan { lhs, rhs } => match (params.get(lhs), params.get(rhs)) {
                (Some(a), Some(b)) => a.as_f64() < b.as_f64(),
                _ => false,
            },
            Constraint::Custom(f) => f(params),
        }
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::LessThan { lhs, rhs } => f
                .debug_struct("LessThan")
                .field("lhs", lhs)
                .field("rhs", rhs)
                .finish(),
            Constraint::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::LessThan { lhs, rhs } => write!(f, "{lhs} < {rhs}"),
            Constraint::Custom(_) => f.write_str("<custom>"),
        }
    }
}

impl FromStr for Constraint {
    type Err = ConstraintParseError;

    /// Parses `a < b` and `b > a`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ConstraintParseError(s.to_string());
        let (lhs, rhs, flipped) = if let Some((l, r)) = s.split_once('<') {
            (l, r, false)
        } else if let Some((l, r)) = s.split_once('>') {
            (l, r, true)
        } else {
            return Err(err());
        };
        let (lhs, rhs) = (lhs.trim(), rhs.trim());
        let valid = |n: &str| !n.is_empty() && n.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid(lhs) || !valid(rhs) {
            return Err(err());
        }
        Ok(if flipped {
            Constraint::less_than(rhs, lhs)
        } else {
            Constraint::less_than(lhs, rhs)
        })
    }
}

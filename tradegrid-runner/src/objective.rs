//! Objective: which metric the optimizer maximizes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::metrics::PerformanceMetrics;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    ReturnPct,
    FinalEquity,
    Sharpe,
    WinRate,
    ProfitFactor,
    MaxDrawdown,
    TradeCount,
}

impl Objective {
    pub const ALL: [Objective; 7] = [
        Objective::ReturnPct,
        Objective::FinalEquity,
        Objective::Sharpe,
        Objective::WinRate,
        Objective::ProfitFactor,
        Objective::MaxDrawdown,
        Objective::TradeCount,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Objective::ReturnPct => "return_pct",
            Objective::FinalEquity => "final_equity",
            Objective::Sharpe => "sharpe",
            Objective::WinRate => "win_rate",
            Objective::ProfitFactor => "profit_factor",
            Objective::MaxDrawdown => "max_drawdown",
            Objective::TradeCount => "trade_count",
        }
    }

    pub fn extract(&self, metrics: &PerformanceMetrics) -> f64 {
        match self {
            Objective::ReturnPct => metrics.return_pct,
            Objective::FinalEquity => metrics.final_equity,
            Objective::Sharpe => metrics.sharpe,
            Objective::WinRate => metrics.win_rate_pct,
            Objective::ProfitFactor => metrics.profit_factor,
            Objective::MaxDrawdown => metrics.max_drawdown_pct,
            Objective::TradeCount => metrics.trade_count as f64,
        }
    }

    /// Returns true if `a` is strictly better than `b`.
    ///
    /// Drawdown is stored negative, so `a > b` also prefers the shallower
    /// drawdown (-5 beats -20). Ties are never better, which keeps the first
    /// candidate in enumeration order.
    pub fn is_better(&self, a: f64, b: f64) -> bool {
        a > b
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Objective {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            "return" | "return_pct" => Ok(Objective::ReturnPct),
            "equity" | "final_equity" => Ok(Objective::FinalEquity),
            "sharpe" => Ok(Objective::Sharpe),
            "win_rate" => Ok(Objective::WinRate),
            "profit_factor" => Ok(Objective::ProfitFactor),
            "max_drawdown" | "drawdown" => Ok(Objective::MaxDrawdown),
            "trades" | "trade_count" => Ok(Objective::TradeCount),
            _ => Err(format!(
                "unknown objective '{s}' (expected one of: {})",
                Objective::ALL.map(|o| o.name()).join(", ")
            )),
        }
    }
}

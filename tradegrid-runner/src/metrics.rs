//! Performance summary for a completed run.
//!
//! Every helper is a pure function over an equity slice or trade list; the
//! summary struct just gathers them. Percentages are expressed in percent
//! (12.5 = 12.5%), drawdown is negative.

use serde::{Deserialize, Serialize};
use tradegrid_core::domain::{PriceSeries, Trade};
use tradegrid_core::engine::RunResult;

/// Bars per year used to annualize Sharpe.
pub const PERIODS_PER_YEAR: f64 = 252.0;

/// Cap applied when a run has winners and no losers.
pub const PROFIT_FACTOR_CAP: f64 = 100.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub return_pct: f64,
    pub buy_hold_return_pct: f64,
    pub final_equity: f64,
    pub peak_equity: f64,
    pub max_drawdown_pct: f64,
    pub trade_count: usize,
    pub win_rate_pct: f64,
    pub best_trade_pct: f64,
    pub worst_trade_pct: f64,
    pub avg_trade_pct: f64,
    pub profit_factor: f64,
    pub sharpe: f64,
    pub exposure_pct: f64,
    pub avg_bars_held: f64,
}

impl PerformanceMetrics {
    /// Summarize `run`, which must have been produced from `series`.
    pub fn compute(run: &RunResult, series: &PriceSeries) -> Self {
        let equity: Vec<f64> = run.equity_curve.iter().map(|p| p.equity).collect();
        let trade_returns: Vec<f64> = run.trades.iter().map(Trade::return_pct).collect();

        Self {
            return_pct: run.total_return_pct(),
            buy_hold_return_pct: buy_hold_return_pct(series),
            final_equity: run.final_equity,
            peak_equity: equity.iter().copied().fold(run.initial_cash, f64::max),
            max_drawdown_pct: max_drawdown(&equity) * 100.0,
            trade_count: run.trades.len(),
            win_rate_pct: win_rate(&run.trades) * 100.0,
            best_trade_pct: trade_returns.iter().copied().reduce(f64::max).unwrap_or(0.0),
            worst_trade_pct: trade_returns.iter().copied().reduce(f64::min).unwrap_or(0.0),
            avg_trade_pct: mean_f64(&trade_returns),
            profit_factor: profit_factor(&run.trades),
            sharpe: sharpe_ratio(&equity),
            exposure_pct: exposure_pct(run),
            avg_bars_held: avg_bars_held(&run.trades),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Close-to-close return of the whole series, in percent.
pub fn buy_hold_return_pct(series: &PriceSeries) -> f64 {
    match (series.first(), series.last()) {
        (Some(first), Some(last)) if first.close > 0.0 => (last.close / first.close - 1.0) * 100.0,
        _ => 0.0,
    }
}

/// Maximum drawdown as a negative fraction (-0.15 = 15% drawdown).
///
/// Returns 0.0 for constant or monotonically rising equity.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let mut peak = match equity_curve.first() {
        Some(&first) => first,
        None => return 0.0,
    };
    let mut max_dd = 0.0_f64;
    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            max_dd = max_dd.min((eq - peak) / peak);
        }
    }
    max_dd
}

/// Annualized Sharpe of per-bar equity returns, zero risk-free rate.
///
/// Returns 0.0 with fewer than two returns or zero variance.
pub fn sharpe_ratio(equity_curve: &[f64]) -> f64 {
    let returns = bar_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    mean_f64(&returns) / std * PERIODS_PER_YEAR.sqrt()
}

/// Fraction of trades with positive P&L.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().filter(|t| t.is_winner()).count() as f64 / trades.len() as f64
}

/// Gross profit over gross loss, capped at [`PROFIT_FACTOR_CAP`].
pub fn profit_factor(trades: &[Trade]) -> f64 {
    let gross_profit: f64 = trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).sum();
    let gross_loss: f64 = trades.iter().filter(|t| t.pnl < 0.0).map(|t| -t.pnl).sum();
    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 { PROFIT_FACTOR_CAP } else { 0.0 };
    }
    (gross_profit / gross_loss).min(PROFIT_FACTOR_CAP)
}

/// Share of bars during which a position was held, in percent.
///
/// A position entered at bar e and closed at bar x is exposed for x - e bars;
/// a still-open position counts through the final bar.
pub fn exposure_pct(run: &RunResult) -> f64 {
    if run.bar_count == 0 {
        return 0.0;
    }
    let closed: usize = run.trades.iter().map(Trade::bars_held).sum();
    let open = run
        .open_position
        .as_ref()
        .map_or(0, |p| (run.bar_count - 1).saturating_sub(p.entry_bar));
    (closed + open) as f64 / run.bar_count as f64 * 100.0
}

pub fn avg_bars_held(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(Trade::bars_held).sum::<usize>() as f64 / trades.len() as f64
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Simple returns between consecutive equity points.
pub fn bar_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

pub fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1). Zero for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use tradegrid_core::domain::{Bar, ExitReason, Interval, Position};
    use tradegrid_core::engine::EquityPoint;

    fn ts(day: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(day)
    }

    fn trade(entry_bar: usize, exit_bar: usize, entry: f64, exit: f64) -> Trade {
        Trade {
            entry_bar,
            entry_time: ts(entry_bar as i64),
            entry_price: entry,
            exit_bar,
            exit_time: ts(exit_bar as i64),
            exit_price: exit,
            quantity: 10.0,
            pnl: (exit - entry) * 10.0,
            exit_reason: ExitReason::Signal,
        }
    }

    fn series(closes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(ts(i as i64), c, c + 1.0, c - 1.0, c, 100.0))
            .collect();
        PriceSeries::new("M", Interval::Daily, bars).unwrap()
    }

    fn run(equity: &[f64], trades: Vec<Trade>, open_position: Option<Position>) -> RunResult {
        RunResult {
            strategy: "sma_cross".into(),
            equity_curve: equity
                .iter()
                .enumerate()
                .map(|(i, &e)| EquityPoint {
                    timestamp: ts(i as i64),
                    equity: e,
                })
                .collect(),
            trades,
            open_position,
            signals: Vec::new(),
            warmup_bars: 0,
            bar_count: equity.len(),
            initial_cash: equity[0],
            final_equity: *equity.last().unwrap(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn max_drawdown_known_curve() {
        let dd = max_drawdown(&[100.0, 120.0, 90.0, 130.0, 117.0]);
        assert!((dd - (-0.25)).abs() < 1e-12);
    }

    #[test]
    fn max_drawdown_rising_is_zero() {
        assert_eq!(max_drawdown(&[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn sharpe_zero_for_flat_equity() {
        assert_eq!(sharpe_ratio(&[100.0; 10]), 0.0);
    }

    #[test]
    fn sharpe_positive_for_noisy_uptrend() {
        let eq = [100.0, 101.0, 100.5, 102.0, 103.0, 102.5, 104.0];
        assert!(sharpe_ratio(&eq) > 0.0);
    }

    #[test]
    fn profit_factor_caps_without_losses() {
        assert_eq!(profit_factor(&[trade(0, 1, 10.0, 11.0)]), PROFIT_FACTOR_CAP);
        assert_eq!(profit_factor(&[]), 0.0);
    }

    #[test]
    fn profit_factor_ratio() {
        let trades = [trade(0, 1, 10.0, 13.0), trade(2, 3, 10.0, 9.0)];
        assert!((profit_factor(&trades) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn std_dev_is_sample() {
        assert!((std_dev(&[1.0, 2.0, 3.0, 4.0]) - 1.290_994_448_735_805_6).abs() < 1e-12);
        assert_eq!(std_dev(&[5.0]), 0.0);
    }

    #[test]
    fn summary_of_two_trades() {
        let trades = vec![trade(1, 3, 10.0, 12.0), trade(5, 6, 10.0, 9.0)];
        let r = run(&[1000.0, 1000.0, 1010.0, 1020.0, 1020.0, 1020.0, 1010.0, 1010.0], trades, None);
        let s = series(&[10.0, 10.0, 11.0, 12.0, 12.0, 10.0, 9.0, 12.5]);
        let m = PerformanceMetrics::compute(&r, &s);

        assert_eq!(m.trade_count, 2);
        assert!((m.return_pct - 1.0).abs() < 1e-9);
        assert!((m.buy_hold_return_pct - 25.0).abs() < 1e-9);
        assert_eq!(m.peak_equity, 1020.0);
        assert!((m.win_rate_pct - 50.0).abs() < 1e-9);
        assert!((m.best_trade_pct - 20.0).abs() < 1e-9);
        assert!((m.worst_trade_pct - (-10.0)).abs() < 1e-9);
        assert!((m.avg_trade_pct - 5.0).abs() < 1e-9);
        assert!((m.profit_factor - 2.0).abs() < 1e-9);
        assert!((m.avg_bars_held - 1.5).abs() < 1e-9);
        assert!((m.exposure_pct - 37.5).abs() < 1e-9);
        assert!(m.max_drawdown_pct < 0.0);
    }

    #[test]
    fn open_position_counts_toward_exposure() {
        let open = Position {
            entry_bar: 2,
            entry_time: ts(2),
            entry_price: 10.0,
            quantity: 1.0,
            stop_loss: None,
        };
        let r = run(&[100.0, 100.0, 100.0, 101.0, 102.0], Vec::new(), Some(open));
        assert!((exposure_pct(&r) - 40.0).abs() < 1e-9);
    }
}

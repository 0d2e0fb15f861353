//! Bar loop: drives one strategy over one series.
//!
//! Per bar, once every indicator is defined:
//! 1. (next-open) fill the order queued at the previous bar at this open
//! 2. stop check: a touched stop closes the position and skips the decision
//! 3. `decide`; every non-Hold action is logged
//! 4. execute at this close, or queue for the next open
//! 5. mark to market at this close
//!
//! Bars before the warm-up carry the initial cash as equity.

use crate::domain::{ExitReason, PriceSeries, StrategyParams};
use crate::strategy::{Action, StrategyKind, StrategyRule};

use super::state::{
    EngineConfig, EngineError, EngineState, FillPolicy, PendingOrder, RunResult, RunWarning,
    SignalRecord,
};

/// Build `kind` from `params` and run it over `series`.
pub fn run_backtest(
    series: &PriceSeries,
    kind: StrategyKind,
    params: &StrategyParams,
    config: &EngineConfig,
) -> Result<RunResult, EngineError> {
    let rule = kind.build(params)?;
    run_rule(series, rule.as_ref(), config)
}

/// Run an already-configured rule.
pub fn run_rule(
    series: &PriceSeries,
    rule: &dyn StrategyRule,
    config: &EngineConfig,
) -> Result<RunResult, EngineError> {
    config.validate()?;

    let bars = series.bars();
    let n = bars.len();
    let warmup = rule.warmup_bars();
    let values = rule.warm_up(bars);

    let mut warnings = Vec::new();
    if n <= warmup {
        tracing::warn!(
            symbol = series.symbol(),
            strategy = rule.name(),
            required = warmup + 1,
            available = n,
            "series shorter than strategy warm-up, no decisions possible"
        );
        warnings.push(RunWarning::InsufficientWarmup {
            required: warmup + 1,
            available: n,
        });
    }

    let mut state = EngineState::new(config.initial_cash, n);

    for (i, bar) in bars.iter().enumerate() {
        if i < warmup {
            state.mark(bar);
            continue;
        }

        state.fill_pending(i, bar);

        if !state.check_stop(i, bar) {
            let action = rule.decide(bars, i, &values, state.position.as_ref());
            if !action.is_hold() {
                state.signals.push(SignalRecord {
                    bar_index: i,
                    timestamp: bar.timestamp,
                    action,
                });
            }
            let has_next = i + 1 < n;
            match action {
                Action::EnterLong { stop_loss }
                    if state.position.is_none() && state.pending.is_none() =>
                {
                    match config.fill_policy {
                        FillPolicy::SignalClose => state.open(i, bar, bar.close, stop_loss),
                        FillPolicy::NextOpen if has_next => {
                            state.pending = Some(PendingOrder::Enter { stop_loss })
                        }
                        FillPolicy::NextOpen => {}
                    }
                }
                Action::ExitToFlat if state.position.is_some() && state.pending.is_none() => {
                    match config.fill_policy {
                        FillPolicy::SignalClose => {
                            state.close(i, bar, bar.close, ExitReason::Signal)
                        }
                        FillPolicy::NextOpen if has_next => {
                            state.pending = Some(PendingOrder::Exit)
                        }
                        FillPolicy::NextOpen => {}
                    }
                }
                _ => {}
            }
        }

        state.mark(bar);
    }

    let final_equity = state
        .equity_curve
        .last()
        .map_or(config.initial_cash, |p| p.equity);

    tracing::debug!(
        symbol = series.symbol(),
        strategy = rule.name(),
        trades = state.trades.len(),
        final_equity,
        "backtest finished"
    );

    Ok(RunResult {
        strategy: rule.name().to_string(),
        equity_curve: state.equity_curve,
        trades: state.trades,
        open_position: state.position,
        signals: state.signals,
        warmup_bars: warmup,
        bar_count: n,
        initial_cash: config.initial_cash,
        final_equity,
        warnings,
    })
}

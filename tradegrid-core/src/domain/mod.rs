//! Domain types: bars, series, parameters, positions, trades.

pub mod bar;
pub mod params;
pub mod position;
pub mod series;
pub mod trade;

pub use bar::Bar;
pub use params::{ParamError, ParamRange, ParamSpace, ParamValue, StrategyParams};
pub use position::Position;
pub use series::{Interval, PriceSeries, SeriesError};
pub use trade::{ExitReason, Trade};

pub mod cache;
pub mod filter;
pub mod operator;
pub mod time_series;

pub use cache::TimeSeriesCache;
pub use filter::{FilteredObservation, TimeVertexFilter};
pub use operator::TimeSeriesOperator;
pub use time_series::{TimeSeries, TsDirection};

pub mod prelude {
    pub use crate::{
        FilteredObservation, TimeSeries, TimeSeriesCache, TimeSeriesOperator, TimeVertexFilter,
        TsDirection,
    };
}

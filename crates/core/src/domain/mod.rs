pub mod indicator;
pub mod snapshot;

pub use indicator::{Indicator, SeriesIds, Unit};
pub use snapshot::Snapshot;

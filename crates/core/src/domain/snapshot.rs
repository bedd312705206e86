use crate::domain::indicator::Indicator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest value of every tracked indicator, built once per dashboard load.
/// `None` marks an indicator whose data was unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub fetched_at: DateTime<Utc>,
    pub vix: Option<f64>,
    pub move_index: Option<f64>,
    pub hy_oas: Option<f64>,
    pub ted_spread: Option<f64>,
    pub nfci: Option<f64>,
}

impl Snapshot {
    pub fn value(&self, indicator: Indicator) -> Option<f64> {
        match indicator {
            Indicator::Vix => self.vix,
            Indicator::Move => self.move_index,
            Indicator::HyOas => self.hy_oas,
            Indicator::TedSpread => self.ted_spread,
            Indicator::Nfci => self.nfci,
        }
    }

    /// Entries in declared order.
    pub fn entries(&self) -> [(Indicator, Option<f64>); 5] {
        Indicator::ALL.map(|indicator| (indicator, self.value(indicator)))
    }

    pub fn available_count(&self) -> usize {
        self.entries().iter().filter(|(_, v)| v.is_some()).count()
    }
}

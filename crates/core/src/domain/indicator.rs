use serde::{Deserialize, Serialize};
use std::fmt;

/// Textual form of a missing value, used on the dashboard and in the prompt.
pub const NO_DATA: &str = "no data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Indicator {
    Vix,
    Move,
    HyOas,
    TedSpread,
    Nfci,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Percent,
    Index,
}

impl Indicator {
    /// Declared order. Dashboard rows and prompt lines follow it.
    pub const ALL: [Indicator; 5] = [
        Indicator::Vix,
        Indicator::Move,
        Indicator::HyOas,
        Indicator::TedSpread,
        Indicator::Nfci,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Indicator::Vix => "VIX",
            Indicator::Move => "MOVE",
            Indicator::HyOas => "HY_OAS",
            Indicator::TedSpread => "TED_Spread",
            Indicator::Nfci => "NFCI",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Indicator::Vix => "VIX",
            Indicator::Move => "MOVE Index",
            Indicator::HyOas => "High Yield OAS",
            Indicator::TedSpread => "TED Spread",
            Indicator::Nfci => "NFCI",
        }
    }

    pub fn prompt_label(self) -> &'static str {
        match self {
            Indicator::Nfci => "Chicago Fed NFCI",
            other => other.label(),
        }
    }

    pub fn unit(self) -> Unit {
        match self {
            Indicator::HyOas | Indicator::TedSpread => Unit::Percent,
            Indicator::Vix | Indicator::Move | Indicator::Nfci => Unit::Index,
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// FRED series identifiers per indicator. These are configuration: the MOVE
/// key in particular should be checked against the provider catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesIds {
    pub vix: String,
    pub move_index: String,
    pub hy_oas: String,
    pub ted_spread: String,
    pub nfci: String,
}

impl Default for SeriesIds {
    fn default() -> Self {
        Self {
            vix: "VIXCLS".to_string(),
            move_index: "MOVEAVG".to_string(),
            hy_oas: "BAMLH0A0HYM2".to_string(),
            ted_spread: "TEDRATE".to_string(),
            nfci: "NFCI".to_string(),
        }
    }
}

impl SeriesIds {
    pub fn get(&self, indicator: Indicator) -> &str {
        match indicator {
            Indicator::Vix => &self.vix,
            Indicator::Move => &self.move_index,
            Indicator::HyOas => &self.hy_oas,
            Indicator::TedSpread => &self.ted_spread,
            Indicator::Nfci => &self.nfci,
        }
    }
}

/// Renders a value exactly as parsed, always keeping a decimal point
/// (`110.0`, not `110`).
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:?}"),
        None => NO_DATA.to_string(),
    }
}

pub fn format_with_unit(value: Option<f64>, unit: Unit) -> String {
    match (value, unit) {
        (Some(_), Unit::Percent) => format!("{}%", format_value(value)),
        _ => format_value(value),
    }
}

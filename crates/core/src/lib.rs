pub mod dashboard;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod snapshot;
pub mod summary;

pub mod config {
    use crate::domain::indicator::SeriesIds;
    use anyhow::Context;

    pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
    pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";
    pub const DEFAULT_OPENAI_TIMEOUT_SECS: u64 = 60;

    pub const DEFAULT_FRED_BASE_URL: &str = "https://api.stlouisfed.org";
    pub const DEFAULT_FRED_TIMEOUT_SECS: u64 = 15;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub openai_api_key: Option<String>,
        pub openai_base_url: String,
        pub openai_model: String,
        pub openai_timeout_secs: u64,
        pub fred_api_key: Option<String>,
        pub fred_base_url: String,
        pub fred_timeout_secs: u64,
        pub series: SeriesIds,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        /// Builds settings from an arbitrary key lookup. Blank values count as unset.
        pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
        where
            F: Fn(&str) -> Option<String>,
        {
            let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
            let get_secs = |key: &str, default: u64| -> anyhow::Result<u64> {
                match get(key) {
                    Some(v) => v
                        .trim()
                        .parse::<u64>()
                        .with_context(|| format!("{key} must be a whole number of seconds (got {v})")),
                    None => Ok(default),
                }
            };

            let defaults = SeriesIds::default();
            let series = SeriesIds {
                vix: get("FRED_SERIES_VIX").unwrap_or(defaults.vix),
                move_index: get("FRED_SERIES_MOVE").unwrap_or(defaults.move_index),
                hy_oas: get("FRED_SERIES_HY_OAS").unwrap_or(defaults.hy_oas),
                ted_spread: get("FRED_SERIES_TED_SPREAD").unwrap_or(defaults.ted_spread),
                nfci: get("FRED_SERIES_NFCI").unwrap_or(defaults.nfci),
            };

            Ok(Self {
                openai_api_key: get("OPENAI_API_KEY"),
                openai_base_url: get("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                openai_model: get("OPENAI_MODEL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                openai_timeout_secs: get_secs("OPENAI_TIMEOUT_SECS", DEFAULT_OPENAI_TIMEOUT_SECS)?,
                fred_api_key: get("FRED_API_KEY"),
                fred_base_url: get("FRED_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_FRED_BASE_URL.to_string()),
                fred_timeout_secs: get_secs("FRED_TIMEOUT_SECS", DEFAULT_FRED_TIMEOUT_SECS)?,
                series,
                sentry_dsn: get("SENTRY_DSN"),
            })
        }

        pub fn require_openai_api_key(&self) -> anyhow::Result<&str> {
            self.openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY is required")
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::collections::HashMap;

        fn settings_from(pairs: &[(&str, &str)]) -> anyhow::Result<Settings> {
            let map: HashMap<String, String> = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            Settings::from_lookup(|key| map.get(key).cloned())
        }

        #[test]
        fn defaults_apply_when_unset() {
            let settings = settings_from(&[]).unwrap();
            assert!(settings.openai_api_key.is_none());
            assert!(settings.fred_api_key.is_none());
            assert_eq!(settings.openai_model, DEFAULT_OPENAI_MODEL);
            assert_eq!(settings.openai_base_url, DEFAULT_OPENAI_BASE_URL);
            assert_eq!(settings.fred_timeout_secs, DEFAULT_FRED_TIMEOUT_SECS);
            assert_eq!(settings.series.move_index, "MOVEAVG");
        }

        #[test]
        fn missing_openai_key_is_reported() {
            let settings = settings_from(&[("FRED_API_KEY", "abc")]).unwrap();
            let err = settings.require_openai_api_key().unwrap_err();
            assert!(err.to_string().contains("OPENAI_API_KEY"));
        }

        #[test]
        fn blank_values_count_as_unset() {
            let settings = settings_from(&[("OPENAI_API_KEY", "  "), ("FRED_SERIES_MOVE", "")]).unwrap();
            assert!(settings.openai_api_key.is_none());
            assert_eq!(settings.series.move_index, "MOVEAVG");
        }

        #[test]
        fn overrides_are_read() {
            let settings = settings_from(&[
                ("OPENAI_API_KEY", "sk-test"),
                ("OPENAI_MODEL", "gpt-4o"),
                ("FRED_SERIES_MOVE", "MOVE"),
                ("FRED_TIMEOUT_SECS", "5"),
            ])
            .unwrap();
            assert_eq!(settings.require_openai_api_key().unwrap(), "sk-test");
            assert_eq!(settings.openai_model, "gpt-4o");
            assert_eq!(settings.series.move_index, "MOVE");
            assert_eq!(settings.fred_timeout_secs, 5);
        }

        #[test]
        fn rejects_non_numeric_timeout() {
            assert!(settings_from(&[("OPENAI_TIMEOUT_SECS", "soon")]).is_err());
        }
    }
}

pub mod fred;
pub mod types;

/// A keyed time-series provider that can report the most recent observation
/// of a series.
///
/// Implementations never fail: any transport, status or decoding problem is
/// logged and reported as `None`, the same as a series with no observations.
#[async_trait::async_trait]
pub trait ObservationSource: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn latest_value(&self, series_id: &str) -> Option<f64>;
}

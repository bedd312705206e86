use crate::domain::{Indicator, SeriesIds, Snapshot};
use crate::ingest::ObservationSource;
use chrono::Utc;

/// Fetches every tracked indicator once, sequentially. A failed indicator
/// becomes `None` and never stops the others.
pub async fn fetch_snapshot(source: &dyn ObservationSource, series: &SeriesIds) -> Snapshot {
    let fetched_at = Utc::now();

    let mut values = [None; 5];
    for (slot, indicator) in values.iter_mut().zip(Indicator::ALL) {
        let series_id = series.get(indicator);
        *slot = source.latest_value(series_id).await;
        tracing::debug!(%indicator, series_id, value = ?slot, "indicator fetched");
    }
    let [vix, move_index, hy_oas, ted_spread, nfci] = values;

    let snapshot = Snapshot {
        fetched_at,
        vix,
        move_index,
        hy_oas,
        ted_spread,
        nfci,
    };

    tracing::info!(
        provider = source.provider_name(),
        available = snapshot.available_count(),
        total = Indicator::ALL.len(),
        "indicator snapshot built"
    );
    snapshot
}

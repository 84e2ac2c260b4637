use heaplens_protocol::{Bin, Interval, TimeBounds, Timestamp, TraceId};
use serde::Serialize;
use tracing::debug;

use crate::context::ViewContext;
use crate::error::ShapeError;
use crate::series::{aggregate, clip_series, downsample_with_factor, peak, window_series};
use crate::store::{StoreError, TraceStore};

/// Chart data for a live-bytes timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveBytes {
    pub bins: Vec<Bin>,
    /// Highest live-bytes value over `[0, horizon]`.
    pub peak: i64,
    /// Highest live-bytes value inside the time filter.
    pub visible_peak: i64,
    pub bounds: TimeBounds,
    pub horizon: Timestamp,
}

/// Live bytes of one allocation site.
pub fn trace_live_bytes<S: TraceStore + ?Sized>(
    store: &S,
    trace: TraceId,
    ctx: &ViewContext,
) -> Result<LiveBytes, ShapeError> {
    let mut intervals = Vec::new();
    collect_chunks(store, trace, ctx, &mut intervals)?;
    shape(&intervals, ctx)
}

/// Live bytes summed over every trace in the current list.
pub fn global_live_bytes<S: TraceStore + ?Sized>(
    store: &S,
    ctx: &ViewContext,
) -> Result<LiveBytes, ShapeError> {
    let page = ctx.page_size.max(1);
    let mut intervals = Vec::new();
    let mut low = 0;
    loop {
        let traces = store.trace_list(low, page);
        if traces.is_empty() {
            break;
        }
        low += traces.len();
        for summary in &traces {
            collect_chunks(store, summary.trace, ctx, &mut intervals)?;
        }
    }
    debug!(traces = low, intervals = intervals.len(), "collected global chunks");
    shape(&intervals, ctx)
}

/// Page through a trace's chunks, keeping those that start inside the
/// horizon.
fn collect_chunks<S: TraceStore + ?Sized>(
    store: &S,
    trace: TraceId,
    ctx: &ViewContext,
    out: &mut Vec<Interval>,
) -> Result<(), StoreError> {
    let page = ctx.page_size.max(1);
    let limit = ctx.bounds.max.min(ctx.horizon);
    let mut low = 0;
    loop {
        let batch = store.intervals_for_trace(trace, low, page)?;
        let fetched = batch.len();
        low += fetched;
        out.extend(
            batch
                .into_iter()
                .filter(|interval| interval.start.is_none_or(|start| start <= limit)),
        );
        if fetched < page {
            return Ok(());
        }
    }
}

/// Aggregate up to the last known end, then cut back to the horizon so
/// chunks outliving it stay live there.
fn shape(intervals: &[Interval], ctx: &ViewContext) -> Result<LiveBytes, ShapeError> {
    let reach = intervals
        .iter()
        .filter(|interval| interval.start.is_some())
        .map(|interval| interval.end)
        .max()
        .unwrap_or(0);
    let series = if reach > ctx.horizon {
        clip_series(&aggregate(intervals, reach)?, ctx.horizon)
    } else {
        aggregate(intervals, ctx.horizon)?
    };
    let visible = window_series(&series, ctx.bounds);
    let bins = downsample_with_factor(&series, ctx.max_bins, ctx.horizon, ctx.downsample_factor)?;
    debug!(
        intervals = intervals.len(),
        points = series.len(),
        bins = bins.len(),
        "shaped live bytes"
    );
    Ok(LiveBytes {
        peak: peak(&series),
        visible_peak: peak(&visible),
        bins,
        bounds: ctx.bounds,
        horizon: ctx.horizon,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapingConfig;
    use crate::store::JsonDataset;

    fn store() -> JsonDataset {
        JsonDataset::from_json_str(
            r#"{ "traces": [
                { "stack": "main|a", "chunks": [
                    { "start": 0, "end": 10, "size": 100 },
                    { "start": 5, "end": 15, "size": 50 }
                ] },
                { "stack": "main|b", "chunks": [{ "start": 12, "end": 20, "size": 7 }] }
            ] }"#,
        )
        .unwrap()
    }

    #[test]
    fn short_trace_series_is_not_downsampled() {
        let store = store();
        let mut config = ShapingConfig::default();
        config.chunk_window.page_size = 1;
        let ctx = ViewContext::capture(&store, &config);

        let live = trace_live_bytes(&store, TraceId(0), &ctx).unwrap();
        let values: Vec<_> = live.bins.iter().map(|b| (b.ts, b.value)).collect();
        assert_eq!(
            values,
            [(0, 0.0), (0, 100.0), (5, 150.0), (10, 50.0), (15, 0.0), (20, 0.0)]
        );
        assert_eq!(live.peak, 150);
        assert_eq!(live.horizon, 20);
    }

    #[test]
    fn global_series_sums_every_trace() {
        let store = store();
        let ctx = ViewContext::capture(&store, &ShapingConfig::default());
        let live = global_live_bytes(&store, &ctx).unwrap();
        assert_eq!(live.peak, 150);
        assert_eq!(live.bins.last().map(|b| b.ts), Some(20));
    }

    #[test]
    fn filter_window_limits_the_series() {
        let mut store = store();
        store.set_time_filter(TimeBounds::new(11, 14));
        let ctx = ViewContext::capture(&store, &ShapingConfig::default());

        let live = global_live_bytes(&store, &ctx).unwrap();
        assert_eq!(live.horizon, 14);
        // b starts at 12 while a's second chunk is still live.
        assert_eq!(live.visible_peak, 57);
        assert_eq!(live.peak, 150);
    }

    #[test]
    fn chunks_outliving_the_filter_stay_live_at_its_edge() {
        let mut store = store();
        store.set_time_filter(TimeBounds::new(0, 12));
        let ctx = ViewContext::capture(&store, &ShapingConfig::default());

        let live = trace_live_bytes(&store, TraceId(0), &ctx).unwrap();
        let values: Vec<_> = live.bins.iter().map(|b| (b.ts, b.value)).collect();
        assert_eq!(
            values,
            [(0, 0.0), (0, 100.0), (5, 150.0), (10, 50.0), (12, 50.0)]
        );
        assert!(live.bins.windows(2).all(|w| w[0].ts <= w[1].ts));
    }

    #[test]
    fn unknown_trace_propagates() {
        let store = store();
        let ctx = ViewContext::capture(&store, &ShapingConfig::default());
        assert!(matches!(
            trace_live_bytes(&store, TraceId(5), &ctx),
            Err(ShapeError::Store(StoreError::UnknownTrace(_)))
        ));
    }
}

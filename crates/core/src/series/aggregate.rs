use heaplens_protocol::{Interval, StepPoint, TimeBounds, Timestamp};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error(
        "invalid interval #{index}: start {start} end {end} size {size} (need start <= end and size > 0)"
    )]
    InvalidInterval {
        index: usize,
        start: Timestamp,
        end: Timestamp,
        size: i64,
    },
    #[error("interval #{index} ends at {end}, past the horizon {horizon}")]
    EventPastHorizon {
        index: usize,
        end: Timestamp,
        horizon: Timestamp,
    },
    #[error("live bytes overflow at {ts}")]
    Overflow { ts: Timestamp },
}

/// Sweep allocation intervals into a live-bytes step series.
///
/// Every interval with a known start contributes `+size` at `start` and
/// `-size` at `end`. Events are stably sorted by timestamp, so equal
/// timestamps keep their insertion order and an interval's start always
/// precedes its own end. The series starts at `{0, 0}` and is closed by a
/// point at `horizon` repeating the final running total.
///
/// Intervals without a start are skipped. Any other interval must satisfy
/// `start <= end <= horizon` and `size > 0`; violations fail the whole call
/// before any output is produced. Use [`clip_series`] to cut a series built
/// over a longer horizon.
pub fn aggregate(
    intervals: &[Interval],
    horizon: Timestamp,
) -> Result<Vec<StepPoint>, AggregateError> {
    let mut events: Vec<(Timestamp, i64)> = Vec::with_capacity(intervals.len() * 2);

    for (index, interval) in intervals.iter().enumerate() {
        let Some(start) = interval.start else {
            continue;
        };
        if start > interval.end || interval.size <= 0 {
            return Err(AggregateError::InvalidInterval {
                index,
                start,
                end: interval.end,
                size: interval.size,
            });
        }
        if interval.end > horizon {
            return Err(AggregateError::EventPastHorizon {
                index,
                end: interval.end,
                horizon,
            });
        }
        events.push((start, interval.size));
        events.push((interval.end, -interval.size));
    }

    // `sort_by_key` is stable.
    events.sort_by_key(|&(ts, _)| ts);

    let mut series = Vec::with_capacity(events.len() + 2);
    series.push(StepPoint::new(0, 0));

    let mut running: i64 = 0;
    for (ts, delta) in events {
        running = running
            .checked_add(delta)
            .ok_or(AggregateError::Overflow { ts })?;
        series.push(StepPoint::new(ts, running));
    }

    series.push(StepPoint::new(horizon, running));
    Ok(series)
}

/// Highest live-bytes value in the series (0 for an empty series).
pub fn peak(series: &[StepPoint]) -> i64 {
    series.iter().map(|p| p.value).max().unwrap_or(0).max(0)
}

/// Cut a step series at `horizon`.
///
/// Points after `horizon` are dropped and the series is closed at `horizon`
/// with the value in force there, so allocations still live at the cut keep
/// their bytes.
pub fn clip_series(series: &[StepPoint], horizon: Timestamp) -> Vec<StepPoint> {
    let kept = series.partition_point(|p| p.ts <= horizon);
    let mut clipped = Vec::with_capacity(kept + 1);
    clipped.extend_from_slice(&series[..kept]);
    let value = clipped.last().map_or(0, |p| p.value);
    clipped.push(StepPoint::new(horizon, value));
    clipped
}

/// Restrict a step series to a time-filter window.
///
/// The result opens with a point at `bounds.min` carrying the value in force
/// there, keeps every point inside the window, and closes at `bounds.max`
/// with the last value. An inverted window yields an empty series.
pub fn window_series(series: &[StepPoint], bounds: TimeBounds) -> Vec<StepPoint> {
    if bounds.min > bounds.max {
        return Vec::new();
    }

    let first_inside = series.partition_point(|p| p.ts <= bounds.min);
    let entry = first_inside
        .checked_sub(1)
        .map_or(0, |i| series[i].value);

    let mut windowed = Vec::with_capacity(series.len().saturating_sub(first_inside) + 2);
    windowed.push(StepPoint::new(bounds.min, entry));
    windowed.extend(
        series[first_inside..]
            .iter()
            .take_while(|p| p.ts <= bounds.max)
            .copied(),
    );

    if let Some(last) = windowed.last().copied()
        && last.ts < bounds.max
    {
        windowed.push(StepPoint::new(bounds.max, last.value));
    }
    windowed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(raw: &[(Timestamp, i64)]) -> Vec<StepPoint> {
        raw.iter().map(|&(ts, value)| StepPoint::new(ts, value)).collect()
    }

    #[test]
    fn interleaves_starts_and_ends() {
        let intervals = [Interval::new(0, 10, 100), Interval::new(5, 15, 50)];
        let series = aggregate(&intervals, 20).unwrap();
        assert_eq!(
            series,
            points(&[(0, 0), (0, 100), (5, 150), (10, 50), (15, 0), (20, 0)])
        );
    }

    #[test]
    fn empty_input_is_anchored_at_both_ends() {
        let series = aggregate(&[], 500).unwrap();
        assert_eq!(series, points(&[(0, 0), (500, 0)]));
    }

    #[test]
    fn partial_intervals_are_skipped() {
        let intervals = [Interval::partial(8, 1_000), Interval::new(2, 4, 16)];
        let series = aggregate(&intervals, 10).unwrap();
        assert_eq!(series, points(&[(0, 0), (2, 16), (4, 0), (10, 0)]));
    }

    #[test]
    fn horizon_anchor_repeats_final_total() {
        let intervals = [Interval::new(1, 3, 8), Interval::new(2, 6, 32)];
        let series = aggregate(&intervals, 10).unwrap();
        assert_eq!(series.len(), 2 * intervals.len() + 2);
        assert_eq!(series.last(), Some(&StepPoint::new(10, 0)));
        assert_eq!(peak(&series), 40);
    }

    #[test]
    fn zero_length_interval_rises_then_falls() {
        let series = aggregate(&[Interval::new(7, 7, 24)], 9).unwrap();
        assert_eq!(series, points(&[(0, 0), (7, 24), (7, 0), (9, 0)]));
    }

    #[test]
    fn rejects_inverted_interval() {
        let intervals = [Interval::new(0, 5, 1), Interval::new(9, 3, 4)];
        assert_eq!(
            aggregate(&intervals, 10),
            Err(AggregateError::InvalidInterval {
                index: 1,
                start: 9,
                end: 3,
                size: 4
            })
        );
    }

    #[test]
    fn rejects_non_positive_size() {
        let err = aggregate(&[Interval::new(0, 5, 0)], 10).unwrap_err();
        assert!(matches!(err, AggregateError::InvalidInterval { size: 0, .. }));
        let err = aggregate(&[Interval::new(0, 5, -64)], 10).unwrap_err();
        assert!(matches!(err, AggregateError::InvalidInterval { size: -64, .. }));
    }

    #[test]
    fn rejects_events_past_the_horizon() {
        assert_eq!(
            aggregate(&[Interval::new(0, 30, 5)], 20),
            Err(AggregateError::EventPastHorizon {
                index: 0,
                end: 30,
                horizon: 20
            })
        );
        // Partial intervals never produce events.
        assert!(aggregate(&[Interval::partial(30, 5)], 20).is_ok());
    }

    #[test]
    fn running_total_overflow_is_an_error() {
        let intervals = [Interval::new(0, 4, i64::MAX), Interval::new(1, 4, 1)];
        assert_eq!(
            aggregate(&intervals, 4),
            Err(AggregateError::Overflow { ts: 1 })
        );
    }

    #[test]
    fn clipping_keeps_bytes_live_at_the_cut() {
        let series = aggregate(&[Interval::new(0, 30, 5), Interval::new(2, 8, 3)], 30).unwrap();
        let clipped = clip_series(&series, 20);
        assert_eq!(
            clipped,
            points(&[(0, 0), (0, 5), (2, 8), (8, 5), (20, 5)])
        );
        assert!(clipped.windows(2).all(|w| w[0].ts <= w[1].ts));
    }

    #[test]
    fn window_carries_entry_value() {
        let series = points(&[(0, 0), (0, 100), (5, 150), (10, 50), (15, 0), (20, 0)]);
        let windowed = window_series(&series, TimeBounds::new(7, 12));
        assert_eq!(windowed, points(&[(7, 150), (10, 50), (12, 50)]));
        assert_eq!(peak(&windowed), 150);
    }

    #[test]
    fn window_on_an_event_uses_the_value_after_it() {
        let series = points(&[(0, 0), (0, 100), (5, 150), (10, 50), (20, 50)]);
        let windowed = window_series(&series, TimeBounds::new(0, 5));
        assert_eq!(windowed, points(&[(0, 100), (5, 150)]));
    }

    #[test]
    fn inverted_window_is_empty() {
        let series = points(&[(0, 0), (10, 0)]);
        assert!(window_series(&series, TimeBounds::new(8, 2)).is_empty());
    }
}

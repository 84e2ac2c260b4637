use serde::{Deserialize, Serialize};

/// Profiler timestamp, in the tick unit the trace was recorded with.
pub type Timestamp = u64;

/// One allocation's lifetime: `size` bytes live from `start` until `end`.
///
/// `start` is `None` when the profiler never observed the allocation call
/// (partial chunks). Such intervals carry no usable lifetime and are skipped
/// by aggregation rather than treated as zero-length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    #[serde(default)]
    pub start: Option<Timestamp>,
    pub end: Timestamp,
    pub size: i64,
}

impl Interval {
    pub fn new(start: Timestamp, end: Timestamp, size: i64) -> Self {
        Self {
            start: Some(start),
            end,
            size,
        }
    }

    /// An interval whose allocation time is unknown.
    pub fn partial(end: Timestamp, size: i64) -> Self {
        Self {
            start: None,
            end,
            size,
        }
    }

    pub fn duration(&self) -> Option<Timestamp> {
        self.start.map(|start| self.end.saturating_sub(start))
    }
}

/// One step of a right-continuous step function: `value` holds from `ts`
/// until the next point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPoint {
    pub ts: Timestamp,
    pub value: i64,
}

impl StepPoint {
    pub fn new(ts: Timestamp, value: i64) -> Self {
        Self { ts, value }
    }
}

/// One display sample of a downsampled series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub ts: Timestamp,
    pub value: f64,
}

impl Bin {
    pub fn new(ts: Timestamp, value: f64) -> Self {
        Self { ts, value }
    }
}

impl From<StepPoint> for Bin {
    fn from(point: StepPoint) -> Self {
        Self {
            ts: point.ts,
            value: point.value as f64,
        }
    }
}

/// Inclusive time range of the active time filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBounds {
    pub min: Timestamp,
    pub max: Timestamp,
}

impl TimeBounds {
    pub fn new(min: Timestamp, max: Timestamp) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        ts >= self.min && ts <= self.max
    }

    pub fn span(&self) -> Timestamp {
        self.max.saturating_sub(self.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_interval_deserializes_without_start() {
        let interval: Interval = serde_json::from_str(r#"{"end": 40, "size": 16}"#).unwrap();
        assert_eq!(interval, Interval::partial(40, 16));
        assert_eq!(interval.duration(), None);
    }

    #[test]
    fn bin_from_step_point_keeps_timestamp() {
        let bin = Bin::from(StepPoint::new(12, 4096));
        assert_eq!(bin.ts, 12);
        assert_eq!(bin.value, 4096.0);
    }

    #[test]
    fn bounds_are_inclusive() {
        let bounds = TimeBounds::new(10, 20);
        assert!(bounds.contains(10));
        assert!(bounds.contains(20));
        assert!(!bounds.contains(21));
        assert_eq!(bounds.span(), 10);
    }
}

//! Scrollable viewport over a paged dataset.
//!
//! A [`VirtualWindow`] keeps only a contiguous slice `[low, high)` of an
//! externally ordered dataset materialized in a [`Sink`], loading pages from a
//! [`PageSource`] as the user scrolls toward either edge and evicting the same
//! number of rows from the opposite edge.

use std::collections::VecDeque;
use std::fmt;

use heaplens_protocol::{TraceId, TraceListKey};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::WindowConfig;

/// Paged, read-only access to an ordered dataset.
pub trait PageSource {
    /// Identifies which dataset the window is showing.
    type Selection: Clone + PartialEq + fmt::Debug;
    type Record;
    type Error: std::error::Error;

    fn total_len(&self, selection: &Self::Selection) -> Result<usize, Self::Error>;

    /// Up to `count` records starting at `low`, in dataset order.
    fn fetch_page(
        &self,
        selection: &Self::Selection,
        low: usize,
        count: usize,
    ) -> Result<Vec<Self::Record>, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Head,
    Tail,
}

/// Receives the rows a window materializes and evicts.
pub trait Sink<R> {
    /// Place `record` (dataset index `index`) at one edge of the materialized run.
    fn insert(&mut self, edge: Edge, index: usize, record: R);
    /// Drop `count` rows from one edge.
    fn evict(&mut self, count: usize, edge: Edge);
}

/// In-memory sink keeping each row next to its dataset index.
#[derive(Debug, Clone)]
pub struct RowBuffer<R> {
    rows: VecDeque<(usize, R)>,
}

impl<R> Default for RowBuffer<R> {
    fn default() -> Self {
        Self {
            rows: VecDeque::new(),
        }
    }
}

impl<R> RowBuffer<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &R)> {
        self.rows.iter().map(|(index, record)| (*index, record))
    }

    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.rows.iter().map(|(_, record)| record)
    }

    pub fn first_index(&self) -> Option<usize> {
        self.rows.front().map(|(index, _)| *index)
    }
}

impl<R> Sink<R> for RowBuffer<R> {
    fn insert(&mut self, edge: Edge, index: usize, record: R) {
        match edge {
            Edge::Head => self.rows.push_front((index, record)),
            Edge::Tail => self.rows.push_back((index, record)),
        }
    }

    fn evict(&mut self, count: usize, edge: Edge) {
        let count = count.min(self.rows.len());
        match edge {
            Edge::Head => {
                self.rows.drain(..count);
            }
            Edge::Tail => self.rows.truncate(self.rows.len() - count),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

/// Materialized index range `[low, high)` and the target row count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WindowState {
    pub low: usize,
    pub high: usize,
    pub capacity: usize,
}

impl WindowState {
    pub fn len(&self) -> usize {
        self.high - self.low
    }

    pub fn is_empty(&self) -> bool {
        self.high == self.low
    }
}

/// A page load the window is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub generation: u64,
    pub direction: Direction,
    pub low: usize,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScrollOutcome {
    /// Dead zone, dataset edge, nothing open, or a request already in flight.
    Idle,
    Loaded {
        direction: Direction,
        appended: usize,
        evicted: usize,
    },
    /// The fetch failed or came back empty; no further loads in this
    /// direction until the window is reopened.
    Exhausted { direction: Direction },
    /// The response belongs to a selection that is no longer open.
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
enum Phase<Sel> {
    Empty,
    Loaded { selection: Sel, len: usize },
}

/// Viewport controller for one paged dataset.
#[derive(Debug, Clone)]
pub struct VirtualWindow<Sel> {
    config: WindowConfig,
    phase: Phase<Sel>,
    state: WindowState,
    generation: u64,
    in_flight: Option<PageRequest>,
    /// Backward loads stop here.
    head_floor: usize,
    /// Forward loads stop here.
    tail_limit: usize,
}

/// Window over one trace's allocation intervals.
pub type ChunkWindow = VirtualWindow<TraceId>;
/// Window over the sorted trace list.
pub type TraceWindow = VirtualWindow<TraceListKey>;

impl<Sel: Clone + PartialEq + fmt::Debug> VirtualWindow<Sel> {
    pub fn new(config: WindowConfig) -> Self {
        Self {
            state: WindowState {
                capacity: config.initial_capacity,
                ..WindowState::default()
            },
            config,
            phase: Phase::Empty,
            generation: 0,
            in_flight: None,
            head_floor: 0,
            tail_limit: 0,
        }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn in_flight(&self) -> Option<PageRequest> {
        self.in_flight
    }

    pub fn is_open(&self) -> bool {
        matches!(self.phase, Phase::Loaded { .. })
    }

    pub fn selection(&self) -> Option<&Sel> {
        match &self.phase {
            Phase::Empty => None,
            Phase::Loaded { selection, .. } => Some(selection),
        }
    }

    /// Dataset length reported when the selection was opened.
    pub fn dataset_len(&self) -> Option<usize> {
        match &self.phase {
            Phase::Empty => None,
            Phase::Loaded { len, .. } => Some(*len),
        }
    }

    /// Show `selection` from its first record, discarding whatever was shown.
    ///
    /// A failing source leaves the window open but empty.
    pub fn open<S>(&mut self, selection: Sel, source: &S, sink: &mut impl Sink<S::Record>) -> WindowState
    where
        S: PageSource<Selection = Sel>,
    {
        self.close(sink);

        let total = source.total_len(&selection).unwrap_or_else(|err| {
            warn!(?selection, error = %err, "could not size selection");
            0
        });
        let count = self.config.initial_capacity.min(total);

        let mut records = if count == 0 {
            Vec::new()
        } else {
            source.fetch_page(&selection, 0, count).unwrap_or_else(|err| {
                warn!(?selection, low = 0, count, error = %err, "initial page failed");
                Vec::new()
            })
        };
        records.truncate(count);

        let loaded = records.len();
        for (index, record) in records.into_iter().enumerate() {
            sink.insert(Edge::Tail, index, record);
        }

        self.state.low = 0;
        self.state.high = loaded;
        self.tail_limit = if loaded < count { loaded } else { total };
        self.phase = Phase::Loaded {
            selection,
            len: total,
        };
        debug!(total, loaded, generation = self.generation, "window opened");
        self.state
    }

    /// Like [`open`](Self::open), but keeps the current slice when `selection`
    /// is already the one shown. Returns whether the window was (re)opened.
    pub fn ensure_open<S>(&mut self, selection: Sel, source: &S, sink: &mut impl Sink<S::Record>) -> bool
    where
        S: PageSource<Selection = Sel>,
    {
        if self.selection() == Some(&selection) {
            return false;
        }
        self.open(selection, source, sink);
        true
    }

    /// Evict everything and forget the selection. Any response still in
    /// flight becomes stale.
    pub fn close<R>(&mut self, sink: &mut impl Sink<R>) {
        if !self.state.is_empty() {
            sink.evict(self.state.len(), Edge::Tail);
        }
        self.phase = Phase::Empty;
        self.state.low = 0;
        self.state.high = 0;
        self.generation += 1;
        self.in_flight = None;
        self.head_floor = 0;
        self.tail_limit = 0;
    }

    /// Decide whether a scroll position calls for a page load.
    ///
    /// Returns `None` in the dead zone between the two thresholds, at the
    /// dataset edge, with nothing open, or while another request is pending.
    /// A returned request must be answered with [`complete`](Self::complete).
    pub fn request(&mut self, percent: f64) -> Option<PageRequest> {
        if !self.is_open() || self.in_flight.is_some() {
            return None;
        }
        let page = self.config.page_size;
        let threshold = self.config.high_threshold;

        let request = if percent > threshold {
            let count = page.min(self.tail_limit.saturating_sub(self.state.high));
            PageRequest {
                generation: self.generation,
                direction: Direction::Forward,
                low: self.state.high,
                count,
            }
        } else if percent < 100.0 - threshold {
            let count = page.min(self.state.low.saturating_sub(self.head_floor));
            PageRequest {
                generation: self.generation,
                direction: Direction::Backward,
                low: self.state.low - count,
                count,
            }
        } else {
            return None;
        };

        if request.count == 0 {
            return None;
        }
        self.in_flight = Some(request);
        Some(request)
    }

    /// Apply the response to a request issued by [`request`](Self::request).
    ///
    /// Records past the requested count are discarded. Failed or empty pages
    /// are logged and mark that direction exhausted.
    pub fn complete<R, E: fmt::Display>(
        &mut self,
        request: PageRequest,
        result: Result<Vec<R>, E>,
        sink: &mut impl Sink<R>,
    ) -> ScrollOutcome {
        if request.generation != self.generation || self.in_flight != Some(request) {
            debug!(
                generation = request.generation,
                current = self.generation,
                low = request.low,
                "dropping stale page"
            );
            return ScrollOutcome::Stale;
        }
        self.in_flight = None;

        let direction = request.direction;
        let mut records = match result {
            Ok(records) => records,
            Err(err) => {
                warn!(low = request.low, count = request.count, ?direction, error = %err, "page fetch failed");
                self.exhaust(direction);
                return ScrollOutcome::Exhausted { direction };
            }
        };
        records.truncate(request.count);

        if records.is_empty() {
            warn!(low = request.low, count = request.count, ?direction, "empty page inside dataset");
            self.exhaust(direction);
            return ScrollOutcome::Exhausted { direction };
        }

        let appended = records.len();
        let evicted = (self.state.len() + appended).saturating_sub(self.state.capacity);

        match direction {
            Direction::Forward => {
                for (offset, record) in records.into_iter().enumerate() {
                    sink.insert(Edge::Tail, request.low + offset, record);
                }
                if evicted > 0 {
                    sink.evict(evicted, Edge::Head);
                }
                self.state.high += appended;
                self.state.low += evicted;
                if appended < request.count {
                    self.tail_limit = self.state.high;
                }
            }
            Direction::Backward => {
                // A short backward page would leave a gap before `low`.
                if appended < request.count {
                    warn!(
                        low = request.low,
                        count = request.count,
                        appended,
                        "short page before window head"
                    );
                    self.exhaust(direction);
                    return ScrollOutcome::Exhausted { direction };
                }
                for (offset, record) in records.into_iter().enumerate().rev() {
                    sink.insert(Edge::Head, request.low + offset, record);
                }
                if evicted > 0 {
                    sink.evict(evicted, Edge::Tail);
                }
                self.state.low = request.low;
                self.state.high -= evicted;
            }
        }

        debug!(
            ?direction,
            appended,
            evicted,
            low = self.state.low,
            high = self.state.high,
            "page loaded"
        );
        ScrollOutcome::Loaded {
            direction,
            appended,
            evicted,
        }
    }

    /// React to a scroll position by fetching synchronously from `source`.
    pub fn on_scroll<S>(&mut self, percent: f64, source: &S, sink: &mut impl Sink<S::Record>) -> ScrollOutcome
    where
        S: PageSource<Selection = Sel>,
    {
        let Some(selection) = self.selection().cloned() else {
            return ScrollOutcome::Idle;
        };
        let Some(request) = self.request(percent) else {
            return ScrollOutcome::Idle;
        };
        let result = source.fetch_page(&selection, request.low, request.count);
        self.complete(request, result, sink)
    }

    fn exhaust(&mut self, direction: Direction) {
        match direction {
            Direction::Forward => self.tail_limit = self.state.high,
            Direction::Backward => self.head_floor = self.state.low,
        }
    }
}

/// Scroll position of a viewport as a percentage of its overflow.
///
/// `None` when the content fits without scrolling.
pub fn scroll_percent(scroll_top: f64, scroll_height: f64, client_height: f64) -> Option<f64> {
    let overflow = scroll_height - client_height;
    if overflow.is_nan() || overflow <= 0.0 || !scroll_top.is_finite() {
        return None;
    }
    Some((scroll_top / overflow * 100.0).clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("source offline")]
    struct Offline;

    /// Rows are their own indices. `served` may be shorter than `len` to
    /// simulate a source that under-delivers.
    struct Numbers {
        len: usize,
        served: usize,
        offline: Cell<bool>,
        fetches: Cell<usize>,
    }

    impl Numbers {
        fn new(len: usize) -> Self {
            Self {
                len,
                served: len,
                offline: Cell::new(false),
                fetches: Cell::new(0),
            }
        }
    }

    impl PageSource for Numbers {
        type Selection = u8;
        type Record = usize;
        type Error = Offline;

        fn total_len(&self, _: &u8) -> Result<usize, Offline> {
            Ok(self.len)
        }

        fn fetch_page(&self, _: &u8, low: usize, count: usize) -> Result<Vec<usize>, Offline> {
            self.fetches.set(self.fetches.get() + 1);
            if self.offline.get() {
                return Err(Offline);
            }
            Ok((low..(low + count).min(self.served)).collect())
        }
    }

    fn config(capacity: usize, page: usize) -> WindowConfig {
        WindowConfig {
            initial_capacity: capacity,
            page_size: page,
            high_threshold: 90.0,
        }
    }

    fn indices(buffer: &RowBuffer<usize>) -> Vec<usize> {
        buffer.iter().map(|(index, _)| index).collect()
    }

    fn assert_consistent(window: &VirtualWindow<u8>, buffer: &RowBuffer<usize>) {
        let state = window.state();
        assert_eq!(indices(buffer), (state.low..state.high).collect::<Vec<_>>());
        assert!(buffer.iter().all(|(index, record)| index == *record));
    }

    #[test]
    fn open_materializes_the_first_slice() {
        let source = Numbers::new(100);
        let mut buffer = RowBuffer::new();
        let mut window = VirtualWindow::new(config(20, 5));

        let state = window.open(1, &source, &mut buffer);
        assert_eq!(state, WindowState { low: 0, high: 20, capacity: 20 });
        assert_eq!(window.dataset_len(), Some(100));
        assert_consistent(&window, &buffer);
    }

    #[test]
    fn small_dataset_fits_without_paging() {
        let source = Numbers::new(7);
        let mut buffer = RowBuffer::new();
        let mut window = VirtualWindow::new(config(20, 5));

        window.open(1, &source, &mut buffer);
        assert_eq!(window.state().high, 7);
        assert_eq!(window.on_scroll(100.0, &source, &mut buffer), ScrollOutcome::Idle);
        assert_eq!(window.on_scroll(0.0, &source, &mut buffer), ScrollOutcome::Idle);
        assert_eq!(source.fetches.get(), 1);
    }

    #[test]
    fn forward_scroll_slides_the_window() {
        let source = Numbers::new(100);
        let mut buffer = RowBuffer::new();
        let mut window = VirtualWindow::new(config(20, 5));
        window.open(1, &source, &mut buffer);

        assert_eq!(
            window.on_scroll(95.0, &source, &mut buffer),
            ScrollOutcome::Loaded {
                direction: Direction::Forward,
                appended: 5,
                evicted: 5
            }
        );
        assert_eq!(window.state().low, 5);
        assert_eq!(window.state().high, 25);
        assert_eq!(buffer.len(), 20);
        assert_consistent(&window, &buffer);
    }

    #[test]
    fn dead_zone_does_nothing() {
        let source = Numbers::new(100);
        let mut buffer = RowBuffer::new();
        let mut window = VirtualWindow::new(config(20, 5));
        window.open(1, &source, &mut buffer);
        window.on_scroll(95.0, &source, &mut buffer);
        let before = window.state();

        for percent in [10.0, 50.0, 90.0, f64::NAN] {
            assert_eq!(window.on_scroll(percent, &source, &mut buffer), ScrollOutcome::Idle);
        }
        assert_eq!(window.state(), before);
    }

    #[test]
    fn backward_scroll_restores_earlier_rows() {
        let source = Numbers::new(100);
        let mut buffer = RowBuffer::new();
        let mut window = VirtualWindow::new(config(20, 5));
        window.open(1, &source, &mut buffer);
        for _ in 0..3 {
            window.on_scroll(95.0, &source, &mut buffer);
        }
        assert_eq!(window.state().low, 15);

        assert_eq!(
            window.on_scroll(5.0, &source, &mut buffer),
            ScrollOutcome::Loaded {
                direction: Direction::Backward,
                appended: 5,
                evicted: 5
            }
        );
        assert_eq!(window.state().low, 10);
        assert_eq!(window.state().high, 30);
        assert_consistent(&window, &buffer);
    }

    #[test]
    fn backward_at_the_start_is_a_no_op() {
        let source = Numbers::new(100);
        let mut buffer = RowBuffer::new();
        let mut window = VirtualWindow::new(config(20, 5));
        window.open(1, &source, &mut buffer);
        assert_eq!(window.on_scroll(0.0, &source, &mut buffer), ScrollOutcome::Idle);
        assert_eq!(source.fetches.get(), 1);
    }

    #[test]
    fn pages_are_clamped_at_both_dataset_edges() {
        let source = Numbers::new(23);
        let mut buffer = RowBuffer::new();
        let mut window = VirtualWindow::new(config(20, 5));
        window.open(1, &source, &mut buffer);

        assert_eq!(
            window.on_scroll(99.0, &source, &mut buffer),
            ScrollOutcome::Loaded {
                direction: Direction::Forward,
                appended: 3,
                evicted: 3
            }
        );
        assert_eq!(window.state().high, 23);
        assert_eq!(window.on_scroll(99.0, &source, &mut buffer), ScrollOutcome::Idle);

        assert_eq!(
            window.on_scroll(1.0, &source, &mut buffer),
            ScrollOutcome::Loaded {
                direction: Direction::Backward,
                appended: 3,
                evicted: 3
            }
        );
        assert_eq!(window.state().low, 0);
        assert_eq!(window.state().high, 20);
        assert_consistent(&window, &buffer);
    }

    #[test]
    fn failed_fetch_exhausts_that_direction_until_reopened() {
        let source = Numbers::new(100);
        let mut buffer = RowBuffer::new();
        let mut window = VirtualWindow::new(config(20, 5));
        window.open(1, &source, &mut buffer);

        source.offline.set(true);
        assert_eq!(
            window.on_scroll(95.0, &source, &mut buffer),
            ScrollOutcome::Exhausted {
                direction: Direction::Forward
            }
        );
        source.offline.set(false);
        assert_eq!(window.on_scroll(95.0, &source, &mut buffer), ScrollOutcome::Idle);
        assert_eq!(window.state().high, 20);
        assert_consistent(&window, &buffer);

        window.open(1, &source, &mut buffer);
        assert!(matches!(
            window.on_scroll(95.0, &source, &mut buffer),
            ScrollOutcome::Loaded { .. }
        ));
    }

    #[test]
    fn empty_page_inside_the_dataset_is_not_retried() {
        let mut source = Numbers::new(100);
        source.served = 30;
        let mut buffer = RowBuffer::new();
        let mut window = VirtualWindow::new(config(20, 5));
        window.open(1, &source, &mut buffer);

        window.on_scroll(95.0, &source, &mut buffer);
        window.on_scroll(95.0, &source, &mut buffer);
        assert_eq!(window.state().high, 30);
        assert_eq!(
            window.on_scroll(95.0, &source, &mut buffer),
            ScrollOutcome::Exhausted {
                direction: Direction::Forward
            }
        );
        let fetches = source.fetches.get();
        assert_eq!(window.on_scroll(95.0, &source, &mut buffer), ScrollOutcome::Idle);
        assert_eq!(source.fetches.get(), fetches);
    }

    #[test]
    fn short_forward_page_marks_the_end() {
        let mut source = Numbers::new(100);
        source.served = 22;
        let mut buffer = RowBuffer::new();
        let mut window = VirtualWindow::new(config(20, 5));
        window.open(1, &source, &mut buffer);

        assert_eq!(
            window.on_scroll(95.0, &source, &mut buffer),
            ScrollOutcome::Loaded {
                direction: Direction::Forward,
                appended: 2,
                evicted: 2
            }
        );
        assert_eq!(window.on_scroll(95.0, &source, &mut buffer), ScrollOutcome::Idle);
        assert_consistent(&window, &buffer);
    }

    #[test]
    fn only_one_request_in_flight() {
        let source = Numbers::new(100);
        let mut buffer = RowBuffer::new();
        let mut window = VirtualWindow::new(config(20, 5));
        window.open(1, &source, &mut buffer);

        let request = window.request(95.0).unwrap();
        assert_eq!(request.low, 20);
        assert_eq!(request.count, 5);
        assert!(window.request(95.0).is_none());
        assert!(window.request(1.0).is_none());

        let page = source.fetch_page(&1, request.low, request.count);
        assert!(matches!(
            window.complete(request, page, &mut buffer),
            ScrollOutcome::Loaded { appended: 5, .. }
        ));
        assert!(window.request(95.0).is_some());
    }

    #[test]
    fn responses_for_a_replaced_selection_are_dropped() {
        let source = Numbers::new(100);
        let mut buffer = RowBuffer::new();
        let mut window = VirtualWindow::new(config(20, 5));
        window.open(1, &source, &mut buffer);

        let request = window.request(95.0).unwrap();
        window.open(2, &source, &mut buffer);
        let page = source.fetch_page(&1, request.low, request.count);
        assert_eq!(window.complete(request, page, &mut buffer), ScrollOutcome::Stale);
        assert_eq!(window.state().high, 20);
        assert_consistent(&window, &buffer);
    }

    #[test]
    fn oversized_pages_are_truncated() {
        let source = Numbers::new(100);
        let mut buffer = RowBuffer::new();
        let mut window = VirtualWindow::new(config(20, 5));
        window.open(1, &source, &mut buffer);

        let request = window.request(95.0).unwrap();
        let page: Result<Vec<usize>, Offline> = Ok((20..70).collect());
        assert_eq!(
            window.complete(request, page, &mut buffer),
            ScrollOutcome::Loaded {
                direction: Direction::Forward,
                appended: 5,
                evicted: 5
            }
        );
        assert_consistent(&window, &buffer);
    }

    #[test]
    fn close_empties_the_sink() {
        let source = Numbers::new(100);
        let mut buffer = RowBuffer::new();
        let mut window = VirtualWindow::new(config(20, 5));
        window.open(1, &source, &mut buffer);
        let generation = window.generation();

        window.close(&mut buffer);
        assert!(buffer.is_empty());
        assert!(!window.is_open());
        assert!(window.generation() > generation);
        assert_eq!(window.on_scroll(95.0, &source, &mut buffer), ScrollOutcome::Idle);
    }

    #[test]
    fn ensure_open_keeps_the_current_slice() {
        let source = Numbers::new(100);
        let mut buffer = RowBuffer::new();
        let mut window = VirtualWindow::new(config(20, 5));

        assert!(window.ensure_open(1, &source, &mut buffer));
        window.on_scroll(95.0, &source, &mut buffer);
        assert!(!window.ensure_open(1, &source, &mut buffer));
        assert_eq!(window.state().low, 5);

        assert!(window.ensure_open(2, &source, &mut buffer));
        assert_eq!(window.state().low, 0);
        assert_consistent(&window, &buffer);
    }

    #[test]
    fn scroll_percent_handles_degenerate_viewports() {
        assert_eq!(scroll_percent(0.0, 1_000.0, 200.0), Some(0.0));
        assert_eq!(scroll_percent(400.0, 1_000.0, 200.0), Some(50.0));
        assert_eq!(scroll_percent(900.0, 1_000.0, 200.0), Some(100.0));
        assert_eq!(scroll_percent(0.0, 200.0, 200.0), None);
        assert_eq!(scroll_percent(0.0, 100.0, 200.0), None);
    }
}

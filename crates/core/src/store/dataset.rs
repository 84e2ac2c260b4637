use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use heaplens_protocol::{
    FlameMode, Interval, SortKey, TimeBounds, Timestamp, TraceId, TraceListKey, TraceSummary,
    TreeNode, stack_frames,
};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{StoreError, TraceStore};
use crate::series::{aggregate, peak};
use crate::tree::HIDDEN_BRANCH;

/// Name of the synthesized tree's root.
const ROOT_NAME: &str = "process";

#[derive(Debug, Deserialize)]
struct DatasetFile {
    traces: Vec<TraceRecord>,
    #[serde(default)]
    time_filter: Option<TimeBounds>,
    /// Trees computed by the profiler, keyed by flame mode name.
    #[serde(default)]
    flame_trees: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct TraceRecord {
    stack: String,
    #[serde(rename = "type", default)]
    type_name: String,
    #[serde(default)]
    chunks: Vec<Interval>,
    #[serde(default = "perfect_score")]
    usage_score: f64,
    #[serde(default = "perfect_score")]
    lifetime_score: f64,
    #[serde(default = "perfect_score")]
    useful_lifetime_score: f64,
    #[serde(default)]
    alloc_time_total: Timestamp,
    /// Filed under the hidden branch of synthesized flame trees.
    #[serde(default)]
    hidden: bool,
}

fn perfect_score() -> f64 {
    1.0
}

#[derive(Debug, Clone)]
struct Trace {
    record: TraceRecord,
    max_aggregate: i64,
}

impl Trace {
    fn overlaps(&self, bounds: TimeBounds) -> bool {
        self.record
            .chunks
            .iter()
            .any(|c| c.start.unwrap_or(c.end) <= bounds.max && c.end >= bounds.min)
    }

    fn weight(&self, mode: FlameMode, time: Option<Timestamp>) -> f64 {
        let chunks = &self.record.chunks;
        match mode {
            FlameMode::BytesTotal => chunks.iter().map(|c| c.size as f64).sum(),
            FlameMode::NumAllocs => chunks.len() as f64,
            FlameMode::BytesTime => {
                let t = time.unwrap_or(0);
                chunks
                    .iter()
                    .filter(|c| c.start.is_some_and(|start| start <= t) && t < c.end)
                    .map(|c| c.size as f64)
                    .sum()
            }
            FlameMode::PeakWaste => {
                self.max_aggregate as f64 * (1.0 - self.record.usage_score.clamp(0.0, 1.0))
            }
        }
    }
}

/// In-memory [`TraceStore`] backed by a JSON dataset.
///
/// Traces are addressed by their position in the file. The trace list is
/// the subset passing every active filter, in the order of the current
/// [`SortKey`]; each re-sort or filter change starts a new list generation.
///
/// A trace is listed when it overlaps the time filter, its stack contains
/// every stack keyword, and its type equals one of the type filters (when
/// any are set).
#[derive(Debug, Clone)]
pub struct JsonDataset {
    traces: Vec<Trace>,
    max_time: Timestamp,
    filter: Option<TimeBounds>,
    stack_keywords: BTreeSet<String>,
    type_names: BTreeSet<String>,
    sort: SortKey,
    generation: u64,
    /// Visible trace indices in list order.
    order: Vec<usize>,
    trees: HashMap<FlameMode, TreeNode>,
}

impl JsonDataset {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let file: DatasetFile = serde_json::from_str(json)?;

        let max_time = file
            .traces
            .iter()
            .flat_map(|t| &t.chunks)
            .map(|c| c.end.max(c.start.unwrap_or(0)))
            .max()
            .unwrap_or(0);

        let mut traces = Vec::with_capacity(file.traces.len());
        for (index, mut record) in file.traces.into_iter().enumerate() {
            record.chunks.sort_by_key(|c| (c.start, c.end));
            let series = aggregate(&record.chunks, max_time).map_err(|source| {
                StoreError::InvalidChunks {
                    trace: TraceId(index as u32),
                    source,
                }
            })?;
            traces.push(Trace {
                max_aggregate: peak(&series),
                record,
            });
        }

        let mut trees = HashMap::new();
        for (key, value) in file.flame_trees {
            match key.parse::<FlameMode>() {
                Ok(mode) => {
                    trees.insert(mode, TreeNode::from_value(value)?);
                }
                Err(err) => warn!(key = %key, %err, "ignoring flame tree"),
            }
        }

        let mut dataset = Self {
            traces,
            max_time,
            filter: file.time_filter,
            stack_keywords: BTreeSet::new(),
            type_names: BTreeSet::new(),
            sort: SortKey::default(),
            generation: 0,
            order: Vec::new(),
            trees,
        };
        dataset.rebuild_order();
        debug!(
            traces = dataset.traces.len(),
            visible = dataset.order.len(),
            max_time,
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Latest timestamp of any chunk.
    pub fn max_time(&self) -> Timestamp {
        self.max_time
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort
    }

    /// Restrict the trace list and horizon to `bounds` (reordered if inverted).
    pub fn set_time_filter(&mut self, bounds: TimeBounds) {
        self.filter = Some(TimeBounds::new(
            bounds.min.min(bounds.max),
            bounds.min.max(bounds.max),
        ));
        self.rebuild_order();
    }

    pub fn clear_time_filter(&mut self) {
        self.filter = None;
        self.rebuild_order();
    }

    /// Keep only traces whose stack contains `keyword`. Returns `false`
    /// (and leaves the list alone) for blank or already active keywords.
    pub fn add_stack_keyword(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() || !self.stack_keywords.insert(keyword.to_owned()) {
            return false;
        }
        self.rebuild_order();
        true
    }

    pub fn remove_stack_keyword(&mut self, keyword: &str) -> bool {
        if !self.stack_keywords.remove(keyword.trim()) {
            return false;
        }
        self.rebuild_order();
        true
    }

    pub fn clear_stack_keywords(&mut self) {
        if !self.stack_keywords.is_empty() {
            self.stack_keywords.clear();
            self.rebuild_order();
        }
    }

    /// Add `type_name` to the accepted allocation types.
    pub fn add_type_filter(&mut self, type_name: &str) -> bool {
        let type_name = type_name.trim();
        if type_name.is_empty() || !self.type_names.insert(type_name.to_owned()) {
            return false;
        }
        self.rebuild_order();
        true
    }

    pub fn clear_type_filters(&mut self) {
        if !self.type_names.is_empty() {
            self.type_names.clear();
            self.rebuild_order();
        }
    }

    pub fn sort_traces(&mut self, sort: SortKey) {
        self.sort = sort;
        self.rebuild_order();
    }

    fn listed(&self, trace: &Trace) -> bool {
        let record = &trace.record;
        self.filter.is_none_or(|bounds| trace.overlaps(bounds))
            && self
                .stack_keywords
                .iter()
                .all(|keyword| record.stack.contains(keyword.as_str()))
            && (self.type_names.is_empty() || self.type_names.contains(&record.type_name))
    }

    fn rebuild_order(&mut self) {
        let mut order: Vec<usize> = (0..self.traces.len())
            .filter(|&i| self.listed(&self.traces[i]))
            .collect();

        let traces = &self.traces;
        match self.sort {
            SortKey::Bytes => order.sort_by_key(|&i| std::cmp::Reverse(traces[i].max_aggregate)),
            SortKey::NumChunks => {
                order.sort_by_key(|&i| std::cmp::Reverse(traces[i].record.chunks.len()));
            }
            SortKey::AllocTime => {
                order.sort_by_key(|&i| std::cmp::Reverse(traces[i].record.alloc_time_total));
            }
            SortKey::Usage => {
                order.sort_by(|&a, &b| {
                    traces[a].record.usage_score.total_cmp(&traces[b].record.usage_score)
                });
            }
            SortKey::Lifetime => {
                order.sort_by(|&a, &b| {
                    traces[a]
                        .record
                        .lifetime_score
                        .total_cmp(&traces[b].record.lifetime_score)
                });
            }
            SortKey::UsefulLifetime => {
                order.sort_by(|&a, &b| {
                    traces[a]
                        .record
                        .useful_lifetime_score
                        .total_cmp(&traces[b].record.useful_lifetime_score)
                });
            }
        }

        self.order = order;
        self.generation += 1;
    }

    fn trace(&self, trace: TraceId) -> Result<&Trace, StoreError> {
        self.traces
            .get(trace.0 as usize)
            .ok_or(StoreError::UnknownTrace(trace))
    }

    fn summary(&self, index: usize) -> TraceSummary {
        let trace = &self.traces[index];
        let record = &trace.record;
        TraceSummary {
            trace: TraceId(index as u32),
            stack: record.stack.clone(),
            type_name: record.type_name.clone(),
            num_chunks: record.chunks.len(),
            max_aggregate: trace.max_aggregate,
            alloc_time_total: record.alloc_time_total,
            usage_score: record.usage_score,
            lifetime_score: record.lifetime_score,
            useful_lifetime_score: record.useful_lifetime_score,
        }
    }
}

impl TraceStore for JsonDataset {
    fn trace_count(&self) -> usize {
        self.order.len()
    }

    fn chunk_count(&self, trace: TraceId) -> Result<usize, StoreError> {
        Ok(self.trace(trace)?.record.chunks.len())
    }

    fn intervals_for_trace(
        &self,
        trace: TraceId,
        low: usize,
        count: usize,
    ) -> Result<Vec<Interval>, StoreError> {
        let chunks = &self.trace(trace)?.record.chunks;
        let low = low.min(chunks.len());
        let high = low.saturating_add(count).min(chunks.len());
        Ok(chunks[low..high].to_vec())
    }

    fn trace_list(&self, low: usize, count: usize) -> Vec<TraceSummary> {
        self.order
            .iter()
            .skip(low)
            .take(count)
            .map(|&index| self.summary(index))
            .collect()
    }

    fn list_key(&self) -> TraceListKey {
        TraceListKey {
            sort: self.sort,
            generation: self.generation,
        }
    }

    fn time_filter_bounds(&self) -> TimeBounds {
        self.filter
            .unwrap_or_else(|| TimeBounds::new(0, self.max_time))
    }

    fn horizon(&self) -> Timestamp {
        self.time_filter_bounds().max
    }

    fn synthesize_flame_tree(
        &self,
        mode: FlameMode,
        time: Option<Timestamp>,
    ) -> Result<TreeNode, StoreError> {
        if mode.is_timed() && time.is_none() {
            return Err(StoreError::MissingTime(mode));
        }
        if !mode.is_timed()
            && let Some(tree) = self.trees.get(&mode)
        {
            return Ok(tree.clone());
        }

        let mut members = self.order.clone();
        members.sort_unstable();

        let mut shown = StackNode::new(ROOT_NAME);
        let mut hidden = StackNode::new(HIDDEN_BRANCH);
        for index in members {
            let trace = &self.traces[index];
            let site = Site {
                weight: trace.weight(mode, time),
                usage_score: trace.record.usage_score,
                lifetime_score: trace.record.lifetime_score,
                useful_lifetime_score: trace.record.useful_lifetime_score,
            };
            let frames = stack_frames(&trace.record.stack);
            if trace.record.hidden {
                hidden.insert(frames, site);
            } else {
                shown.insert(frames, site);
            }
        }

        let mut root = shown.into_branch();
        if !hidden.children.is_empty() {
            let hidden = hidden.into_branch();
            root.value += hidden.value;
            root.children.get_or_insert_with(Vec::new).push(hidden);
        }
        debug!(?mode, nodes = root.node_count(), "flame tree synthesized");
        Ok(root)
    }
}

#[derive(Debug, Clone, Copy)]
struct Site {
    weight: f64,
    usage_score: f64,
    lifetime_score: f64,
    useful_lifetime_score: f64,
}

/// Call-path trie built while synthesizing a flame tree.
#[derive(Debug)]
struct StackNode<'a> {
    name: &'a str,
    children: Vec<StackNode<'a>>,
    /// Allocation sites whose stack ends at this frame.
    site: Option<Site>,
}

impl<'a> StackNode<'a> {
    fn new(name: &'a str) -> Self {
        Self {
            name,
            children: Vec::new(),
            site: None,
        }
    }

    fn insert(&mut self, mut frames: impl Iterator<Item = &'a str>, site: Site) {
        let Some(frame) = frames.next() else {
            match &mut self.site {
                Some(existing) => existing.weight += site.weight,
                None => self.site = Some(site),
            }
            return;
        };
        let pos = match self.children.iter().position(|c| c.name == frame) {
            Some(pos) => pos,
            None => {
                self.children.push(StackNode::new(frame));
                self.children.len() - 1
            }
        };
        self.children[pos].insert(frames, site);
    }

    fn site_leaf(name: &str, site: Site) -> TreeNode {
        TreeNode::leaf(name, site.weight)
            .with_score("usage_score", site.usage_score)
            .with_score("lifetime_score", site.lifetime_score)
            .with_score("useful_lifetime_score", site.useful_lifetime_score)
    }

    /// Always an internal node, even with no children.
    fn into_branch(self) -> TreeNode {
        let mut children: Vec<TreeNode> =
            self.children.into_iter().map(StackNode::into_tree).collect();
        if let Some(site) = self.site {
            children.push(Self::site_leaf(self.name, site));
        }
        TreeNode::branch(self.name, children)
    }

    fn into_tree(self) -> TreeNode {
        match self.site {
            Some(site) if self.children.is_empty() => Self::site_leaf(self.name, site),
            _ => self.into_branch(),
        }
    }
}

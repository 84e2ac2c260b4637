//! Command line front-end: load a JSON dataset, run one view pipeline and
//! print the result as JSON on stdout.
//!
//! ```bash
//! heaplens series trace.json --trace 3
//! heaplens flame trace.json --mode bytes_time --time 1200 --keyword parse
//! heaplens scroll trace.json --trace 3 --at 95,95,5
//! RUST_LOG=debug heaplens traces trace.json --sort usage --stack main --type Node
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use heaplens_core::tree::KeywordSet;
use heaplens_core::views::{FlameRequest, flame_view, global_live_bytes, trace_live_bytes};
use heaplens_core::{
    ChunkPages, JsonDataset, PageSource, RowBuffer, ScrollOutcome, ShapingConfig, TracePages,
    TraceStore, ViewContext, VirtualWindow, WindowConfig, WindowState,
};
use heaplens_protocol::{FlameMode, SortKey, TimeBounds, TraceId};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "heaplens")]
#[command(about = "Shape heap-allocation trace datasets into chart data")]
#[command(version)]
struct Args {
    /// Shaping config (JSON); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Which traces the dataset lists.
#[derive(clap::Args, Debug)]
struct ListFilters {
    /// Keep traces whose stack contains this text (repeatable; all must match)
    #[arg(long = "stack")]
    stack_keywords: Vec<String>,
    /// Keep traces of this allocation type (repeatable; any may match)
    #[arg(long = "type")]
    type_names: Vec<String>,
    /// Start of the time filter
    #[arg(long)]
    from: Option<u64>,
    /// End of the time filter
    #[arg(long)]
    to: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Live bytes over time, for one trace or the whole list
    Series {
        dataset: PathBuf,
        #[command(flatten)]
        filters: ListFilters,
        #[arg(long)]
        trace: Option<u32>,
        /// Override the configured display bin budget
        #[arg(long)]
        max_bins: Option<usize>,
    },
    /// Filtered flame graph tree
    Flame {
        dataset: PathBuf,
        #[command(flatten)]
        filters: ListFilters,
        #[arg(long, default_value = "bytes_total")]
        mode: FlameMode,
        /// Point in time for bytes_time
        #[arg(long)]
        time: Option<u64>,
        #[arg(long = "keyword")]
        keywords: Vec<String>,
        #[arg(long)]
        show_hidden: bool,
    },
    /// Replay scroll positions against a virtual window
    Scroll {
        dataset: PathBuf,
        #[command(flatten)]
        filters: ListFilters,
        /// Scroll the trace's chunks instead of the trace list
        #[arg(long)]
        trace: Option<u32>,
        #[arg(long, value_delimiter = ',', required = true)]
        at: Vec<f64>,
    },
    /// First page of the sorted trace list
    Traces {
        dataset: PathBuf,
        #[command(flatten)]
        filters: ListFilters,
        #[arg(long, default_value = "bytes")]
        sort: SortKey,
    },
}

#[derive(Serialize)]
struct ScrollStep {
    percent: f64,
    outcome: ScrollOutcome,
    state: WindowState,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ShapingConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ShapingConfig::default(),
    };

    match args.command {
        Command::Series {
            dataset,
            filters,
            trace,
            max_bins,
        } => {
            let store = load(&dataset, &filters)?;
            let mut ctx = ViewContext::capture(&store, &config);
            if let Some(max_bins) = max_bins {
                ctx = ctx.with_max_bins(max_bins);
            }
            let live = match trace {
                Some(id) => trace_live_bytes(&store, TraceId(id), &ctx)?,
                None => global_live_bytes(&store, &ctx)?,
            };
            emit(&live)
        }
        Command::Flame {
            dataset,
            filters,
            mode,
            time,
            keywords,
            show_hidden,
        } => {
            let store = load(&dataset, &filters)?;
            let request = FlameRequest {
                mode,
                time,
                keywords: KeywordSet::parse(&keywords.join(" ")),
                show_hidden,
            };
            emit(&flame_view(&store, &request)?)
        }
        Command::Scroll {
            dataset,
            filters,
            trace,
            at,
        } => {
            let store = load(&dataset, &filters)?;
            let steps = match trace {
                Some(id) => replay(
                    config.chunk_window,
                    TraceId(id),
                    &ChunkPages::new(&store),
                    &at,
                ),
                None => replay(
                    config.trace_window,
                    store.list_key(),
                    &TracePages::new(&store),
                    &at,
                ),
            };
            emit(&steps)
        }
        Command::Traces {
            dataset,
            filters,
            sort,
        } => {
            let mut store = load(&dataset, &filters)?;
            store.sort_traces(sort);
            emit(&store.trace_list(0, config.trace_window.initial_capacity))
        }
    }
}

fn load(path: &Path, filters: &ListFilters) -> Result<JsonDataset> {
    let mut store = JsonDataset::from_json_file(path)
        .with_context(|| format!("loading dataset {}", path.display()))?;
    for keyword in &filters.stack_keywords {
        store.add_stack_keyword(keyword);
    }
    for type_name in &filters.type_names {
        store.add_type_filter(type_name);
    }
    if filters.from.is_some() || filters.to.is_some() {
        let min = filters.from.unwrap_or(0);
        let max = filters.to.unwrap_or_else(|| store.max_time());
        store.set_time_filter(TimeBounds::new(min, max));
    }
    tracing::info!(
        path = %path.display(),
        traces = store.trace_count(),
        horizon = store.horizon(),
        "dataset loaded"
    );
    Ok(store)
}

fn replay<S: PageSource>(
    config: WindowConfig,
    selection: S::Selection,
    source: &S,
    positions: &[f64],
) -> Vec<ScrollStep> {
    let mut window = VirtualWindow::new(config);
    let mut rows = RowBuffer::new();
    window.open(selection, source, &mut rows);
    positions
        .iter()
        .map(|&percent| ScrollStep {
            percent,
            outcome: window.on_scroll(percent, source, &mut rows),
            state: window.state(),
        })
        .collect()
}

fn emit<T: Serialize>(value: &T) -> Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

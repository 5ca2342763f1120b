mod fixture;
mod stats;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use clap::Parser;
use exposure_catalog::{AdjStoreCacheSizes, Catalog};
use exposure_engine::{load_context, resolve, EngineOptions, ResolutionFront};
use exposure_types::PackageName;
use fixture::JsonFixture;
use indicatif::{ProgressBar, ProgressStyle};
use miette::{Context, IntoDiagnostic};
use stats::RunStats;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Run resolution for every node of a subgraph against one pinned root,
/// mirroring `pipstyle/run.py`'s CLI one-for-one (storage is abstracted
/// behind `--catalog-file`, since the engine has no Mongo dependency).
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a JSON fixture file providing the catalog, subgraph metadata
    /// and node list. The Rust analogue of `--mongo-uri`/`--pypi-db`/
    /// `--subgraphs-db` now that the backend is abstracted behind `Catalog`.
    #[clap(long)]
    catalog_file: PathBuf,

    /// Subgraph name, used to name the output CSV (e.g. `urllib3_subgraph`).
    #[clap(long)]
    subgraph: String,

    /// Root version bit index (0..nbits-1). Default: latest (nbits-1).
    #[clap(long)]
    root_bit_index: Option<u32>,

    /// Output directory for the CSV and optional tree subdirectory.
    #[clap(long, default_value = "output")]
    output_dir: PathBuf,

    /// LRU cap for the chunk cache.
    #[clap(long, default_value_t = 200_000)]
    chunk_cache_cap: usize,

    /// LRU cap for the header cache.
    #[clap(long, default_value_t = 200_000)]
    header_cache_cap: usize,

    /// LRU cap for the edge-existence cache.
    #[clap(long, default_value_t = 2_000_000)]
    edge_cache_cap: usize,

    /// Store resolved dependency trees per node.
    #[clap(long)]
    debug: bool,

    /// Which resolution front to run: `resolver` (matches `pipstyle.entrypoint`
    /// exactly) or `backtracker` (exposes a fail-reason histogram).
    #[clap(long, default_value = "resolver")]
    front: FrontArg,

    /// Resolver round budget before giving up.
    #[clap(long, default_value_t = 100)]
    max_rounds: usize,

    /// Candidates considered per dependency name in the backtracker front, `0` = unlimited.
    #[clap(long, default_value_t = 0)]
    max_candidates_per_dep: usize,

    /// Log a progress line every N resolved nodes.
    #[clap(long, default_value_t = 1000)]
    progress_every: u64,
}

#[derive(Clone, Copy, Debug)]
enum FrontArg {
    Resolver,
    Backtracker,
}

impl FromStr for FrontArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resolver" => Ok(FrontArg::Resolver),
            "backtracker" => Ok(FrontArg::Backtracker),
            other => Err(format!("unknown front '{other}', expected 'resolver' or 'backtracker'")),
        }
    }
}

impl From<FrontArg> for ResolutionFront {
    fn from(value: FrontArg) -> Self {
        match value {
            FrontArg::Resolver => ResolutionFront::Resolver,
            FrontArg::Backtracker => ResolutionFront::Backtracker,
        }
    }
}

async fn actual_main() -> miette::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("exposure_cli=info,exposure_engine=info")))
        .init();

    let fixture = JsonFixture::load(&args.catalog_file)
        .await
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to load catalog fixture {}", args.catalog_file.display()))?;
    let (catalog, meta, subgraph_nodes) = fixture.into_parts();

    let bit_index = args.root_bit_index.unwrap_or(meta.nbits.saturating_sub(1));
    if bit_index as usize >= meta.root_ids.len() {
        return Err(miette::miette!(
            "--root-bit-index out of range: {bit_index}, valid: 0..{}",
            meta.root_ids.len().saturating_sub(1)
        ));
    }
    let root_id = exposure_types::NodeId(meta.root_ids[bit_index as usize]);
    tracing::info!(pkg = %meta.pkg, %bit_index, root_id = %root_id.0, nbits = meta.nbits, "resolved root from meta");

    let root_pkg_canon = PackageName::from_str(&meta.pkg)
        .into_diagnostic()
        .wrap_err_with(|| format!("invalid root package name '{}'", meta.pkg))?;

    let mut options = EngineOptions::default();
    options.with_cache_sizes(AdjStoreCacheSizes {
        header_cache_cap: args.header_cache_cap,
        chunk_cache_cap: args.chunk_cache_cap,
        edge_cache_cap: args.edge_cache_cap,
    });
    options.with_max_rounds(args.max_rounds);
    options.with_max_candidates_per_dep(args.max_candidates_per_dep);
    options.with_front(args.front.into());

    tracing::info!("loading resolution context");
    let name_rows = catalog
        .name_ids()
        .await
        .into_diagnostic()
        .wrap_err("failed to load name_ids from catalog")?;
    let root_name_id = name_rows
        .iter()
        .find(|(name, _)| name == root_pkg_canon.as_str())
        .map(|(_, id)| *id)
        .ok_or_else(|| miette::miette!("root package '{}' not found in name_ids", root_pkg_canon.as_str()))?;

    let ctx = load_context(Arc::new(catalog), &options).await.into_diagnostic()?;

    tokio::fs::create_dir_all(&args.output_dir)
        .await
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to create output directory {}", args.output_dir.display()))?;

    let trees_dir = if args.debug {
        let dir = args.output_dir.join(format!("{}_{}_resolved_trees", args.subgraph, bit_index));
        tokio::fs::create_dir_all(&dir).await.into_diagnostic()?;
        tracing::info!(dir = %dir.display(), "resolved trees will be written here");
        Some(dir)
    } else {
        None
    };

    let mut nodes: Vec<_> = subgraph_nodes;
    nodes.sort_by_key(|n| n.0);
    tracing::info!(count = nodes.len(), bit_index, "subgraph node list collected");

    let csv_path = args.output_dir.join(format!("{}_{}.csv", args.subgraph, bit_index));
    let mut writer = csv::Writer::from_path(&csv_path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to open {}", csv_path.display()))?;
    writer.write_record(["node_id", "resolved", "depth"]).into_diagnostic()?;

    use std::io::IsTerminal;
    let progress = if std::io::stderr().is_terminal() {
        let bar = ProgressBar::new(nodes.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} resolve [{pos}/{len}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    } else {
        None
    };

    let mut stats = RunStats::default();

    for (i, node_id) in nodes.into_iter().enumerate() {
        let Some(node_time) = ctx.arrays.upload_time(node_id) else {
            writer.write_record([node_id.0.to_string(), "false".to_string(), String::new()]).into_diagnostic()?;
            stats.record(false, -1);
            continue;
        };
        let root_time = ctx.arrays.upload_time(root_id).unwrap_or(node_time);
        let t_cutoff = node_time.max(root_time);

        let result = resolve(&ctx, &options, node_id, root_id, root_name_id, Some(t_cutoff), args.debug);

        writer
            .write_record([
                node_id.0.to_string(),
                result.ok.to_string(),
                if result.depth >= 0 { result.depth.to_string() } else { String::new() },
            ])
            .into_diagnostic()?;
        stats.record(result.ok, result.depth);
        if !result.ok {
            if let Some(reason) = result.fail_reason {
                stats.record_fail_reason(reason);
            }
        }

        if let (true, Some(tree), Some(dir)) = (result.ok, &result.tree, &trees_dir) {
            let tree_path = dir.join(format!("{}.json", node_id.0));
            let json = serde_json::to_vec(tree).into_diagnostic()?;
            tokio::fs::write(&tree_path, json).await.into_diagnostic()?;
        }

        if let Some(bar) = &progress {
            bar.inc(1);
        } else if (i as u64 + 1) % args.progress_every == 0 {
            tracing::info!(
                processed = i + 1,
                resolved = stats.num_resolved,
                header_cache = ctx.adj.header_cache_len(),
                chunk_cache = ctx.adj.chunk_cache_len(),
                "progress"
            );
        }
    }

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }
    writer.flush().into_diagnostic()?;
    tracing::info!(path = %csv_path.display(), "wrote output");
    stats.print_summary();

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = actual_main().await {
        eprintln!("{e:?}");
        std::process::exit(1);
    }
}

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rudis_table_source::{
    Pipeline, RunReport,
    attachment::download::DownloadMaterializer,
    config::Options,
    sink::{DebugSink, JsonLinesSink, NodeSink},
    source::rest::RestRowSource,
    status::FileStatus,
};
use tracing::{error, info, warn};

#[derive(Parser)]
struct Opts {
    #[clap(short, long, env = "RUDIS_SOURCE_CONFIG")]
    config: PathBuf,
    #[clap(long, env = "AIRTABLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[clap(short, long, default_value = "nodes.jsonl")]
    output: PathBuf,
    #[clap(long, default_value = ".cache/status.json")]
    status: PathBuf,
    #[clap(long, default_value = ".cache/files")]
    cache_dir: PathBuf,
    /// Log nodes instead of writing them to the output file.
    #[clap(long)]
    dry_run: bool,
}

async fn execute<N>(opts: &Opts, options: &Options, sink: N) -> anyhow::Result<(RunReport, N)>
where
    N: NodeSink,
    N::Error: std::error::Error + Send + Sync + 'static,
{
    let source = RestRowSource::new(
        options.endpoint.clone(),
        options.api_key.clone().unwrap_or_default(),
    );
    let pipeline = Pipeline::new(
        source,
        DownloadMaterializer::new(opts.cache_dir.clone()),
        sink,
        FileStatus::new(opts.status.clone()),
    );
    let report = pipeline.run(options).await?;
    Ok((report, pipeline.sink))
}

async fn run(opts: Opts) -> anyhow::Result<()> {
    let mut options = Options::from_path(&opts.config)
        .await
        .with_context(|| format!("load config from {}", opts.config.display()))?;
    if let Some(api_key) = opts.api_key.clone() {
        options.api_key = Some(api_key);
    }

    let report = if opts.dry_run {
        execute(&opts, &options, DebugSink::default()).await?.0
    } else {
        let sink = JsonLinesSink::create(&opts.output)
            .await
            .with_context(|| "open node output")?;
        let (report, sink) = execute(&opts, &options, sink).await?;
        sink.finish().await.with_context(|| "flush node output")?;
        report
    };

    match report.halted {
        Some(reason) => warn!(%reason, "source halted without creating nodes"),
        None => info!(
            tables = report.tables,
            skipped = report.skipped_tables.len(),
            rows = report.rows,
            nodes = report.nodes,
            warnings = report.warnings.len(),
            dry_run = opts.dry_run,
            "done"
        ),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let opts = Opts::parse();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    if let Err(e) = run(opts).await {
        error!(?e, "critical error");
        std::process::exit(1);
    }
}

//! Pipeline orchestration
//!
//! Validates the options, fetches every table concurrently, and processes the
//! flattened rows under the configured concurrency bound.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use futures::{TryStreamExt as _, future::try_join_all, stream};
use itertools::Itertools as _;
use tracing::{debug, info};

use crate::{
    attachment::FileMaterializer,
    config::{DEFAULT_CONCURRENCY, Options, TableConfig},
    naming::KeyCleaner,
    process::{self, TableRow},
    sink::NodeSink,
    source::{RowSource, TableQuery},
    status::{SourceStatus, StatusRecorder},
    warn_source, warning,
};

/// Why a run stopped before fetching anything.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HaltReason {
    #[error("no API key was provided; set `api_key` to source tables")]
    MissingCredential,
    #[error("no tables were configured; add at least one entry under `tables`")]
    NoTables,
    #[error("concurrency must be a positive integer, got {0}")]
    InvalidConcurrency(usize),
    #[error("{0}")]
    UnknownKeyCleaner(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError<SE, NE, RE> {
    #[error("failed to fetch table {table} from base {base}: {error}")]
    Fetch {
        base: String,
        table: String,
        error: SE,
    },
    #[error("row: {0}")]
    Row(crate::Error),
    #[error("sink: {0}")]
    Sink(NE),
    #[error("status: {0}")]
    Status(RE),
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunReport {
    pub halted: Option<HaltReason>,
    pub warnings: Vec<String>,
    pub tables: usize,
    pub skipped_tables: Vec<String>,
    pub rows: usize,
    pub nodes: usize,
}

struct Settings {
    concurrency: usize,
    cleaner: KeyCleaner,
}

impl Settings {
    fn resolve(options: &Options) -> Result<Self, HaltReason> {
        if options.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(HaltReason::MissingCredential);
        }
        if options.tables.is_empty() {
            return Err(HaltReason::NoTables);
        }
        let concurrency = match options.concurrency {
            None => DEFAULT_CONCURRENCY,
            Some(0) => return Err(HaltReason::InvalidConcurrency(0)),
            Some(n) => n,
        };
        let cleaner = match (&options.key_cleaner, &options.clean_key) {
            (Some(cleaner), _) => cleaner.clone(),
            (None, Some(name)) => KeyCleaner::from_name(name)
                .map_err(|error| HaltReason::UnknownKeyCleaner(error.to_string()))?,
            (None, None) => KeyCleaner::default(),
        };
        Ok(Self {
            concurrency,
            cleaner,
        })
    }
}

/// Wires the external collaborators together.
pub struct Pipeline<S, M, N, R> {
    pub source: S,
    pub materializer: M,
    pub sink: N,
    pub status: R,
}

type Failure<S, N, R> = PipelineError<
    <S as RowSource>::Error,
    <N as NodeSink>::Error,
    <R as StatusRecorder>::Error,
>;

impl<S: RowSource, M: FileMaterializer, N: NodeSink, R: StatusRecorder> Pipeline<S, M, N, R> {
    pub fn new(source: S, materializer: M, sink: N, status: R) -> Self {
        Self {
            source,
            materializer,
            sink,
            status,
        }
    }

    /// Run the whole source once.
    ///
    /// Configuration problems end the run early with `halted` set and no nodes
    /// created. Fetch, row and sink failures abort the run with an error.
    pub async fn run(&self, options: &Options) -> Result<RunReport, Failure<S, N, R>> {
        let (result, warnings) = warning::collect_warnings(self.run_inner(options)).await;
        let mut report = result?;
        report.warnings = warnings;
        Ok(report)
    }

    async fn run_inner(&self, options: &Options) -> Result<RunReport, Failure<S, N, R>> {
        let settings = match Settings::resolve(options) {
            Ok(settings) => settings,
            Err(reason) => {
                warn_source!("Halting source: {reason}");
                return Ok(RunReport {
                    halted: Some(reason),
                    ..Default::default()
                });
            }
        };
        let cleaner = &settings.cleaner;

        info!(
            tables = options.tables.len(),
            concurrency = settings.concurrency,
            "fetching tables"
        );
        let fetched = try_join_all(
            options
                .tables
                .iter()
                .map(|table| self.fetch_table(cleaner, Arc::new(table.clone()))),
        )
        .await?;

        let mut report = RunReport::default();
        let mut rows = Vec::new();
        for (table, fetched) in options.tables.iter().zip(fetched) {
            match fetched {
                Some(table_rows) => {
                    report.tables += 1;
                    rows.extend(table_rows);
                }
                None => report.skipped_tables.push(table.table_name.clone()),
            }
        }
        report.rows = rows.len();

        let nodes = AtomicUsize::new(0);
        stream::iter(rows.iter().map(Ok::<_, Failure<S, N, R>>))
            .try_for_each_concurrent(settings.concurrency, |row| {
                let nodes = &nodes;
                async move {
                    let assembled = process::process_row(row, cleaner, &self.materializer)
                        .await
                        .map_err(PipelineError::Row)?;
                    for node in assembled.into_nodes() {
                        self.sink
                            .create_node(node)
                            .await
                            .map_err(PipelineError::Sink)?;
                        nodes.fetch_add(1, Ordering::Relaxed);
                    }
                    Ok(())
                }
            })
            .await?;
        report.nodes = nodes.into_inner();

        let last_fetch = chrono::Utc::now();
        self.status
            .record(SourceStatus { last_fetch })
            .await
            .map_err(PipelineError::Status)?;
        info!(
            tables = report.tables,
            rows = report.rows,
            nodes = report.nodes,
            %last_fetch,
            "finished sourcing tables"
        );
        Ok(report)
    }

    /// Fetch one table; `None` when its configuration is skipped.
    async fn fetch_table(
        &self,
        cleaner: &KeyCleaner,
        table: Arc<TableConfig>,
    ) -> Result<Option<Vec<TableRow>>, Failure<S, N, R>> {
        let dirty = table.dirty_keys(cleaner);
        if !dirty.is_empty() {
            warn_source!(
                "Skipping table `{}` in base `{}`: `mapping` and `table_links` keys must be cleaned field names (e.g. `Field_Name`), found {}",
                table.table_name,
                table.base_id,
                dirty.iter().map(|key| format!("`{key}`")).join(", ")
            );
            return Ok(None);
        }
        process::assemble::check_node_type(&table);
        let rows = self
            .source
            .select(TableQuery {
                base_id: &table.base_id,
                table_name: &table.table_name,
                view: table.table_view.as_deref(),
                fields: table.fields.as_deref(),
            })
            .await
            .map_err(|error| PipelineError::Fetch {
                base: table.base_id.clone(),
                table: table.table_name.clone(),
                error,
            })?;
        debug!(
            base = table.base_id.as_str(),
            table = table.table_name.as_str(),
            rows = rows.len(),
            "fetched table"
        );
        Ok(Some(
            rows.into_iter()
                .enumerate()
                .map(|(index, row)| TableRow::compose(table.clone(), index, row))
                .collect(),
        ))
    }
}

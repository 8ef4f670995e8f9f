//! Warnings raised while sourcing tables.
//!
//! Configuration problems and degraded attachments never abort the host
//! build. They are logged where they happen and handed back to the caller in
//! [`RunReport::warnings`](crate::RunReport). A message repeated within one
//! run is reported once, in the order it was first raised.

use std::cell::RefCell;

use indexmap::IndexSet;

#[derive(Default)]
struct RunWarnings {
    messages: RefCell<IndexSet<String>>,
}

tokio::task_local! {
    static RUN_WARNINGS: RunWarnings;
}

/// Record a warning for the run in progress. Outside a run it is discarded.
pub fn collect(message: impl Into<String>) {
    let message = message.into();
    let _ = RUN_WARNINGS.try_with(|run| run.messages.borrow_mut().insert(message));
}

/// Drive `run` and return its output with the warnings it raised.
pub async fn collect_warnings<F, T>(run: F) -> (T, Vec<String>)
where
    F: std::future::Future<Output = T>,
{
    RUN_WARNINGS
        .scope(RunWarnings::default(), async {
            let output = run.await;
            let messages = RUN_WARNINGS.with(|run| run.messages.take());
            (output, messages.into_iter().collect())
        })
        .await
}

/// Log a warning and record it for the run in progress.
#[macro_export]
macro_rules! warn_source {
    ($($arg:tt)*) => {{
        let message = format!($($arg)*);
        ::tracing::warn!("{message}");
        $crate::warning::collect(message)
    }};
}

use anyhow::Result;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::app::AppConfig;
use crate::debugger::Debugger;
use crate::definition;
use crate::error::TrellisError;
use crate::eval::Evaluator;

/// Load and evaluate a tree
///
/// Ctrl-C cancels the run, unless the debugger is active, in which case
/// it pauses at the next node instead.
pub async fn run_eval(file: &Path, config: &AppConfig) -> Result<()> {
    let root = definition::load(file).map_err(TrellisError::from)?;

    let token = CancellationToken::new();
    let mut evaluator = Evaluator::new()
        .with_vars(config.vars.clone())
        .with_token(token.clone());
    let interrupted = Arc::new(AtomicBool::new(false));

    let signals = if config.debugging() {
        let debugger = Arc::new(
            Debugger::stdio()
                .with_breakpoints(config.breakpoints.clone())
                .with_failpoints(config.failpoints.clone()),
        );
        evaluator = evaluator.with_handler(debugger.clone());
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                debugger.interrupt();
            }
        })
    } else {
        let interrupted = Arc::clone(&interrupted);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling evaluation");
                interrupted.store(true, Ordering::SeqCst);
                token.cancel();
            }
        })
    };

    let result = evaluator.run(&root).await;
    signals.abort();

    if interrupted.load(Ordering::SeqCst) {
        return Err(TrellisError::Interrupted.into());
    }
    result?;

    info!("{} evaluated successfully", file.display());
    Ok(())
}

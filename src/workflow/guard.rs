use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tracing::{error, warn};

use crate::error::{AppError, AppResult};

/// How a background task ended. Every task spawned by the bridge resolves to
/// one of these; nothing propagates further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    /// The task failed; `reported` says whether the requester was told.
    Failed { reported: bool },
    Panicked { reported: bool },
}

/// Runs `work` and routes any error or panic to `report`, which notifies the
/// requester and returns whether that notification went out.
pub async fn boundary<W, R, RF>(task: &'static str, work: W, report: R) -> TaskOutcome
where
    W: Future<Output = AppResult<()>>,
    R: FnOnce(AppError) -> RF,
    RF: Future<Output = bool>,
{
    match AssertUnwindSafe(work).catch_unwind().await {
        Ok(Ok(())) => TaskOutcome::Completed,
        Ok(Err(err)) => {
            error!(task, error = %err, "background task failed");
            let reported = report_safely(task, report(err)).await;
            TaskOutcome::Failed { reported }
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(task, panic = %message, "background task panicked");
            let reported = report_safely(task, report(AppError::TaskPanicked(message))).await;
            TaskOutcome::Panicked { reported }
        }
    }
}

async fn report_safely<F>(task: &'static str, report: F) -> bool
where
    F: Future<Output = bool>,
{
    match AssertUnwindSafe(report).catch_unwind().await {
        Ok(reported) => {
            if !reported {
                warn!(task, "failure notification could not be delivered");
            }
            reported
        }
        Err(_) => {
            warn!(task, "failure notification panicked");
            false
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Detaches a guarded task onto the runtime.
pub fn spawn<F>(task: F) -> JoinHandle<TaskOutcome>
where
    F: Future<Output = TaskOutcome> + Send + 'static,
{
    tokio::spawn(task)
}

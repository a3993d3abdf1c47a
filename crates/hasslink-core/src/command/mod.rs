// ── Command sequencer ──
//
// Executes one `ServiceMessage` as an ordered series of `call_service`
// requests on a single authenticated attempt. Each command waits for its
// own reply before the next one is sent.

pub mod decompose;

use tracing::{debug, info, warn};

use hasslink_api::Request;

use crate::error::CoreError;
use crate::model::ServiceMessage;
use crate::supervisor::WorkerLink;

pub use decompose::decompose;

/// Run every command of `message` on `attempt`, in order.
///
/// Stops at the first command the hub rejects and returns
/// [`CoreError::CallServiceFailed`] with the hub's error payload. Commands
/// that already succeeded are not rolled back, so a rejected light
/// "turn on" may leave the brightness applied without the color.
///
/// If the attempt closes mid-sequence the remaining commands are not
/// sent and the call fails with [`CoreError::ConnectionClosed`].
pub(crate) async fn execute(
    link: &WorkerLink,
    attempt: u64,
    message: &ServiceMessage,
) -> Result<(), CoreError> {
    let commands = decompose(message);
    let total = commands.len();
    info!(%message, attempt, commands = total, "processing service call");

    for (index, command) in commands.into_iter().enumerate() {
        let step = index + 1;
        let pending = link.dispatch(attempt, Request::from(command)).await?;
        debug!(attempt, id = pending.id(), step, total, "command sent, awaiting result");

        let reply = pending.reply().await?;
        if reply.is_failure() {
            warn!(
                attempt,
                id = ?reply.id,
                step,
                total,
                error = ?reply.error,
                "command rejected, aborting remaining commands"
            );
            return Err(CoreError::CallServiceFailed {
                error: reply.error.clone(),
            });
        }
    }

    info!(%message, attempt, commands = total, "service call completed");
    Ok(())
}

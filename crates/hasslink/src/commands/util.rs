//! Shared helpers for command handlers.

use hasslink_core::ConnectorStream;
use tracing::debug;

use crate::error::CliError;
use crate::output;

/// Print stream items until `limit` items were printed, the stream ends,
/// or Ctrl-C is pressed. Items rejected by `keep` do not count.
pub async fn print_stream<T>(
    stream: &mut ConnectorStream<T>,
    limit: Option<usize>,
    keep: impl Fn(&T) -> bool,
    render: impl Fn(&T) -> String,
    quiet: bool,
) -> Result<(), CliError> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut printed = 0usize;
    while limit.is_none_or(|limit| printed < limit) {
        tokio::select! {
            signal = &mut ctrl_c => {
                signal?;
                debug!(printed, "interrupted");
                break;
            }
            item = stream.recv() => {
                let Some(item) = item else {
                    debug!(printed, "stream ended");
                    break;
                };
                if !keep(&item) {
                    continue;
                }
                output::print_output(&render(&item), quiet);
                printed += 1;
            }
        }
    }
    Ok(())
}

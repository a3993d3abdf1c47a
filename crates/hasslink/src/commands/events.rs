//! `hasslink events`: device events of the configured event type.

use hasslink_core::Connector;

use crate::cli::{EventsArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    connector: &Connector,
    args: EventsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(global.color);
    tracing::debug!(event_type = %connector.config().entity_event_type, "watching events");
    let mut stream = connector.entity_events();

    util::print_stream(
        &mut stream,
        args.limit,
        |_| true,
        |event| output::render_item(global.output, event, |e| output::plain_event(e, color)),
        global.quiet,
    )
    .await
}

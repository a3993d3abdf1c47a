//! `hasslink states`: snapshot then live state changes.

use hasslink_core::{Connector, EntityState};

use crate::cli::{GlobalOpts, StatesArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    connector: &Connector,
    args: StatesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(global.color);
    let prefix = args.entity;
    let mut stream = connector.entity_state_changes();

    util::print_stream(
        &mut stream,
        args.limit,
        |state: &EntityState| {
            prefix
                .as_deref()
                .is_none_or(|prefix| state.id().starts_with(prefix))
        },
        |state| output::render_item(global.output, state, |s| output::plain_state(s, color)),
        global.quiet,
    )
    .await
}

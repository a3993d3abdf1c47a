//! Output formatting: plain, JSON, YAML.
//!
//! Stream commands print one rendered item at a time, so every renderer
//! here works on a single item. Structured formats use serde, plain uses
//! a per-type one-line renderer.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;

use hasslink_core::{EntityEvent, EntityState};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

fn paint_id(id: &str, color: bool) -> String {
    if color {
        id.cyan().bold().to_string()
    } else {
        id.to_owned()
    }
}

fn paint_value(value: &str, color: bool) -> String {
    if color {
        value.green().to_string()
    } else {
        value.to_owned()
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a single serde-serializable item in the chosen format.
///
/// `plain_fn` produces the one-line form used by `plain`. YAML items are
/// separated by document markers so a stream stays parseable.
pub fn render_item<T>(format: OutputFormat, data: &T, plain_fn: impl Fn(&T) -> String) -> String
where
    T: Serialize + ?Sized,
{
    match format {
        OutputFormat::Plain => plain_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => format!("---\n{}", render_yaml(data).trim_end()),
    }
}

/// `light.desk on`, or `sun.sun above_horizon elevation=12.5`.
pub fn plain_state(state: &EntityState, color: bool) -> String {
    let head = format!(
        "{} {}",
        paint_id(state.id(), color),
        paint_value(state.state(), color)
    );
    match state {
        EntityState::Sun { elevation, .. } => format!("{head} elevation={elevation}"),
        EntityState::Simple { .. } => head,
    }
}

/// `switch.hall_button 1002`.
pub fn plain_event(event: &EntityEvent, color: bool) -> String {
    format!("{} {}", paint_id(&event.id, color), paint_value(&event.event, color))
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
    let _ = stdout.flush();
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\":\"serialization failed: {e}\"}}"))
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: serialization failed: {e}"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn plain_sun_shows_elevation() {
        let sun = EntityState::sun("sun.sun", "above_horizon", 12.5);
        assert_eq!(plain_state(&sun, false), "sun.sun above_horizon elevation=12.5");

        let lamp = EntityState::simple("light.desk", "on");
        assert_eq!(plain_state(&lamp, false), "light.desk on");
    }

    #[test]
    fn structured_formats() {
        let event = EntityEvent {
            id: "hall_button".into(),
            event: "1002".into(),
        };
        assert_eq!(
            render_item(OutputFormat::JsonCompact, &event, |e| plain_event(e, false)),
            r#"{"id":"hall_button","event":"1002"}"#
        );
        assert_eq!(
            render_item(OutputFormat::Yaml, &event, |e| plain_event(e, false)),
            "---\nid: hall_button\nevent: '1002'"
        );
        assert_eq!(
            render_item(OutputFormat::Plain, &event, |e| plain_event(e, false)),
            "hall_button 1002"
        );
    }
}

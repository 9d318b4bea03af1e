use anyhow::{Context, Result};
use chrono::Local;
use clap::ValueEnum;
use formpilot_event_bus::StatusEvent;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).context("Failed to encode JSON output")
    } else {
        serde_json::to_string(value).context("Failed to encode JSON output")
    }
}

/// One stdout line per status event.
pub fn render_status_event(format: OutputFormat, event: &StatusEvent) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(event, false),
        OutputFormat::Human => {
            let stamp = Local::now().format("%H:%M:%S");
            Ok(match event {
                StatusEvent::StatusChanged { text } => format!("[{stamp}] {text}"),
                StatusEvent::BadgeChanged { text, color } if text.is_empty() => {
                    format!("[{stamp}] badge cleared ({color})")
                }
                StatusEvent::BadgeChanged { text, color } => {
                    format!("[{stamp}] badge {text} ({color})")
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_status_lines_are_tagged() {
        let line = render_status_event(OutputFormat::Json, &StatusEvent::status("Step 1/2: click"))
            .unwrap();
        assert_eq!(line, r#"{"type":"status_changed","text":"Step 1/2: click"}"#);
    }

    #[test]
    fn human_lines_carry_the_text() {
        let line =
            render_status_event(OutputFormat::Human, &StatusEvent::running_badge()).unwrap();
        assert!(line.ends_with("badge RUN (#16a34a)"), "{line}");
        let line = render_status_event(OutputFormat::Human, &StatusEvent::idle_badge()).unwrap();
        assert!(line.ends_with("badge cleared (#4CAF50)"), "{line}");
    }
}

//! Discrete inputs to the selection controller.
//!
//! The browser map emits these from DOM clicks and the CSV fetch; the CLI
//! replays them from a small line-oriented script:
//!
//! ```text
//! # comments and blank lines are ignored
//! zone 40.712800_-74.006000
//! flow 0
//! background
//! clear
//! ```

use thiserror::Error;

use crate::zone::{ZoneKey, ZoneKeyError};

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Raw CSV text arrived from the data source.
    DataLoaded(String),
    FetchFailed(String),
    ZoneClicked(ZoneKey),
    /// Index into the info panel's flow list.
    FlowItemClicked(usize),
    /// A click whose target is the map surface itself.
    BackgroundClicked,
    ClearRequested,
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: '{command}' expects an argument")]
    MissingArgument { line: usize, command: String },
    #[error("line {line}: {source}")]
    ZoneKey {
        line: usize,
        #[source]
        source: ZoneKeyError,
    },
    #[error("line {line}: '{value}' is not a flow index")]
    FlowIndex { line: usize, value: String },
}

/// Parses an interaction script into events.
pub fn parse_script(text: &str) -> Result<Vec<MapEvent>, ScriptError> {
    let mut events = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let arg = parts.next();
        let missing = || ScriptError::MissingArgument {
            line,
            command: command.to_string(),
        };

        let event = match command {
            "zone" => {
                let key = arg
                    .ok_or_else(missing)?
                    .parse::<ZoneKey>()
                    .map_err(|source| ScriptError::ZoneKey { line, source })?;
                MapEvent::ZoneClicked(key)
            }
            "flow" => {
                let value = arg.ok_or_else(missing)?;
                let index = value.parse::<usize>().map_err(|_| ScriptError::FlowIndex {
                    line,
                    value: value.to_string(),
                })?;
                MapEvent::FlowItemClicked(index)
            }
            "background" => MapEvent::BackgroundClicked,
            "clear" => MapEvent::ClearRequested,
            other => {
                return Err(ScriptError::UnknownCommand {
                    line,
                    command: other.to_string(),
                });
            }
        };
        events.push(event);
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let events = parse_script(
            "# select then focus\nzone 40.712800_-74.006000\n\nflow 1\nbackground\nclear\n",
        )
        .unwrap();
        assert_eq!(
            events,
            vec![
                MapEvent::ZoneClicked(ZoneKey::from_coords(40.7128, -74.006)),
                MapEvent::FlowItemClicked(1),
                MapEvent::BackgroundClicked,
                MapEvent::ClearRequested,
            ]
        );
    }

    #[test]
    fn test_parse_script_errors() {
        assert!(matches!(
            parse_script("wiggle"),
            Err(ScriptError::UnknownCommand { line: 1, .. })
        ));
        assert!(matches!(
            parse_script("clear\nflow"),
            Err(ScriptError::MissingArgument { line: 2, .. })
        ));
        assert!(matches!(
            parse_script("flow -1"),
            Err(ScriptError::FlowIndex { line: 1, .. })
        ));
        assert!(matches!(
            parse_script("zone 40.7"),
            Err(ScriptError::ZoneKey { line: 1, .. })
        ));
    }
}

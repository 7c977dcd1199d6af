//! Startup fetch of the flow CSV.

use anyhow::{Context, Result};
use tracing::info;

use crate::events::MapEvent;
use crate::fetch::{BasicClient, fetch_text};

/// Reads CSV text from an `http(s)://` URL or a local path.
#[tracing::instrument]
pub async fn load_source(source: &str) -> Result<String> {
    let text = if source.starts_with("http://") || source.starts_with("https://") {
        let client = BasicClient::new();
        fetch_text(&client, source).await?
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("reading {source}"))?
    };
    info!(bytes = text.len(), "Data source loaded");
    Ok(text)
}

/// Turns the single startup fetch into the event the controller consumes.
/// Failures are logged by the controller when it handles the event.
pub fn into_event(result: Result<String>) -> MapEvent {
    match result {
        Ok(text) => MapEvent::DataLoaded(text),
        Err(e) => MapEvent::FetchFailed(format!("{e:#}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Scene;
    use crate::selection::SelectionController;
    use crate::test_logs::capture;
    use std::io::Write;
    use tracing::Level;

    #[tokio::test]
    async fn test_load_source_reads_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "pickup_lat,pickup_lon\n1,2\n").unwrap();

        let text = load_source(file.path().to_str().unwrap()).await.unwrap();
        assert!(text.starts_with("pickup_lat"));
    }

    #[tokio::test]
    async fn test_missing_file_becomes_fetch_failed() {
        let event = into_event(load_source("/definitely/not/here.csv").await);
        assert!(matches!(event, MapEvent::FetchFailed(msg) if msg.contains("not/here.csv")));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_logged_once() {
        let result = load_source("/definitely/not/here.csv").await;

        let (_, lines) = capture(Level::ERROR, || {
            let mut controller = SelectionController::new(Scene::default());
            controller.handle(into_event(result));
        });
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Error loading CSV data"));
    }
}

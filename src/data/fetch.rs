use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::data::DatasetError;
use crate::data::store::Dataset;
use crate::event::AppEvent;
use crate::net;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatasetSource {
    /// Base URL of the data endpoint; queried with `?api=true`.
    Remote(String),
    /// A JSON file with the same payload shape as the endpoint.
    File(PathBuf),
}

impl DatasetSource {
    pub fn describe(&self) -> String {
        match self {
            DatasetSource::Remote(url) => url.clone(),
            DatasetSource::File(path) => path.display().to_string(),
        }
    }
}

pub fn load(source: &DatasetSource) -> Result<Dataset, DatasetError> {
    let payload = match source {
        DatasetSource::Remote(url) if url.trim().is_empty() => {
            return Err(DatasetError::NotConfigured);
        }
        DatasetSource::Remote(url) => {
            net::get_text(url, &[("api", "true".to_string())], FETCH_TIMEOUT)?
        }
        DatasetSource::File(path) => fs::read_to_string(path)?,
    };
    Dataset::from_json(&payload)
}

/// Load on a worker thread and post the outcome to the event loop.
pub fn spawn_load(source: DatasetSource, tx: Sender<AppEvent>) {
    thread::spawn(move || {
        tracing::info!(source = %source.describe(), "fetching dataset");
        let result = load(&source);
        match &result {
            Ok(dataset) => tracing::info!(records = dataset.len(), "dataset loaded"),
            Err(err) => tracing::error!(error = %err, "dataset fetch failed"),
        }
        let _ = tx.send(AppEvent::Dataset(result));
    });
}

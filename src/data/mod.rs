pub mod fetch;
pub mod query;
pub mod record;
pub mod store;

use thiserror::Error;

use crate::net::NetError;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("no dataset endpoint configured: set endpoint_url in config.toml or pass --dataset")]
    NotConfigured,
    #[error(transparent)]
    Network(#[from] NetError),
    #[error("could not read dataset file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid dataset payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unexpected dataset shape: {0}")]
    Shape(String),
    #[error("dataset endpoint reported an error: {0}")]
    Remote(String),
}

//! Best-effort usage reporting to the data endpoint.

use std::thread;
use std::time::Duration;

use crate::net;
use crate::session::Session;

const LOG_TIMEOUT: Duration = Duration::from_secs(10);

/// One access record: which module was opened, by whom, from where.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessEntry {
    pub language: String,
    pub module: String,
    pub location: String,
    pub device: String,
}

impl AccessEntry {
    pub fn new(session: &Session, category: &str, sub_category: &str) -> Self {
        Self {
            language: session.language.clone(),
            module: format!("{category}/{sub_category}"),
            location: session.user_location.clone(),
            device: session.device.as_str().to_string(),
        }
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("log", "true".to_string()),
            ("idioma", self.language.clone()),
            ("modulo", self.module.clone()),
            ("local", self.location.clone()),
            ("dispositivo", self.device.clone()),
        ]
    }
}

pub struct AccessLogger {
    endpoint: String,
    enabled: bool,
}

impl AccessLogger {
    pub fn new(endpoint: impl Into<String>, enabled: bool) -> Self {
        Self {
            endpoint: endpoint.into(),
            enabled,
        }
    }

    pub fn is_active(&self) -> bool {
        self.enabled && !self.endpoint.trim().is_empty()
    }

    /// Send `entry` on a detached thread. Returns whether a request was
    /// dispatched; its outcome is never reported back.
    pub fn log(&self, entry: AccessEntry) -> bool {
        if !self.is_active() {
            return false;
        }
        let endpoint = self.endpoint.clone();
        thread::spawn(move || {
            let query = entry.query();
            match net::get_text(&endpoint, &query, LOG_TIMEOUT) {
                Ok(_) => tracing::debug!(module = %entry.module, "access logged"),
                Err(err) => tracing::debug!(module = %entry.module, error = %err, "access log failed"),
            }
        });
        true
    }
}

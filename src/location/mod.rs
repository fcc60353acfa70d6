//! On-demand location lookup: position fix, then reverse geocoding.
//!
//! Lookups run on worker threads and report back through the event
//! channel. Every lookup bumps a generation counter and only the report
//! carrying the current generation is applied, so a slow answer can never
//! overwrite a newer one.

pub mod geocode;
pub mod position;

use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::event::AppEvent;
use crate::labels::Labels;
pub use position::{Coordinates, PositionError, PositionSource};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupKind {
    /// Silent fix taken at startup; refines the session location only.
    Startup,
    /// User-requested lookup shown on the location card.
    OnDemand,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LocationOutcome {
    Address(String),
    /// Position known but the address could not be resolved.
    Coordinates(Coordinates),
    Failed(PositionError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LocationReport {
    pub generation: u64,
    pub kind: LookupKind,
    pub outcome: LocationOutcome,
}

/// What the location card shows.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LocationStatus {
    #[default]
    Hidden,
    Searching,
    Found(String),
    Failed(PositionError),
}

impl LocationStatus {
    pub fn message(&self, labels: &Labels) -> Option<String> {
        match self {
            LocationStatus::Hidden => None,
            LocationStatus::Searching => Some(labels.searching.clone()),
            LocationStatus::Found(text) => Some(text.clone()),
            LocationStatus::Failed(err) => Some(error_message(err, labels).to_string()),
        }
    }
}

pub fn error_message<'a>(err: &PositionError, labels: &'a Labels) -> &'a str {
    match err {
        PositionError::PermissionDenied => &labels.gps_denied,
        PositionError::Unavailable(_) => &labels.gps_unavailable,
        PositionError::Timeout => &labels.gps_timeout,
        PositionError::Unsupported => &labels.gps_unsupported,
        PositionError::Failed(_) => &labels.gps_error,
    }
}

/// What the app should do after applying a report.
#[derive(Clone, Debug, PartialEq)]
pub struct Applied {
    /// New value for the session location, if it changed.
    pub user_location: Option<String>,
    /// The address was resolved and should be reported to the access log.
    pub resolved: bool,
}

/// Blocking lookup: position fix, then reverse geocoding with a
/// coordinates fallback.
pub fn lookup(source: &PositionSource, geocode_url: &str, timeout: Duration) -> LocationOutcome {
    let coords = match source.locate(timeout) {
        Ok(coords) => coords,
        Err(err) => return LocationOutcome::Failed(err),
    };
    match geocode::reverse(geocode_url, coords, timeout) {
        Ok(address) => LocationOutcome::Address(address),
        Err(err) => {
            tracing::debug!(error = %err, "reverse geocoding failed, showing coordinates");
            LocationOutcome::Coordinates(coords)
        }
    }
}

pub struct LocationService {
    source: PositionSource,
    geocode_url: String,
    timeout: Duration,
    generation: u64,
    status: LocationStatus,
}

impl LocationService {
    pub fn new(source: PositionSource, geocode_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            source,
            geocode_url: geocode_url.into(),
            timeout,
            generation: 0,
            status: LocationStatus::Hidden,
        }
    }

    pub fn status(&self) -> &LocationStatus {
        &self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a user-requested lookup. Without a position source the card
    /// shows "not supported" right away and nothing is spawned.
    pub fn locate(&mut self, tx: &Sender<AppEvent>) {
        self.generation += 1;
        if !self.source.is_supported() {
            self.status = LocationStatus::Failed(PositionError::Unsupported);
            return;
        }
        self.status = LocationStatus::Searching;

        let generation = self.generation;
        let source = self.source.clone();
        let geocode_url = self.geocode_url.clone();
        let timeout = self.timeout;
        let tx = tx.clone();
        thread::spawn(move || {
            let outcome = lookup(&source, &geocode_url, timeout);
            tracing::debug!(generation, ?outcome, "location lookup finished");
            let _ = tx.send(AppEvent::Location(LocationReport {
                generation,
                kind: LookupKind::OnDemand,
                outcome,
            }));
        });
    }

    /// Take a quiet position fix for the session location. Failures are
    /// only logged.
    pub fn startup_fix(&self, tx: &Sender<AppEvent>) {
        if !self.source.is_supported() {
            return;
        }
        let generation = self.generation;
        let source = self.source.clone();
        let timeout = self.timeout;
        let tx = tx.clone();
        thread::spawn(move || match source.locate(timeout) {
            Ok(coords) => {
                let _ = tx.send(AppEvent::Location(LocationReport {
                    generation,
                    kind: LookupKind::Startup,
                    outcome: LocationOutcome::Coordinates(coords),
                }));
            }
            Err(err) => tracing::warn!(error = %err, "startup position fix failed"),
        });
    }

    /// Apply a worker report. Reports from superseded lookups are ignored.
    pub fn apply(&mut self, report: LocationReport) -> Option<Applied> {
        if report.generation != self.generation {
            tracing::debug!(
                stale = report.generation,
                current = self.generation,
                "dropping stale location report"
            );
            return None;
        }
        match (report.kind, report.outcome) {
            (LookupKind::Startup, LocationOutcome::Coordinates(coords)) => Some(Applied {
                user_location: Some(coords.raw()),
                resolved: false,
            }),
            (LookupKind::Startup, _) => None,
            (LookupKind::OnDemand, LocationOutcome::Address(address)) => {
                self.status = LocationStatus::Found(address.clone());
                Some(Applied {
                    user_location: Some(address),
                    resolved: true,
                })
            }
            (LookupKind::OnDemand, LocationOutcome::Coordinates(coords)) => {
                let text = coords.rounded();
                self.status = LocationStatus::Found(text.clone());
                Some(Applied {
                    user_location: Some(text),
                    resolved: false,
                })
            }
            (LookupKind::OnDemand, LocationOutcome::Failed(err)) => {
                self.status = LocationStatus::Failed(err);
                Some(Applied {
                    user_location: None,
                    resolved: false,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    const SP: Coordinates = Coordinates {
        lat: -23.55052,
        lon: -46.633308,
    };

    fn report(generation: u64, kind: LookupKind, outcome: LocationOutcome) -> LocationReport {
        LocationReport {
            generation,
            kind,
            outcome,
        }
    }

    #[test]
    fn test_unsupported_reports_immediately() {
        let mut service = LocationService::new(PositionSource::None, "", Duration::from_secs(1));
        let (tx, rx) = mpsc::channel();
        service.locate(&tx);
        assert_eq!(
            service.status(),
            &LocationStatus::Failed(PositionError::Unsupported)
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_lookup_falls_back_to_coordinates() {
        let outcome = lookup(&PositionSource::Fixed(SP), "", Duration::from_secs(1));
        assert_eq!(outcome, LocationOutcome::Coordinates(SP));
    }

    #[test]
    fn test_locate_posts_report_for_current_generation() {
        let mut service = LocationService::new(PositionSource::Fixed(SP), "", Duration::from_secs(1));
        let (tx, rx) = mpsc::channel();
        service.locate(&tx);
        assert_eq!(service.status(), &LocationStatus::Searching);

        let Ok(AppEvent::Location(report)) = rx.recv_timeout(Duration::from_secs(5)) else {
            panic!("expected a location report");
        };
        assert_eq!(report.generation, service.generation());
        let applied = service.apply(report).unwrap();
        assert_eq!(applied.user_location.as_deref(), Some("-23.5505, -46.6333"));
        assert!(!applied.resolved);
        assert_eq!(
            service.status(),
            &LocationStatus::Found("-23.5505, -46.6333".into())
        );
    }

    #[test]
    fn test_stale_report_is_ignored() {
        let mut service = LocationService::new(PositionSource::Fixed(SP), "", Duration::from_secs(1));
        let (tx, _rx) = mpsc::channel();
        service.locate(&tx);
        service.locate(&tx);
        let stale = report(
            1,
            LookupKind::OnDemand,
            LocationOutcome::Address("Rua Velha, 1".into()),
        );
        assert!(service.apply(stale).is_none());
        assert_eq!(service.status(), &LocationStatus::Searching);
    }

    #[test]
    fn test_resolved_address_is_flagged_for_logging() {
        let mut service = LocationService::new(PositionSource::Fixed(SP), "", Duration::from_secs(1));
        let applied = service
            .apply(report(0, LookupKind::OnDemand, LocationOutcome::Address("Rua A, 10".into())))
            .unwrap();
        assert!(applied.resolved);
        assert_eq!(applied.user_location.as_deref(), Some("Rua A, 10"));
    }

    #[test]
    fn test_failure_keeps_session_location() {
        let mut service = LocationService::new(PositionSource::Fixed(SP), "", Duration::from_secs(1));
        let applied = service
            .apply(report(
                0,
                LookupKind::OnDemand,
                LocationOutcome::Failed(PositionError::Timeout),
            ))
            .unwrap();
        assert_eq!(applied.user_location, None);
        let labels = Labels::for_language("PT");
        assert_eq!(service.status().message(&labels), Some(labels.gps_timeout.clone()));
    }

    #[test]
    fn test_startup_fix_uses_raw_coordinates_silently() {
        let mut service = LocationService::new(PositionSource::Fixed(SP), "", Duration::from_secs(1));
        let applied = service
            .apply(report(0, LookupKind::Startup, LocationOutcome::Coordinates(SP)))
            .unwrap();
        assert_eq!(applied.user_location.as_deref(), Some("-23.55052, -46.633308"));
        assert_eq!(service.status(), &LocationStatus::Hidden);
    }

    #[test]
    fn test_startup_fix_loses_to_user_lookup() {
        let mut service = LocationService::new(PositionSource::Fixed(SP), "", Duration::from_secs(1));
        let (tx, _rx) = mpsc::channel();
        service.locate(&tx);
        let late = report(0, LookupKind::Startup, LocationOutcome::Coordinates(SP));
        assert!(service.apply(late).is_none());
    }

    #[test]
    fn test_error_messages_are_distinct() {
        let labels = Labels::for_language("EN");
        let messages: Vec<&str> = [
            PositionError::PermissionDenied,
            PositionError::Unavailable(String::new()),
            PositionError::Timeout,
            PositionError::Unsupported,
            PositionError::Failed(String::new()),
        ]
        .iter()
        .map(|e| error_message(e, &labels))
        .collect();
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}

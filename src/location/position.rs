use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Full-precision form used before any address is known.
    pub fn raw(&self) -> String {
        format!("{}, {}", self.lat, self.lon)
    }

    /// Rounded form shown when reverse geocoding fails.
    pub fn rounded(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable: {0}")]
    Unavailable(String),
    #[error("timed out waiting for a position fix")]
    Timeout,
    #[error("no position source configured")]
    Unsupported,
    #[error("position lookup failed: {0}")]
    Failed(String),
}

/// Where the device position comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum PositionSource {
    None,
    Fixed(Coordinates),
    /// External program printing `lat,lon`. Exit code 1 means the user
    /// refused access.
    Command(String),
}

impl PositionSource {
    pub fn is_supported(&self) -> bool {
        !matches!(self, PositionSource::None)
    }

    pub fn locate(&self, timeout: Duration) -> Result<Coordinates, PositionError> {
        match self {
            PositionSource::None => Err(PositionError::Unsupported),
            PositionSource::Fixed(coords) => Ok(*coords),
            PositionSource::Command(cmdline) => run_command(cmdline, timeout),
        }
    }
}

fn run_command(cmdline: &str, timeout: Duration) -> Result<Coordinates, PositionError> {
    let mut parts = cmdline.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| PositionError::Failed("empty position command".to_string()))?;
    let mut child = Command::new(program)
        .args(parts)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| PositionError::Failed(format!("{program}: {e}")))?;

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(PositionError::Timeout);
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(PositionError::Failed(e.to_string())),
        }
    };

    if status.code() == Some(1) {
        return Err(PositionError::PermissionDenied);
    }
    if !status.success() {
        return Err(PositionError::Unavailable(format!("position command exited with {status}")));
    }

    let mut output = String::new();
    if let Some(mut stdout) = child.stdout.take() {
        stdout
            .read_to_string(&mut output)
            .map_err(|e| PositionError::Failed(e.to_string()))?;
    }
    parse_coordinates(&output)
        .ok_or_else(|| PositionError::Unavailable(format!("unreadable position `{}`", output.trim())))
}

/// Parse `lat,lon` or `lat lon`, rejecting out-of-range values.
pub fn parse_coordinates(text: &str) -> Option<Coordinates> {
    let mut fields = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty());
    let lat: f64 = fields.next()?.parse().ok()?;
    let lon: f64 = fields.next()?.parse().ok()?;
    if fields.next().is_some() || !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }
    Some(Coordinates { lat, lon })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(
            parse_coordinates("-23.5505, -46.6333\n"),
            Some(Coordinates { lat: -23.5505, lon: -46.6333 })
        );
        assert_eq!(
            parse_coordinates("40.4168 -3.7038"),
            Some(Coordinates { lat: 40.4168, lon: -3.7038 })
        );
        assert_eq!(parse_coordinates("91,0"), None);
        assert_eq!(parse_coordinates("abc"), None);
        assert_eq!(parse_coordinates("1,2,3"), None);
    }

    #[test]
    fn test_coordinate_labels() {
        let coords = Coordinates { lat: -23.55052, lon: -46.633308 };
        assert_eq!(coords.rounded(), "-23.5505, -46.6333");
        assert_eq!(coords.raw(), "-23.55052, -46.633308");
    }

    #[test]
    fn test_unsupported_and_fixed_sources() {
        assert_eq!(
            PositionSource::None.locate(Duration::from_secs(1)),
            Err(PositionError::Unsupported)
        );
        let coords = Coordinates { lat: 1.0, lon: 2.0 };
        assert_eq!(PositionSource::Fixed(coords).locate(Duration::from_secs(1)), Ok(coords));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_exit_codes() {
        let timeout = Duration::from_secs(5);
        assert_eq!(
            PositionSource::Command("false".into()).locate(timeout),
            Err(PositionError::PermissionDenied)
        );
        assert_eq!(
            PositionSource::Command("echo -12.5,38.25".into()).locate(timeout),
            Ok(Coordinates { lat: -12.5, lon: 38.25 })
        );
        assert!(matches!(
            PositionSource::Command("socorro-no-such-gps".into()).locate(timeout),
            Err(PositionError::Failed(_))
        ));
        assert!(matches!(
            PositionSource::Command("echo nowhere".into()).locate(timeout),
            Err(PositionError::Unavailable(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_timeout() {
        let result = PositionSource::Command("sleep 5".into()).locate(Duration::from_millis(200));
        assert_eq!(result, Err(PositionError::Timeout));
    }
}

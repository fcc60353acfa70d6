//! Reverse geocoding against a Nominatim-compatible `/reverse` endpoint.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use super::position::Coordinates;
use crate::net::{self, NetError};

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("no geocoding endpoint configured")]
    NotConfigured,
    #[error(transparent)]
    Network(#[from] NetError),
    #[error("malformed geocoding response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("geocoding response carries no address")]
    NoAddress,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Address {
    pub road: Option<String>,
    pub pedestrian: Option<String>,
    pub house_number: Option<String>,
    pub suburb: Option<String>,
    pub neighbourhood: Option<String>,
    pub village: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
}

#[derive(Deserialize)]
struct ReverseResponse {
    address: Option<Address>,
}

fn first<'a>(candidates: &[&'a Option<String>]) -> &'a str {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .find(|s| !s.is_empty())
        .unwrap_or("")
}

/// One-line street address: `road, number - district, city`.
///
/// A missing number reads `S/N`. When the road is missing the leading
/// `, ` goes away, and when the district is missing the dangling ` - ,`
/// is dropped.
pub fn compose_address(address: &Address) -> String {
    let road = first(&[&address.road, &address.pedestrian]);
    let number = match first(&[&address.house_number]) {
        "" => "S/N",
        n => n,
    };
    let district = first(&[&address.suburb, &address.neighbourhood, &address.village]);
    let city = first(&[&address.city, &address.town]);

    let line = format!("{road}, {number} - {district}, {city}");
    let line = line.strip_prefix(", ").unwrap_or(&line);
    line.replacen(" - ,", "", 1)
}

/// Parse a `/reverse?format=json` body into a composed address.
pub fn parse_reverse(body: &str) -> Result<String, GeocodeError> {
    let response: ReverseResponse = serde_json::from_str(body)?;
    let address = response.address.ok_or(GeocodeError::NoAddress)?;
    Ok(compose_address(&address))
}

pub fn reverse(base_url: &str, coords: Coordinates, timeout: Duration) -> Result<String, GeocodeError> {
    if base_url.trim().is_empty() {
        return Err(GeocodeError::NotConfigured);
    }
    let query = [
        ("format", "json".to_string()),
        ("lat", coords.lat.to_string()),
        ("lon", coords.lon.to_string()),
        ("zoom", "18".to_string()),
        ("addressdetails", "1".to_string()),
    ];
    let body = net::get_text(base_url, &query, timeout)?;
    parse_reverse(&body)
}

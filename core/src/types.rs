//! Domain DTOs for the vehicle API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.
//!
//! Field names follow the wire contract (`imageUrl`, `licence`, `place.long`),
//! so the serde attributes here are the single source of the JSON shape.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Identifier of a vehicle record.
///
/// Always non-empty. Any other text is allowed, since records written by other
/// clients may use it; `VehicleClient` percent-encodes the id when it becomes
/// a path segment. Assigned once at creation time and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VehicleId(String);

impl VehicleId {
    /// Generate a fresh client-side identifier (UUID v4 text).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Validate and wrap an identifier received from a caller or the server.
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        if raw.is_empty() {
            return Err(ApiError::InvalidInput("vehicle id must not be empty".to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VehicleId {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VehicleId> for String {
    fn from(id: VehicleId) -> Self {
        id.0
    }
}

/// Geographic position of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub long: f64,
}

/// A single vehicle record returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub year: String,
    pub name: String,
    pub licence: String,
    pub place: Location,
}

/// Envelope some servers use for get-by-id responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleById {
    pub id: VehicleId,
    pub value: Vehicle,
}

/// Request payload for updating an existing vehicle. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
///
/// There is no `id` field: identity is taken from the request path only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehiclePatch {
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub licence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<Location>,
}

impl VehiclePatch {
    pub fn is_empty(&self) -> bool {
        self.image_url.is_none()
            && self.year.is_none()
            && self.name.is_none()
            && self.licence.is_none()
            && self.place.is_none()
    }
}

impl From<Vehicle> for VehiclePatch {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            image_url: Some(vehicle.image_url),
            year: Some(vehicle.year),
            name: Some(vehicle.name),
            licence: Some(vehicle.licence),
            place: Some(vehicle.place),
        }
    }
}

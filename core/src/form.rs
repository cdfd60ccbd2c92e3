//! Input checks applied before a vehicle is sent to the server.
//!
//! Forms hold raw text exactly as typed; coordinates are parsed here so the
//! range rules live in one place.

use thiserror::Error;

use crate::types::{Location, Vehicle, VehicleId, VehiclePatch};

pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("name, year and licence are required")]
    MissingFields,
    #[error("latitude and longitude are required")]
    MissingLocation,
    #[error("invalid location: {0}")]
    InvalidLocation(String),
    #[error("a photo of the vehicle is required")]
    MissingImage,
}

pub fn is_valid_latitude(lat: f64) -> bool {
    lat >= LATITUDE_RANGE.0 && lat <= LATITUDE_RANGE.1
}

pub fn is_valid_longitude(long: f64) -> bool {
    long >= LONGITUDE_RANGE.0 && long <= LONGITUDE_RANGE.1
}

/// Both coordinates parsed as numbers, without range checks.
///
/// Returns `None` while either field is still incomplete.
pub fn parse_location(lat: &str, long: &str) -> Option<Location> {
    let lat = lat.trim().parse::<f64>().ok()?;
    let long = long.trim().parse::<f64>().ok()?;
    Some(Location { lat, long })
}

/// Parse and range-check a coordinate pair.
pub fn checked_location(lat: &str, long: &str) -> Result<Location, FormError> {
    let location = parse_location(lat, long)
        .ok_or_else(|| FormError::InvalidLocation(format!("not a number: ({lat}, {long})")))?;
    if !location.lat.is_finite() || !is_valid_latitude(location.lat) {
        return Err(FormError::InvalidLocation(format!(
            "latitude {} outside [-90, 90]",
            location.lat
        )));
    }
    if !location.long.is_finite() || !is_valid_longitude(location.long) {
        return Err(FormError::InvalidLocation(format!(
            "longitude {} outside [-180, 180]",
            location.long
        )));
    }
    Ok(location)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Contents of the "new vehicle" screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewVehicleForm {
    pub name: String,
    pub year: String,
    pub licence: String,
    pub latitude: String,
    pub longitude: String,
    /// Reference to the captured photo; `None` until one is taken.
    pub image_url: Option<String>,
}

impl NewVehicleForm {
    /// Check every field and produce a record with a fresh identifier.
    pub fn validate(&self) -> Result<Vehicle, FormError> {
        if is_blank(&self.name) || is_blank(&self.year) || is_blank(&self.licence) {
            return Err(FormError::MissingFields);
        }
        if is_blank(&self.latitude) || is_blank(&self.longitude) {
            return Err(FormError::MissingLocation);
        }
        let image_url = match self.image_url.as_deref() {
            Some(url) if !is_blank(url) => url.to_string(),
            _ => return Err(FormError::MissingImage),
        };
        let place = checked_location(&self.latitude, &self.longitude)?;

        Ok(Vehicle {
            id: VehicleId::generate(),
            image_url,
            year: self.year.clone(),
            name: self.name.clone(),
            licence: self.licence.clone(),
            place,
        })
    }
}

/// Contents of the detail screen when editing an existing vehicle.
///
/// The image is not editable there, so it is not part of the patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditVehicleForm {
    pub name: String,
    pub year: String,
    pub licence: String,
    pub latitude: String,
    pub longitude: String,
}

impl EditVehicleForm {
    /// Prefill from a stored record.
    pub fn from_vehicle(vehicle: &Vehicle) -> Self {
        Self {
            name: vehicle.name.clone(),
            year: vehicle.year.clone(),
            licence: vehicle.licence.clone(),
            latitude: vehicle.place.lat.to_string(),
            longitude: vehicle.place.long.to_string(),
        }
    }

    pub fn into_patch(self) -> Result<VehiclePatch, FormError> {
        let place = checked_location(&self.latitude, &self.longitude)?;
        Ok(VehiclePatch {
            image_url: None,
            year: Some(self.year),
            name: Some(self.name),
            licence: Some(self.licence),
            place: Some(place),
        })
    }
}

//! Stateless HTTP request builder and response parser for the `car` resource.
//!
//! # Design
//! `VehicleClient` holds only a parsed base URL and carries no mutable state
//! between calls. Ids are appended as percent-encoded path segments, so any
//! non-empty id reaches the server intact. Each CRUD operation is split into
//! a `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip, keeping this layer
//! deterministic and free of I/O.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Vehicle, VehicleById, VehicleId, VehiclePatch};

const RESOURCE: &str = "car";

/// Synchronous, stateless client for the vehicle API.
#[derive(Debug, Clone)]
pub struct VehicleClient {
    base: Url,
}

impl VehicleClient {
    /// Fails if `base_url` is not an absolute URL that can carry a path.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidInput(format!("base url {base_url:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidInput(format!(
                "base url {base_url:?} cannot carry a path"
            )));
        }
        Ok(Self { base })
    }

    fn url_with(&self, segments: &[&str]) -> String {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }

    fn collection_url(&self) -> String {
        self.url_with(&[RESOURCE])
    }

    fn item_url(&self, id: &VehicleId) -> String {
        self.url_with(&[RESOURCE, id.as_str()])
    }

    pub fn build_list_vehicles(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.collection_url(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_vehicle(&self, id: &VehicleId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_vehicle(&self, vehicle: &Vehicle) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(vehicle).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.collection_url(),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_update_vehicle(&self, id: &VehicleId, patch: &VehiclePatch) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(patch).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Patch,
            path: self.item_url(id),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_delete_vehicle(&self, id: &VehicleId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_vehicles(&self, response: HttpResponse) -> Result<Vec<Vehicle>, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    /// Accepts both a bare vehicle and the `{id, value}` envelope.
    pub fn parse_get_vehicle(&self, id: &VehicleId, response: HttpResponse) -> Result<Vehicle, ApiError> {
        check_status(&response)?;
        let vehicle = match decode::<GetBody>(&response.body)? {
            GetBody::Wrapped(wrapped) => {
                ensure_same_id(&wrapped.id, &wrapped.value.id)?;
                wrapped.value
            }
            GetBody::Bare(vehicle) => vehicle,
        };
        ensure_same_id(id, &vehicle.id)?;
        Ok(vehicle)
    }

    pub fn parse_create_vehicle(&self, response: HttpResponse) -> Result<Vehicle, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_update_vehicle(&self, id: &VehicleId, response: HttpResponse) -> Result<Vehicle, ApiError> {
        check_status(&response)?;
        let vehicle: Vehicle = decode(&response.body)?;
        ensure_same_id(id, &vehicle.id)?;
        Ok(vehicle)
    }

    /// Any body returned alongside a 2xx is ignored.
    pub fn parse_delete_vehicle(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GetBody {
    Wrapped(VehicleById),
    Bare(Vehicle),
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn ensure_same_id(expected: &VehicleId, actual: &VehicleId) -> Result<(), ApiError> {
    if expected == actual {
        return Ok(());
    }
    Err(ApiError::IdMismatch {
        expected: expected.to_string(),
        actual: actual.to_string(),
    })
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let body = response.body.clone();
    Err(match response.status {
        404 => ApiError::NotFound,
        409 => ApiError::Conflict { body },
        400 | 422 => ApiError::Validation {
            status: response.status,
            body,
        },
        status => ApiError::HttpError { status, body },
    })
}

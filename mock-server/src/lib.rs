use std::{collections::BTreeMap, net::SocketAddr, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub long: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub year: String,
    pub name: String,
    pub licence: String,
    pub place: Location,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VehicleById {
    pub id: String,
    pub value: Vehicle,
}

/// Partial update body. A full vehicle (including `id`) is accepted too.
#[derive(Debug, Default, Deserialize)]
pub struct VehiclePatch {
    pub id: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub year: Option<String>,
    pub name: Option<String>,
    pub licence: Option<String>,
    pub place: Option<Location>,
}

pub type Db = Arc<RwLock<BTreeMap<String, Vehicle>>>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("vehicle {0} not found")]
    NotFound(String),
    #[error("vehicle {0} already exists")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Conflict(_) => StatusCode::CONFLICT,
            ServerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        debug!(%status, error = %self, "request rejected");
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::Validation(rejection.body_text())
    }
}

/// Listen address, from `MOCK_HOST` / `MOCK_PORT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed("MOCK_"))
            .extract()
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(BTreeMap::new()));
    Router::new()
        .route("/car", get(list_vehicles).post(create_vehicle))
        .route(
            "/car/{id}",
            get(get_vehicle).patch(update_vehicle).delete(delete_vehicle),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    let addr: Option<SocketAddr> = listener.local_addr().ok();
    info!(?addr, "mock car server listening");
    axum::serve(listener, app()).await
}

async fn list_vehicles(State(db): State<Db>) -> Json<Vec<Vehicle>> {
    let vehicles = db.read().await;
    Json(vehicles.values().cloned().collect())
}

fn check_new_vehicle(vehicle: &Vehicle) -> Result<(), ServerError> {
    if vehicle.id.trim().is_empty() {
        return Err(ServerError::Validation("id must not be blank".to_string()));
    }
    if vehicle.name.trim().is_empty() {
        return Err(ServerError::Validation("name must not be blank".to_string()));
    }
    Ok(())
}

async fn create_vehicle(
    State(db): State<Db>,
    input: Result<Json<Vehicle>, JsonRejection>,
) -> Result<(StatusCode, Json<Vehicle>), ServerError> {
    let Json(vehicle) = input?;
    check_new_vehicle(&vehicle)?;

    let mut vehicles = db.write().await;
    if vehicles.contains_key(&vehicle.id) {
        return Err(ServerError::Conflict(vehicle.id));
    }
    info!(id = %vehicle.id, "vehicle created");
    vehicles.insert(vehicle.id.clone(), vehicle.clone());
    Ok((StatusCode::CREATED, Json(vehicle)))
}

async fn get_vehicle(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<VehicleById>, ServerError> {
    let vehicles = db.read().await;
    let vehicle = vehicles.get(&id).cloned().ok_or(ServerError::NotFound(id))?;
    Ok(Json(VehicleById {
        id: vehicle.id.clone(),
        value: vehicle,
    }))
}

async fn update_vehicle(
    State(db): State<Db>,
    Path(id): Path<String>,
    input: Result<Json<VehiclePatch>, JsonRejection>,
) -> Result<Json<Vehicle>, ServerError> {
    let Json(patch) = input?;
    if let Some(body_id) = &patch.id {
        if *body_id != id {
            return Err(ServerError::Validation(format!(
                "body id {body_id} does not match path id {id}"
            )));
        }
    }

    let mut vehicles = db.write().await;
    let vehicle = vehicles.get_mut(&id).ok_or_else(|| ServerError::NotFound(id.clone()))?;
    if let Some(image_url) = patch.image_url {
        vehicle.image_url = image_url;
    }
    if let Some(year) = patch.year {
        vehicle.year = year;
    }
    if let Some(name) = patch.name {
        vehicle.name = name;
    }
    if let Some(licence) = patch.licence {
        vehicle.licence = licence;
    }
    if let Some(place) = patch.place {
        vehicle.place = place;
    }
    info!(%id, "vehicle updated");
    Ok(Json(vehicle.clone()))
}

async fn delete_vehicle(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    let mut vehicles = db.write().await;
    vehicles
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(ServerError::NotFound(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_serializes_to_wire_shape() {
        let vehicle = Vehicle {
            id: "v1".to_string(),
            image_url: "https://img/1".to_string(),
            year: "2010".to_string(),
            name: "Corsa".to_string(),
            licence: "AAA0000".to_string(),
            place: Location { lat: 1.0, long: 2.0 },
        };
        let json = serde_json::to_value(&vehicle).unwrap();
        assert_eq!(json["id"], "v1");
        assert_eq!(json["imageUrl"], "https://img/1");
        assert_eq!(json["place"]["long"], 2.0);
    }

    #[test]
    fn patch_all_fields_optional() {
        let input: VehiclePatch = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.id.is_none());
        assert!(input.name.is_none());
        assert!(input.place.is_none());
    }

    #[test]
    fn patch_accepts_full_vehicle() {
        let input: VehiclePatch = serde_json::from_str(
            r#"{"id":"v1","imageUrl":"u","year":"y","name":"n","licence":"l","place":{"lat":0,"long":0}}"#,
        )
        .unwrap();
        assert_eq!(input.id.as_deref(), Some("v1"));
        assert_eq!(input.image_url.as_deref(), Some("u"));
    }

    #[test]
    fn vehicle_rejects_missing_place() {
        let result: Result<Vehicle, _> = serde_json::from_str(
            r#"{"id":"v1","imageUrl":"u","year":"y","name":"n","licence":"l"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn server_config_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = ServerConfig::load()?;
            assert_eq!(config, ServerConfig::default());
            assert_eq!(config.addr(), "127.0.0.1:3000");
            Ok(())
        });
    }

    #[test]
    fn server_config_env_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MOCK_HOST", "0.0.0.0");
            jail.set_env("MOCK_PORT", "8088");
            let config = ServerConfig::load()?;
            assert_eq!(config.addr(), "0.0.0.0:8088");
            Ok(())
        });
    }

    #[test]
    fn server_config_env_overrides_one_field() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MOCK_PORT", "4000");
            let config = ServerConfig::load()?;
            assert_eq!(config.host, "127.0.0.1");
            assert_eq!(config.port, 4000);
            Ok(())
        });
    }

    #[test]
    fn server_config_rejects_bad_port() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MOCK_PORT", "not-a-port");
            assert!(ServerConfig::load().is_err());
            Ok(())
        });
    }
}

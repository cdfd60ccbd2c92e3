//! Async vehicle operations over a `Transport`.
//!
//! Each method is one build → execute → parse round-trip. The service holds no
//! mutable state, so concurrent calls on a shared reference are independent
//! and unordered.

use tracing::instrument;

use crate::client::VehicleClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{Vehicle, VehicleId, VehiclePatch};

#[derive(Debug, Clone)]
pub struct VehicleService<T> {
    client: VehicleClient,
    transport: T,
}

impl VehicleService<ReqwestTransport> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(VehicleClient::new(&config.base_url)?, ReqwestTransport::new(config)?))
    }
}

impl<T: Transport> VehicleService<T> {
    pub fn new(client: VehicleClient, transport: T) -> Self {
        Self { client, transport }
    }

    #[instrument(skip_all)]
    pub async fn list(&self) -> Result<Vec<Vehicle>, ApiError> {
        let request = self.client.build_list_vehicles();
        let response = self.transport.execute(request).await?;
        self.client.parse_list_vehicles(response)
    }

    #[instrument(skip_all, fields(id = %id))]
    pub async fn get(&self, id: &VehicleId) -> Result<Vehicle, ApiError> {
        let request = self.client.build_get_vehicle(id);
        let response = self.transport.execute(request).await?;
        self.client.parse_get_vehicle(id, response)
    }

    #[instrument(skip_all, fields(id = %vehicle.id))]
    pub async fn create(&self, vehicle: &Vehicle) -> Result<Vehicle, ApiError> {
        let request = self.client.build_create_vehicle(vehicle)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_create_vehicle(response)
    }

    #[instrument(skip_all, fields(id = %id))]
    pub async fn update(&self, id: &VehicleId, patch: &VehiclePatch) -> Result<Vehicle, ApiError> {
        if patch.is_empty() {
            return Err(ApiError::InvalidInput("update carries no fields".to_string()));
        }
        let request = self.client.build_update_vehicle(id, patch)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_update_vehicle(id, response)
    }

    #[instrument(skip_all, fields(id = %id))]
    pub async fn delete(&self, id: &VehicleId) -> Result<(), ApiError> {
        let request = self.client.build_delete_vehicle(id);
        let response = self.transport.execute(request).await?;
        self.client.parse_delete_vehicle(response)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::error::ErrorKind;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};
    use crate::outcome::{safe_call, Outcome};
    use crate::types::Location;

    /// Replays canned results and records what it was asked to send.
    #[derive(Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
        sent: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn reply(self, status: u16, body: &str) -> Self {
            self.replies.lock().unwrap().push_back(Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            }));
            self
        }

        fn fail(self, err: ApiError) -> Self {
            self.replies.lock().unwrap().push_back(Err(err));
            self
        }

        fn sent(&self) -> Vec<HttpRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.sent.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Network("no scripted reply".to_string())))
        }
    }

    fn service(transport: ScriptedTransport) -> VehicleService<ScriptedTransport> {
        VehicleService::new(VehicleClient::new("http://fleet.test").unwrap(), transport)
    }

    fn vehicle(id: &str) -> Vehicle {
        Vehicle {
            id: VehicleId::parse(id).unwrap(),
            image_url: "file:///pictures/JPEG_1.jpg".to_string(),
            year: "2018".to_string(),
            name: "Uno".to_string(),
            licence: "XYZ9876".to_string(),
            place: Location { lat: 10.0, long: 20.0 },
        }
    }

    #[tokio::test]
    async fn create_sends_post_and_returns_stored_record() {
        let stored = vehicle("v-1");
        let svc = service(ScriptedTransport::default().reply(201, &serde_json::to_string(&stored).unwrap()));
        let created = svc.create(&stored).await.unwrap();
        assert_eq!(created, stored);
        let sent = svc.transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(sent[0].path, "http://fleet.test/car");
    }

    #[tokio::test]
    async fn get_unwraps_envelope() {
        let stored = vehicle("v-1");
        let body = serde_json::json!({"id": "v-1", "value": stored}).to_string();
        let svc = service(ScriptedTransport::default().reply(200, &body));
        let fetched = svc.get(&stored.id).await.unwrap();
        assert_eq!(fetched, stored);
    }

    #[tokio::test]
    async fn update_rejects_empty_patch_without_sending() {
        let svc = service(ScriptedTransport::default());
        let err = svc
            .update(&VehicleId::parse("v-1").unwrap(), &VehiclePatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert!(svc.transport.sent().is_empty());
    }

    #[tokio::test]
    async fn update_sends_patch_to_item_path() {
        let mut updated = vehicle("v-1");
        updated.name = "Palio".to_string();
        let svc = service(ScriptedTransport::default().reply(200, &serde_json::to_string(&updated).unwrap()));
        let patch = VehiclePatch {
            name: Some("Palio".to_string()),
            ..VehiclePatch::default()
        };
        let result = svc.update(&updated.id, &patch).await.unwrap();
        assert_eq!(result.name, "Palio");
        let sent = svc.transport.sent();
        assert_eq!(sent[0].method, HttpMethod::Patch);
        assert_eq!(sent[0].path, "http://fleet.test/car/v-1");
    }

    #[tokio::test]
    async fn transport_error_surfaces_through_adapter() {
        let svc = service(ScriptedTransport::default().fail(ApiError::Timeout));
        let outcome = safe_call(|| svc.list()).await;
        match outcome {
            Outcome::Failure(failure) => {
                assert_eq!(failure.kind, ErrorKind::Network);
                assert_eq!(failure.status, None);
            }
            Outcome::Success(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn from_config_rejects_unusable_base_url() {
        let config = ClientConfig {
            base_url: "fleet.test without scheme".to_string(),
            timeout_secs: 5,
        };
        let err = VehicleService::from_config(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[tokio::test]
    async fn delete_not_found_is_server_404() {
        let svc = service(ScriptedTransport::default().reply(404, ""));
        let id = VehicleId::parse("gone").unwrap();
        let outcome = safe_call(|| svc.delete(&id)).await;
        assert!(outcome.failure().unwrap().is_not_found());
    }
}

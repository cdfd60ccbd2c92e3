//! Client core for the vehicle fleet API.
//!
//! # Overview
//! Lists, creates, reads, updates and deletes records in the remote `car`
//! collection. Two layers:
//!
//! - `VehicleClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO pattern). The C ABI
//!   in `fleet-ffi` exposes exactly this layer.
//! - `VehicleService` runs the same operations asynchronously over a
//!   `Transport` (reqwest by default).
//!
//! Callers wrap service calls in `safe_call`, which always returns an
//! `Outcome` and never lets an error or panic escape.
//!
//! # Design
//! - Client, service and adapter hold no mutable state; concurrent calls
//!   are independent and unordered.
//! - `ErrorKind` and the HTTP status survive the adapter boundary.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod outcome;
pub mod service;
pub mod transport;
pub mod types;

pub use client::VehicleClient;
pub use config::ClientConfig;
pub use error::{ApiError, ErrorKind};
pub use form::{EditVehicleForm, FormError, NewVehicleForm};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use outcome::{safe_call, safe_call_cancellable, Failure, Outcome};
pub use service::VehicleService;
pub use tokio_util::sync::CancellationToken;
pub use transport::{ReqwestTransport, Transport};
pub use types::{Location, Vehicle, VehicleById, VehicleId, VehiclePatch};

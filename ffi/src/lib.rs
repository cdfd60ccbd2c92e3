//! C-ABI wrapper around `fleet-core`.
//!
//! # Overview
//! Exposes the vehicle CRUD API through `extern "C"` functions so a mobile
//! host (or any language with a C FFI) can build and parse HTTP
//! requests/responses while doing the network I/O itself.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `build_*` / `parse_*` mirrors the core API 1:1.
//! - A single `FfiOutcome` envelope with `FfiErrorKind` + `FfiDataTag` +
//!   `void* data` conveys success payloads and failures uniformly; the
//!   failure class and HTTP status survive the boundary.
//! - The C caller owns all returned pointers and must call the matching
//!   `fleet_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use fleet_core::error::ApiError;
use fleet_core::http::HttpResponse;
use fleet_core::types::VehicleId;
use fleet_core::VehicleClient;

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `VehicleClient` bound to `base_url`.
///
/// Returns null if `base_url` is null, not UTF-8 or not an absolute URL, or
/// if an internal panic occurs. The caller must free the returned pointer
/// with `fleet_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn fleet_client_new(base_url: *const c_char) -> *mut FfiVehicleClient {
    catch_unwind(|| {
        match unsafe { read_str(base_url) }.and_then(|url| VehicleClient::new(&url).ok()) {
            Some(inner) => Box::into_raw(Box::new(FfiVehicleClient { inner })),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `fleet_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fleet_client_free(client: *mut FfiVehicleClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

/// Generate a fresh vehicle identifier for a record about to be created.
///
/// The caller must free the returned string with `fleet_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn fleet_generate_id() -> *mut c_char {
    catch_unwind(|| to_c_string(VehicleId::generate())).unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Parse a caller-supplied id, `None` if null or rejected.
fn read_id(id: *const c_char) -> Option<VehicleId> {
    unsafe { read_str(id) }.and_then(|raw| VehicleId::parse(&raw).ok())
}

/// Build an HTTP request for listing all vehicles.
///
/// Returns null if `client` is null.
/// The caller must free the returned pointer with `fleet_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn fleet_build_list_vehicles(client: *const FfiVehicleClient) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_list_vehicles())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build an HTTP request for fetching a single vehicle by id.
///
/// Returns null if `client` or `id` is null, or if `id` is empty. The id is
/// percent-encoded into the path.
#[unsafe(no_mangle)]
pub extern "C" fn fleet_build_get_vehicle(
    client: *const FfiVehicleClient,
    id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match read_id(id) {
            Some(id) => FfiHttpRequest::from_core(client.inner.build_get_vehicle(&id)),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build an HTTP request for creating a vehicle.
///
/// A null `input.id` gets a freshly generated id. Returns null if `client` or
/// `input` is null, if a required string field is null, or if the id is
/// rejected.
#[unsafe(no_mangle)]
pub extern "C" fn fleet_build_create_vehicle(
    client: *const FfiVehicleClient,
    input: *const FfiVehicleInput,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() || input.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let vehicle = match unsafe { (*input).to_core() } {
            Ok(v) => v,
            Err(_) => return std::ptr::null_mut(),
        };
        match client.inner.build_create_vehicle(&vehicle) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build an HTTP request for updating an existing vehicle.
///
/// Null string fields in `patch` are left unchanged; `place` is only sent when
/// `patch.has_place` is true. Returns null if `client`, `id` or `patch` is
/// null, if `id` is rejected, or if the patch changes nothing.
#[unsafe(no_mangle)]
pub extern "C" fn fleet_build_update_vehicle(
    client: *const FfiVehicleClient,
    id: *const c_char,
    patch: *const FfiVehiclePatch,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() || patch.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(id) = read_id(id) else {
            return std::ptr::null_mut();
        };
        let patch = unsafe { (*patch).to_core() };
        if patch.is_empty() {
            return std::ptr::null_mut();
        }
        match client.inner.build_update_vehicle(&id, &patch) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build an HTTP request for deleting a vehicle by id.
///
/// Returns null if `client` or `id` is null, or if `id` is rejected.
#[unsafe(no_mangle)]
pub extern "C" fn fleet_build_delete_vehicle(
    client: *const FfiVehicleClient,
    id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match read_id(id) {
            Some(id) => FfiHttpRequest::from_core(client.inner.build_delete_vehicle(&id)),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`.
///
/// A null body is read as the empty string; invalid UTF-8 is replaced with
/// U+FFFD so error bodies still reach the caller.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(resp.body) }.to_string_lossy().into_owned()
    };
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body,
    }
}

/// Shared null checks and panic guard for every `fleet_parse_*` function.
fn guarded_parse(
    name: &str,
    client: *const FfiVehicleClient,
    response: *const FfiHttpResponse,
    parse: impl FnOnce(&VehicleClient, HttpResponse) -> *mut FfiOutcome,
) -> *mut FfiOutcome {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiOutcome::null_arg("client");
        }
        if response.is_null() {
            return FfiOutcome::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        parse(&client.inner, ffi_response_to_core(resp))
    }))
    .unwrap_or_else(|_| FfiOutcome::panic(&format!("panic in {name}")))
}

/// Like `read_id`, but reports why the id was refused.
fn require_id(id: *const c_char) -> Result<VehicleId, *mut FfiOutcome> {
    if id.is_null() {
        return Err(FfiOutcome::null_arg("id"));
    }
    match unsafe { read_str(id) } {
        Some(raw) => VehicleId::parse(&raw).map_err(FfiOutcome::from_error),
        None => Err(FfiOutcome::from_error(ApiError::InvalidInput(
            "id is not valid UTF-8".to_string(),
        ))),
    }
}

/// Parse an HTTP response from a list-vehicles request.
///
/// Returns an outcome with `data_tag = VehicleList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn fleet_parse_list_vehicles(
    client: *const FfiVehicleClient,
    response: *const FfiHttpResponse,
) -> *mut FfiOutcome {
    guarded_parse("fleet_parse_list_vehicles", client, response, |client, resp| {
        match client.parse_list_vehicles(resp) {
            Ok(vehicles) => FfiOutcome::ok_vehicle_list(vehicles),
            Err(e) => FfiOutcome::from_error(e),
        }
    })
}

/// Parse an HTTP response from a get-vehicle request for `id`.
///
/// Accepts both a bare vehicle and the `{id, value}` envelope. Returns an
/// outcome with `data_tag = Vehicle` on success.
#[unsafe(no_mangle)]
pub extern "C" fn fleet_parse_get_vehicle(
    client: *const FfiVehicleClient,
    id: *const c_char,
    response: *const FfiHttpResponse,
) -> *mut FfiOutcome {
    guarded_parse("fleet_parse_get_vehicle", client, response, |client, resp| {
        let id = match require_id(id) {
            Ok(id) => id,
            Err(outcome) => return outcome,
        };
        match client.parse_get_vehicle(&id, resp) {
            Ok(vehicle) => FfiOutcome::ok_vehicle(vehicle),
            Err(e) => FfiOutcome::from_error(e),
        }
    })
}

/// Parse an HTTP response from a create-vehicle request.
///
/// Returns an outcome with `data_tag = Vehicle` on success.
#[unsafe(no_mangle)]
pub extern "C" fn fleet_parse_create_vehicle(
    client: *const FfiVehicleClient,
    response: *const FfiHttpResponse,
) -> *mut FfiOutcome {
    guarded_parse("fleet_parse_create_vehicle", client, response, |client, resp| {
        match client.parse_create_vehicle(resp) {
            Ok(vehicle) => FfiOutcome::ok_vehicle(vehicle),
            Err(e) => FfiOutcome::from_error(e),
        }
    })
}

/// Parse an HTTP response from an update-vehicle request for `id`.
///
/// Returns an outcome with `data_tag = Vehicle` on success.
#[unsafe(no_mangle)]
pub extern "C" fn fleet_parse_update_vehicle(
    client: *const FfiVehicleClient,
    id: *const c_char,
    response: *const FfiHttpResponse,
) -> *mut FfiOutcome {
    guarded_parse("fleet_parse_update_vehicle", client, response, |client, resp| {
        let id = match require_id(id) {
            Ok(id) => id,
            Err(outcome) => return outcome,
        };
        match client.parse_update_vehicle(&id, resp) {
            Ok(vehicle) => FfiOutcome::ok_vehicle(vehicle),
            Err(e) => FfiOutcome::from_error(e),
        }
    })
}

/// Parse an HTTP response from a delete-vehicle request.
///
/// Returns an outcome with `data_tag = None` on success.
#[unsafe(no_mangle)]
pub extern "C" fn fleet_parse_delete_vehicle(
    client: *const FfiVehicleClient,
    response: *const FfiHttpResponse,
) -> *mut FfiOutcome {
    guarded_parse("fleet_parse_delete_vehicle", client, response, |client, resp| {
        match client.parse_delete_vehicle(resp) {
            Ok(()) => FfiOutcome::ok_empty(),
            Err(e) => FfiOutcome::from_error(e),
        }
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `fleet_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fleet_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.path);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiOutcome` returned by any `fleet_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn fleet_free_outcome(outcome: *mut FfiOutcome) {
    if outcome.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let outcome = unsafe { Box::from_raw(outcome) };
        free_c_string(outcome.error_message);
        if outcome.data.is_null() {
            return;
        }
        match outcome.data_tag {
            FfiDataTag::Vehicle => {
                let vehicle = unsafe { Box::from_raw(outcome.data as *mut FfiVehicle) };
                vehicle.free_fields();
            }
            FfiDataTag::VehicleList => {
                let list = unsafe { Box::from_raw(outcome.data as *mut FfiVehicleList) };
                if !list.items.is_null() && list.len > 0 {
                    let items = unsafe {
                        Box::from_raw(std::ptr::slice_from_raw_parts_mut(list.items, list.len as usize))
                    };
                    for item in items.iter() {
                        item.free_fields();
                    }
                }
            }
            FfiDataTag::None => {}
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fleet_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

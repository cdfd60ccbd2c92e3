//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use fleet_core::error::{ApiError, ErrorKind};
use fleet_core::http::HttpMethod;
use fleet_core::types::{Location, Vehicle, VehicleId, VehiclePatch};

/// Opaque handle to a `VehicleClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiVehicleClient {
    pub(crate) inner: fleet_core::VehicleClient,
}

/// Copy a Rust string into a heap C string owned by the caller.
///
/// Interior NUL bytes cannot be represented and are dropped.
pub(crate) fn to_c_string(s: impl Into<String>) -> *mut c_char {
    let mut bytes = s.into().into_bytes();
    bytes.retain(|b| *b != 0);
    CString::new(bytes).unwrap_or_default().into_raw()
}

/// Borrow a caller-owned C string as UTF-8. `None` for null or invalid UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives the call.
pub(crate) unsafe fn read_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok().map(str::to_string)
}

/// Release a C string produced by `to_c_string`. Null is ignored.
pub(crate) fn free_c_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Patch = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `fleet_build_*` functions. The host executes the request and
/// passes the response back through `fleet_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: fleet_core::HttpRequest) -> *mut Self {
        let path = to_c_string(req.path);
        let body = match req.body {
            Some(b) => to_c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Caller-provided inputs (not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The host constructs this on the stack after executing a request, then
/// passes a pointer to a `fleet_parse_*` function. The FFI layer reads but
/// does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

/// A vehicle to create. A null `id` means "generate one".
#[repr(C)]
pub struct FfiVehicleInput {
    pub id: *const c_char,
    pub image_url: *const c_char,
    pub year: *const c_char,
    pub name: *const c_char,
    pub licence: *const c_char,
    pub lat: f64,
    pub long: f64,
}

impl FfiVehicleInput {
    /// Read the caller's fields into a core `Vehicle`.
    ///
    /// # Safety
    /// Every non-null pointer must reference a valid NUL-terminated string.
    pub(crate) unsafe fn to_core(&self) -> Result<Vehicle, ApiError> {
        let required = |ptr: *const c_char, field: &str| {
            unsafe { read_str(ptr) }
                .ok_or_else(|| ApiError::InvalidInput(format!("{field} is null or not UTF-8")))
        };
        let id = match unsafe { read_str(self.id) } {
            Some(raw) => VehicleId::parse(&raw)?,
            None => VehicleId::generate(),
        };
        Ok(Vehicle {
            id,
            image_url: required(self.image_url, "image_url")?,
            year: required(self.year, "year")?,
            name: required(self.name, "name")?,
            licence: required(self.licence, "licence")?,
            place: Location {
                lat: self.lat,
                long: self.long,
            },
        })
    }
}

/// Fields to change on an existing vehicle. Null strings are left unchanged;
/// `place` is only sent when `has_place` is true.
#[repr(C)]
pub struct FfiVehiclePatch {
    pub image_url: *const c_char,
    pub year: *const c_char,
    pub name: *const c_char,
    pub licence: *const c_char,
    pub has_place: bool,
    pub lat: f64,
    pub long: f64,
}

impl FfiVehiclePatch {
    /// # Safety
    /// Every non-null pointer must reference a valid NUL-terminated string.
    pub(crate) unsafe fn to_core(&self) -> VehiclePatch {
        unsafe {
            VehiclePatch {
                image_url: read_str(self.image_url),
                year: read_str(self.year),
                name: read_str(self.name),
                licence: read_str(self.licence),
                place: self.has_place.then_some(Location {
                    lat: self.lat,
                    long: self.long,
                }),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Failure class carried by `FfiOutcome`. `Ok` means success.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorKind {
    Ok = 0,
    Network = 1,
    Decode = 2,
    Server = 3,
    Invalid = 4,
    Cancelled = 5,
    Unknown = 6,
    Panic = 7,
    NullArg = 8,
}

impl From<ErrorKind> for FfiErrorKind {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Network => FfiErrorKind::Network,
            ErrorKind::Decode => FfiErrorKind::Decode,
            ErrorKind::Server => FfiErrorKind::Server,
            ErrorKind::Invalid => FfiErrorKind::Invalid,
            ErrorKind::Cancelled => FfiErrorKind::Cancelled,
            ErrorKind::Unknown => FfiErrorKind::Unknown,
        }
    }
}

/// Tag that tells `fleet_free_outcome` what `FfiOutcome::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Vehicle = 1,
    VehicleList = 2,
}

/// A single vehicle exposed to C.
#[repr(C)]
pub struct FfiVehicle {
    pub id: *mut c_char,
    pub image_url: *mut c_char,
    pub year: *mut c_char,
    pub name: *mut c_char,
    pub licence: *mut c_char,
    pub lat: f64,
    pub long: f64,
}

impl FfiVehicle {
    fn from_core(vehicle: Vehicle) -> Self {
        FfiVehicle {
            id: to_c_string(vehicle.id),
            image_url: to_c_string(vehicle.image_url),
            year: to_c_string(vehicle.year),
            name: to_c_string(vehicle.name),
            licence: to_c_string(vehicle.licence),
            lat: vehicle.place.lat,
            long: vehicle.place.long,
        }
    }

    /// Free the C-string fields (but not the struct itself).
    pub(crate) fn free_fields(&self) {
        free_c_string(self.id);
        free_c_string(self.image_url);
        free_c_string(self.year);
        free_c_string(self.name);
        free_c_string(self.licence);
    }
}

/// A list of vehicles exposed to C.
#[repr(C)]
pub struct FfiVehicleList {
    pub items: *mut FfiVehicle,
    pub len: u32,
}

/// Outcome envelope for all parse operations.
///
/// On success `error_kind` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_kind` describes the class, `http_status` is the status
/// that caused it (0 if none), `error_message` is a human-readable C string,
/// and `data` is null.
#[repr(C)]
pub struct FfiOutcome {
    pub error_kind: FfiErrorKind,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut std::ffi::c_void,
}

impl FfiOutcome {
    fn success(data_tag: FfiDataTag, data: *mut std::ffi::c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiOutcome {
            error_kind: FfiErrorKind::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn failure(error_kind: FfiErrorKind, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiOutcome {
            error_kind,
            error_message: to_c_string(msg),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    /// Build a success outcome carrying a single `FfiVehicle`.
    pub(crate) fn ok_vehicle(vehicle: Vehicle) -> *mut Self {
        let ffi_vehicle = Box::new(FfiVehicle::from_core(vehicle));
        Self::success(FfiDataTag::Vehicle, Box::into_raw(ffi_vehicle) as *mut std::ffi::c_void)
    }

    /// Build a success outcome carrying a `FfiVehicleList`.
    pub(crate) fn ok_vehicle_list(vehicles: Vec<Vehicle>) -> *mut Self {
        let len = vehicles.len() as u32;
        let items = if vehicles.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_vehicles: Box<[FfiVehicle]> = vehicles.into_iter().map(FfiVehicle::from_core).collect();
            Box::into_raw(ffi_vehicles) as *mut FfiVehicle
        };
        let ffi_list = Box::new(FfiVehicleList { items, len });
        Self::success(FfiDataTag::VehicleList, Box::into_raw(ffi_list) as *mut std::ffi::c_void)
    }

    /// Build a success outcome with no data payload (e.g. delete).
    pub(crate) fn ok_empty() -> *mut Self {
        Self::success(FfiDataTag::None, std::ptr::null_mut())
    }

    /// Build a failure outcome from an `ApiError`, keeping kind and status.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let status = err.status().unwrap_or(0);
        Self::failure(err.kind().into(), status, err.to_string())
    }

    /// Build a failure outcome for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorKind::NullArg, 0, format!("null argument: {name}"))
    }

    /// Build a failure outcome for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorKind::Panic, 0, msg.to_string())
    }
}

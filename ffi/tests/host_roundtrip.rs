//! Drives the C ABI the way a native host would: build a request, execute it
//! with a real HTTP client, hand the response back for parsing.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::mpsc;

use fleet_ffi::types::*;
use fleet_ffi::*;

fn start_server() -> String {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            mock_server::run(listener).await.unwrap();
        });
    });
    format!("http://{}", rx.recv().unwrap())
}

fn agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .into()
}

fn c_str(ptr: *const c_char) -> String {
    unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string()
}

/// Execute an `FfiHttpRequest` and return `(status, body)`.
fn execute(agent: &ureq::Agent, req: *const FfiHttpRequest) -> (u16, String) {
    let req = unsafe { &*req };
    let url = c_str(req.path);
    let headers: Vec<(String, String)> = if req.headers.is_null() {
        Vec::new()
    } else {
        unsafe { std::slice::from_raw_parts(req.headers, req.headers_len as usize) }
            .iter()
            .map(|h| (c_str(h.key), c_str(h.value)))
            .collect()
    };
    let body = (!req.body.is_null()).then(|| c_str(req.body));

    let result = match (req.method, body) {
        (FfiHttpMethod::Get, _) => agent.get(&url).call(),
        (FfiHttpMethod::Delete, _) => agent.delete(&url).call(),
        (FfiHttpMethod::Post, body) => {
            let mut builder = agent.post(&url);
            for (k, v) in &headers {
                builder = builder.header(k, v);
            }
            builder.send(body.unwrap_or_default())
        }
        (FfiHttpMethod::Patch, body) => {
            let mut builder = agent.patch(&url);
            for (k, v) in &headers {
                builder = builder.header(k, v);
            }
            builder.send(body.unwrap_or_default())
        }
    };
    let mut resp = result.unwrap();
    let status = resp.status().as_u16();
    let text = resp.body_mut().read_to_string().unwrap();
    (status, text)
}

/// Build, execute, free the request; then parse with `parse` and return the outcome.
fn round_trip(
    agent: &ureq::Agent,
    req: *mut FfiHttpRequest,
    parse: impl FnOnce(*const FfiHttpResponse) -> *mut FfiOutcome,
) -> *mut FfiOutcome {
    assert!(!req.is_null());
    let (status, body) = execute(agent, req);
    fleet_free_request(req);

    let body = CString::new(body).unwrap();
    let resp = FfiHttpResponse {
        status,
        body: body.as_ptr(),
    };
    parse(&resp)
}

#[test]
fn crud_through_the_c_abi() {
    let base_url = CString::new(start_server()).unwrap();
    let agent = agent();
    let client = fleet_client_new(base_url.as_ptr());
    assert!(!client.is_null());

    // create
    let image = CString::new("file:///Pictures/JPEG_fusca.jpg").unwrap();
    let year = CString::new("1974").unwrap();
    let name = CString::new("Fusca").unwrap();
    let licence = CString::new("VWB1974").unwrap();
    let input = FfiVehicleInput {
        id: std::ptr::null(),
        image_url: image.as_ptr(),
        year: year.as_ptr(),
        name: name.as_ptr(),
        licence: licence.as_ptr(),
        lat: -23.55,
        long: -46.63,
    };
    let outcome = round_trip(&agent, fleet_build_create_vehicle(client, &input), |resp| {
        fleet_parse_create_vehicle(client, resp)
    });
    let r = unsafe { &*outcome };
    assert_eq!(r.error_kind, FfiErrorKind::Ok);
    let created = unsafe { &*(r.data as *const FfiVehicle) };
    let id = CString::new(c_str(created.id)).unwrap();
    assert_eq!(c_str(created.name), "Fusca");
    fleet_free_outcome(outcome);

    // get
    let outcome = round_trip(&agent, fleet_build_get_vehicle(client, id.as_ptr()), |resp| {
        fleet_parse_get_vehicle(client, id.as_ptr(), resp)
    });
    let r = unsafe { &*outcome };
    assert_eq!(r.error_kind, FfiErrorKind::Ok);
    let fetched = unsafe { &*(r.data as *const FfiVehicle) };
    assert_eq!(c_str(fetched.licence), "VWB1974");
    assert_eq!(fetched.lat, -23.55);
    fleet_free_outcome(outcome);

    // update
    let new_year = CString::new("1975").unwrap();
    let patch = FfiVehiclePatch {
        image_url: std::ptr::null(),
        year: new_year.as_ptr(),
        name: std::ptr::null(),
        licence: std::ptr::null(),
        has_place: false,
        lat: 0.0,
        long: 0.0,
    };
    let outcome = round_trip(
        &agent,
        fleet_build_update_vehicle(client, id.as_ptr(), &patch),
        |resp| fleet_parse_update_vehicle(client, id.as_ptr(), resp),
    );
    let r = unsafe { &*outcome };
    assert_eq!(r.error_kind, FfiErrorKind::Ok);
    let updated = unsafe { &*(r.data as *const FfiVehicle) };
    assert_eq!(c_str(updated.year), "1975");
    assert_eq!(c_str(updated.name), "Fusca");
    fleet_free_outcome(outcome);

    // list
    let outcome = round_trip(&agent, fleet_build_list_vehicles(client), |resp| {
        fleet_parse_list_vehicles(client, resp)
    });
    let r = unsafe { &*outcome };
    assert_eq!(r.error_kind, FfiErrorKind::Ok);
    let list = unsafe { &*(r.data as *const FfiVehicleList) };
    assert_eq!(list.len, 1);
    fleet_free_outcome(outcome);

    // delete
    let outcome = round_trip(&agent, fleet_build_delete_vehicle(client, id.as_ptr()), |resp| {
        fleet_parse_delete_vehicle(client, resp)
    });
    assert_eq!(unsafe { &*outcome }.error_kind, FfiErrorKind::Ok);
    fleet_free_outcome(outcome);

    // get after delete
    let outcome = round_trip(&agent, fleet_build_get_vehicle(client, id.as_ptr()), |resp| {
        fleet_parse_get_vehicle(client, id.as_ptr(), resp)
    });
    let r = unsafe { &*outcome };
    assert_eq!(r.error_kind, FfiErrorKind::Server);
    assert_eq!(r.http_status, 404);
    fleet_free_outcome(outcome);

    fleet_client_free(client);
}

#[test]
fn duplicate_create_reports_conflict_status() {
    let base_url = CString::new(start_server()).unwrap();
    let agent = agent();
    let client = fleet_client_new(base_url.as_ptr());

    let id = CString::new("dup-1").unwrap();
    let field = CString::new("x").unwrap();
    let input = FfiVehicleInput {
        id: id.as_ptr(),
        image_url: field.as_ptr(),
        year: field.as_ptr(),
        name: field.as_ptr(),
        licence: field.as_ptr(),
        lat: 0.0,
        long: 0.0,
    };
    for expected in [(FfiErrorKind::Ok, 0), (FfiErrorKind::Server, 409)] {
        let outcome = round_trip(&agent, fleet_build_create_vehicle(client, &input), |resp| {
            fleet_parse_create_vehicle(client, resp)
        });
        let r = unsafe { &*outcome };
        assert_eq!((r.error_kind, r.http_status), expected);
        fleet_free_outcome(outcome);
    }

    fleet_client_free(client);
}

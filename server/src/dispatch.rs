/// Booking operation dispatcher
/// One tool invocation in, one envelope out. Each invocation is a single
/// request/response transaction: validate the identifying fields, build
/// the vendor payload, make at most one upstream call, reduce the result.
/// Requests missing their identifying fields never reach the vendor.

use dispatch_core::{
    cancel, jobref, BookingOperation, BookingRequest, BookingStatus, DispatchDefaults, Envelope,
    VehicleClass,
};
use serde_json::{json, Map, Value};

use crate::upstream::{BookingApi, UpstreamError};

/// Identifying key for lookup-style operations. Job references take
/// priority over phone numbers and are normalized before use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobLookup {
    Reference(String),
    Phone(String),
}

pub async fn dispatch(
    api: &BookingApi,
    defaults: &DispatchDefaults,
    request: &BookingRequest,
    call_id: &str,
) -> Envelope {
    let operation = match BookingOperation::parse(&request.operation) {
        Some(operation) => operation,
        None => {
            tracing::warn!("✗ [{}] Unrecognized operation tag: {:?}", call_id, request.operation);
            return Envelope::failure(BookingStatus::InvalidOperation, "Invalid operation requested");
        }
    };

    match operation {
        BookingOperation::Create => create_booking(api, defaults, request, call_id).await,
        BookingOperation::Get => get_booking(api, request, call_id).await,
        BookingOperation::Update => update_booking(api, defaults, request, call_id).await,
        BookingOperation::Cancel => cancel_booking(api, defaults, request, call_id).await,
        BookingOperation::DriverLocation => driver_location(api, request, call_id).await,
    }
}

/// Map an upstream failure onto the envelope taxonomy: transport faults
/// (network failure, timeout) are system errors, everything else is an
/// API error with the operation's non-technical message. The diagnostic
/// detail goes to the log, never to the conversational surface.
fn upstream_failure(err: UpstreamError, call_id: &str, message: &str) -> Envelope {
    tracing::error!("✗ [{}] {}", call_id, err);
    match err {
        UpstreamError::Transport(_) => {
            Envelope::failure(BookingStatus::SystemError, "System temporarily unavailable")
        }
        _ => Envelope::failure(BookingStatus::ApiError, message),
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Identifying key for get and cancel: job reference first, phone second.
pub fn lookup_for(request: &BookingRequest) -> Option<JobLookup> {
    if let Some(job_no) = present(&request.job_no) {
        Some(JobLookup::Reference(jobref::normalize(job_no)))
    } else {
        present(&request.phone).map(|phone| JobLookup::Phone(phone.to_string()))
    }
}

fn parse_count(raw: Option<&str>, fallback: u32) -> u32 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(fallback)
}

fn parse_price(raw: Option<&str>) -> f64 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0.0)
}

/// Vendor payload for create. The vehicle token is resolved to its
/// numeric class, the phone number falls back through
/// passengerPhone → Phone → the configured constant, and counts default
/// when absent or non-numeric. The job reference is a placeholder; the
/// real one is assigned upstream.
pub fn build_create_payload(request: &BookingRequest, defaults: &DispatchDefaults) -> Value {
    let vehicle = VehicleClass::resolve(request.vehicle_type_id.as_deref());
    let phone = present(&request.passenger_phone)
        .or_else(|| present(&request.phone))
        .unwrap_or(&defaults.fallback_phone)
        .to_string();
    let price = parse_price(request.customer_price.as_deref());
    let date = present(&request.date)
        .map(str::to_string)
        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

    json!({
        "id": 0,
        "jobNO": defaults.placeholder_job_ref,
        "date": date,
        "passengerName": request.passenger_name,
        "passengerPhone": phone,
        "passengerMobile": phone,
        "passengerEmail": request.passenger_email,
        "passengers": parse_count(request.passengers.as_deref(), 1),
        "bags": parse_count(request.bags.as_deref(), 0),
        "note": request.note.clone().unwrap_or_default(),
        "companyId": defaults.company_id,
        "driver_id": Value::Null,
        "paymentMethod_id": Value::Null,
        "driverPrice": price,
        "customerPrice": price,
        "duration": 0,
        "distance": 0,
        "jobSource": defaults.job_source,
        "jobcase": 0,
        "vehicleTypeId": vehicle.id(),
        "origin": request.origin,
        "destination": request.destination,
    })
}

/// Sparse payload for update: only fields present on the request are
/// serialized, so absent fields never overwrite existing vendor values.
pub fn build_update_payload(request: &BookingRequest, defaults: &DispatchDefaults) -> Value {
    let mut payload = Map::new();
    payload.insert("id".to_string(), json!(request.job_no));
    payload.insert("companyId".to_string(), json!(defaults.company_id));

    let optional = [
        ("passengerName", &request.passenger_name),
        ("passengerPhone", &request.phone),
        ("passengerEmail", &request.passenger_email),
        ("date", &request.date),
        ("origin", &request.origin),
        ("destination", &request.destination),
        ("note", &request.note),
    ];
    for (key, field) in optional {
        if let Some(value) = present(field) {
            payload.insert(key.to_string(), json!(value));
        }
    }
    // A non-numeric passenger count is dropped rather than sent as garbage
    if let Some(passengers) = request.passengers.as_deref().and_then(|v| v.trim().parse::<u32>().ok()) {
        payload.insert("passengers".to_string(), json!(passengers));
    }

    Value::Object(payload)
}

async fn create_booking(
    api: &BookingApi,
    defaults: &DispatchDefaults,
    request: &BookingRequest,
    call_id: &str,
) -> Envelope {
    let payload = build_create_payload(request, defaults);
    tracing::info!(
        "→ [{}] Creating booking: vehicle {:?} → class {}, phone {}",
        call_id,
        request.vehicle_type_id,
        payload["vehicleTypeId"],
        payload["passengerPhone"]
    );

    match api.create_job(&payload).await {
        Ok(result) => {
            let job_no = result.get("jobNO").cloned().filter(|v| !v.is_null());
            let Some(job_no) = job_no else {
                tracing::error!("✗ [{}] Vendor accepted the job but returned no reference", call_id);
                return Envelope::failure(
                    BookingStatus::ApiError,
                    "Unable to create booking at the moment",
                );
            };
            tracing::info!("✓ [{}] Booking created, job {}", call_id, job_no);
            Envelope::success(
                BookingStatus::Confirmed,
                json!({
                    "jobNO": job_no,
                    "bookingId": result.get("id"),
                    "passengerName": result.get("passengerName"),
                    "customerPrice": result.get("customerPrice"),
                    "date": result.get("date"),
                    "origin": result.get("origin"),
                    "destination": result.get("destination"),
                    "vehicleType": request.vehicle_type_id,
                    "phoneNumber": payload["passengerPhone"],
                }),
            )
        }
        Err(err) => upstream_failure(err, call_id, "Unable to create booking at the moment"),
    }
}

async fn get_booking(api: &BookingApi, request: &BookingRequest, call_id: &str) -> Envelope {
    let Some(lookup) = lookup_for(request) else {
        return Envelope::failure(
            BookingStatus::InvalidRequest,
            "Either job number or phone number is required",
        );
    };
    tracing::info!("→ [{}] Looking up booking by {:?}", call_id, lookup);

    match api.get_jobs(&lookup).await {
        Ok(result) => {
            tracing::info!("✓ [{}] Booking found", call_id);
            Envelope::success(BookingStatus::Found, result)
        }
        Err(err) if err.is_not_found() => {
            Envelope::failure(BookingStatus::NotFound, "Booking not found")
        }
        Err(err) => upstream_failure(err, call_id, "Unable to retrieve booking at the moment"),
    }
}

async fn update_booking(
    api: &BookingApi,
    defaults: &DispatchDefaults,
    request: &BookingRequest,
    call_id: &str,
) -> Envelope {
    if present(&request.job_no).is_none() {
        return Envelope::failure(
            BookingStatus::InvalidRequest,
            "Job number is required to update booking",
        );
    }
    let payload = build_update_payload(request, defaults);
    tracing::info!(
        "→ [{}] Updating booking {:?} with {} field(s)",
        call_id,
        request.job_no,
        payload.as_object().map(|m| m.len()).unwrap_or(0)
    );

    match api.update_job(&payload).await {
        Ok(result) => {
            tracing::info!("✓ [{}] Booking updated", call_id);
            Envelope::success(BookingStatus::Updated, result)
        }
        Err(err) => upstream_failure(err, call_id, "Unable to update booking at the moment"),
    }
}

async fn cancel_booking(
    api: &BookingApi,
    defaults: &DispatchDefaults,
    request: &BookingRequest,
    call_id: &str,
) -> Envelope {
    let Some(lookup) = lookup_for(request) else {
        return Envelope::failure(
            BookingStatus::InvalidRequest,
            "Either job number or phone number is required to cancel booking",
        );
    };
    tracing::info!("→ [{}] Cancelling booking by {:?}", call_id, lookup);

    match api.cancel_job(&lookup, defaults.company_id).await {
        Ok(body) => {
            if cancel::is_failure_text(&body) {
                tracing::warn!("✗ [{}] Cancel reply classified as not-found: {}", call_id, body);
                return Envelope::failure(BookingStatus::NotFound, "Booking not found");
            }
            tracing::info!("✓ [{}] Booking cancelled: {}", call_id, body);
            let echoed_ref = match &lookup {
                JobLookup::Reference(reference) => json!(reference),
                JobLookup::Phone(_) => json!(request.job_no),
            };
            Envelope::success(
                BookingStatus::Cancelled,
                json!({ "jobNO": echoed_ref, "result": body }),
            )
        }
        Err(err) => upstream_failure(err, call_id, "Unable to cancel booking at the moment"),
    }
}

async fn driver_location(api: &BookingApi, request: &BookingRequest, call_id: &str) -> Envelope {
    let Some(job_no) = present(&request.job_no) else {
        return Envelope::failure(
            BookingStatus::InvalidRequest,
            "Job number is required to get driver location",
        );
    };
    let reference = jobref::normalize(job_no);
    tracing::info!("→ [{}] Driver location for job {}", call_id, reference);

    match api.driver_location(&reference).await {
        Ok(location) => {
            tracing::info!("✓ [{}] Driver located", call_id);
            Envelope::success(
                BookingStatus::DriverLocated,
                json!({ "jobNO": reference, "location": location }),
            )
        }
        Err(err) if err.is_not_found() => Envelope::failure(
            BookingStatus::DriverNotFound,
            "Driver location not available or not assigned yet",
        ),
        Err(err) => upstream_failure(err, call_id, "Unable to get driver location at the moment"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::Status;
    use std::time::Duration;

    fn test_api() -> BookingApi {
        // Never reached by the short-circuit tests below
        BookingApi::new("http://127.0.0.1:9", "test-token", Duration::from_secs(1)).unwrap()
    }

    fn request(operation: &str) -> BookingRequest {
        BookingRequest {
            operation: operation.to_string(),
            ..BookingRequest::default()
        }
    }

    #[tokio::test]
    async fn test_missing_identifiers_short_circuit_without_upstream_call() {
        let api = test_api();
        let defaults = DispatchDefaults::default();

        for operation in ["getBooking", "updateBooking", "cancelBooking", "getDriverLocation"] {
            let envelope = dispatch(&api, &defaults, &request(operation), "call_test").await;
            assert_eq!(envelope.status, Status::Error, "{}", operation);
            assert_eq!(envelope.booking_status, BookingStatus::InvalidRequest, "{}", operation);
            assert!(envelope.data.is_none());
        }
    }

    #[tokio::test]
    async fn test_unrecognized_operation_tag() {
        let api = test_api();
        let envelope =
            dispatch(&api, &DispatchDefaults::default(), &request("orderPizza"), "call_test").await;
        assert_eq!(envelope.booking_status, BookingStatus::InvalidOperation);
    }

    #[test]
    fn test_lookup_prefers_normalized_reference() {
        let mut req = request("getBooking");
        req.job_no = Some("A2-62".to_string());
        req.phone = Some("07123456789".to_string());
        assert_eq!(lookup_for(&req), Some(JobLookup::Reference("A262".to_string())));

        req.job_no = None;
        assert_eq!(lookup_for(&req), Some(JobLookup::Phone("07123456789".to_string())));

        req.phone = Some("   ".to_string());
        assert_eq!(lookup_for(&req), None);
    }

    #[test]
    fn test_create_payload_vehicle_and_phone_fallback() {
        let mut req = request("cabBooking");
        req.vehicle_type_id = Some("luxury".to_string());
        req.passenger_name = Some("Ada Lovelace".to_string());
        req.origin = Some("10 Downing Street".to_string());
        req.destination = Some("221B Baker Street".to_string());

        let defaults = DispatchDefaults::default();
        let payload = build_create_payload(&req, &defaults);

        assert_eq!(payload["vehicleTypeId"], 71);
        assert_eq!(payload["passengerPhone"], defaults.fallback_phone.as_str());
        assert_eq!(payload["passengerMobile"], defaults.fallback_phone.as_str());
        assert_eq!(payload["jobNO"], "string");
        assert_eq!(payload["passengers"], 1);
        assert_eq!(payload["bags"], 0);
        assert_eq!(payload["customerPrice"], 0.0);
        assert_eq!(payload["companyId"], 99);
        assert_eq!(payload["jobSource"], 3);
    }

    #[test]
    fn test_create_payload_prefers_passenger_phone() {
        let mut req = request("cabBooking");
        req.phone = Some("02000000000".to_string());
        req.passenger_phone = Some("07123456789".to_string());

        let payload = build_create_payload(&req, &DispatchDefaults::default());
        assert_eq!(payload["passengerPhone"], "07123456789");
    }

    #[test]
    fn test_create_payload_defaults_non_numeric_counts() {
        let mut req = request("cabBooking");
        req.passengers = Some("a few".to_string());
        req.bags = Some("two suitcases".to_string());
        req.customer_price = Some("twenty".to_string());

        let payload = build_create_payload(&req, &DispatchDefaults::default());
        assert_eq!(payload["passengers"], 1);
        assert_eq!(payload["bags"], 0);
        assert_eq!(payload["customerPrice"], 0.0);
    }

    #[test]
    fn test_create_payload_parses_numeric_strings() {
        let mut req = request("cabBooking");
        req.passengers = Some("4".to_string());
        req.bags = Some("2".to_string());
        req.customer_price = Some("25.50".to_string());

        let payload = build_create_payload(&req, &DispatchDefaults::default());
        assert_eq!(payload["passengers"], 4);
        assert_eq!(payload["bags"], 2);
        assert_eq!(payload["customerPrice"], 25.5);
        assert_eq!(payload["driverPrice"], 25.5);
    }

    #[test]
    fn test_update_payload_is_sparse() {
        let mut req = request("updateBooking");
        req.job_no = Some("A262".to_string());
        req.date = Some("2026-08-07T10:00:00Z".to_string());

        let payload = build_update_payload(&req, &DispatchDefaults::default());
        let fields = payload.as_object().unwrap();

        assert_eq!(fields["id"], "A262");
        assert_eq!(fields["companyId"], 99);
        assert_eq!(fields["date"], "2026-08-07T10:00:00Z");
        assert!(!fields.contains_key("passengerName"));
        assert!(!fields.contains_key("origin"));
        assert!(!fields.contains_key("note"));
        assert!(!fields.contains_key("passengers"));
    }

    #[test]
    fn test_update_payload_drops_non_numeric_passengers() {
        let mut req = request("updateBooking");
        req.job_no = Some("A262".to_string());
        req.passengers = Some("several".to_string());

        let payload = build_update_payload(&req, &DispatchDefaults::default());
        assert!(!payload.as_object().unwrap().contains_key("passengers"));

        req.passengers = Some("3".to_string());
        let payload = build_update_payload(&req, &DispatchDefaults::default());
        assert_eq!(payload["passengers"], 3);
    }
}

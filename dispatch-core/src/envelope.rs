/// Uniform response envelope for every booking operation
/// The conversational layer reasons about `status` + `booking_status`
/// pairs, never about upstream HTTP codes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Found,
    Updated,
    Cancelled,
    NotFound,
    DriverLocated,
    DriverNotFound,
    InvalidRequest,
    InvalidOperation,
    ApiError,
    SystemError,
}

impl BookingStatus {
    /// Whether this tag sits on the failure side of the taxonomy.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            BookingStatus::NotFound
                | BookingStatus::DriverNotFound
                | BookingStatus::InvalidRequest
                | BookingStatus::InvalidOperation
                | BookingStatus::ApiError
                | BookingStatus::SystemError
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub status: Status,
    pub booking_status: BookingStatus,
    pub error: Option<String>,
    pub data: Option<Value>,
}

impl Envelope {
    pub fn success(booking_status: BookingStatus, data: Value) -> Self {
        Self {
            status: Status::Success,
            booking_status,
            error: None,
            data: Some(data),
        }
    }

    /// Failure envelopes carry no data; the not-found cases legitimately
    /// answer with `data: null`.
    pub fn failure(booking_status: BookingStatus, error: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            booking_status,
            error: Some(error.into()),
            data: None,
        }
    }
}

/// Inbound wire types for the three agent-facing tools
/// Field names follow the agent-side tool contract, hence the mixed casing.

use serde::{Deserialize, Serialize};

use crate::address::RawAddressLines;

/// The five operations multiplexed through the booking tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingOperation {
    Create,
    Get,
    Update,
    Cancel,
    DriverLocation,
}

impl BookingOperation {
    /// Operation tags as they appear on the wire.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "cabBooking" => Some(BookingOperation::Create),
            "getBooking" => Some(BookingOperation::Get),
            "updateBooking" => Some(BookingOperation::Update),
            "cancelBooking" => Some(BookingOperation::Cancel),
            "getDriverLocation" => Some(BookingOperation::DriverLocation),
            _ => None,
        }
    }
}

/// Tool invocation for the booking multiplex endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingRequest {
    pub operation: String,
    #[serde(rename = "companyId")]
    pub company_id: Option<String>,
    #[serde(rename = "jobNO")]
    pub job_no: Option<String>,
    #[serde(rename = "Phone")]
    pub phone: Option<String>,
    #[serde(rename = "passengerName")]
    pub passenger_name: Option<String>,
    #[serde(rename = "passengerEmail")]
    pub passenger_email: Option<String>,
    #[serde(rename = "passengerPhone")]
    pub passenger_phone: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "vehicleTypeId")]
    pub vehicle_type_id: Option<String>,
    #[serde(rename = "customerPrice")]
    pub customer_price: Option<String>,
    pub passengers: Option<String>,
    pub bags: Option<String>,
    pub note: Option<String>,
}

/// Address validation tool input. `address_lines` arrives in whatever
/// shape the model produced; see [`RawAddressLines`].
#[derive(Debug, Clone, Deserialize)]
pub struct AddressValidationRequest {
    pub address_lines: RawAddressLines,
    pub postcode: Option<String>,
    pub building: Option<String>,
}

/// Pricing tool input. Both addresses are opaque strings; no geocoding
/// happens on this side.
#[derive(Debug, Clone, Deserialize)]
pub struct PricingRequest {
    #[serde(rename = "sourceAddress")]
    pub source_address: String,
    #[serde(rename = "destinationAddress")]
    pub destination_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_tags() {
        assert_eq!(BookingOperation::parse("cabBooking"), Some(BookingOperation::Create));
        assert_eq!(BookingOperation::parse("getBooking"), Some(BookingOperation::Get));
        assert_eq!(BookingOperation::parse("updateBooking"), Some(BookingOperation::Update));
        assert_eq!(BookingOperation::parse("cancelBooking"), Some(BookingOperation::Cancel));
        assert_eq!(
            BookingOperation::parse("getDriverLocation"),
            Some(BookingOperation::DriverLocation)
        );
        assert_eq!(BookingOperation::parse("orderPizza"), None);
        assert_eq!(BookingOperation::parse("CABBOOKING"), None);
    }

    #[test]
    fn test_booking_request_wire_names() {
        let request: BookingRequest = serde_json::from_value(json!({
            "operation": "getBooking",
            "jobNO": "A2-62",
            "Phone": "07123456789",
            "passengerName": "Ada",
            "vehicleTypeId": "mpv"
        }))
        .unwrap();

        assert_eq!(request.operation, "getBooking");
        assert_eq!(request.job_no.as_deref(), Some("A2-62"));
        assert_eq!(request.phone.as_deref(), Some("07123456789"));
        assert_eq!(request.passenger_name.as_deref(), Some("Ada"));
        assert_eq!(request.vehicle_type_id.as_deref(), Some("mpv"));
        assert!(request.passengers.is_none());
    }

    #[test]
    fn test_pricing_request_requires_both_addresses() {
        let missing: Result<PricingRequest, _> =
            serde_json::from_value(json!({ "sourceAddress": "A" }));
        assert!(missing.is_err());
    }
}

/// Core decision logic for the cab booking dispatch gateway
/// Pure request/response normalization; no I/O lives in this crate.

pub mod address;
pub mod cancel;
pub mod defaults;
pub mod envelope;
pub mod jobref;
pub mod request;
pub mod vehicle;

pub use address::{AddressError, AddressLine, RawAddressLines, ValidationMode};
pub use defaults::DispatchDefaults;
pub use envelope::{BookingStatus, Envelope, Status};
pub use request::{AddressValidationRequest, BookingOperation, BookingRequest, PricingRequest};
pub use vehicle::VehicleClass;

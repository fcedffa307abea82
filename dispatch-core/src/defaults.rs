/// Fixed fallback values the dispatcher substitutes into upstream payloads,
/// passed in as one record at construction.

#[derive(Debug, Clone)]
pub struct DispatchDefaults {
    /// Company identifier sent with every vendor call
    pub company_id: u32,
    /// Phone number used when the caller supplied none; a booking must
    /// never fail solely for lack of a phone number
    pub fallback_phone: String,
    /// Placeholder reference sent on create; the real one is assigned
    /// upstream and read back from the response
    pub placeholder_job_ref: String,
    /// Vendor channel identifier for bookings made through this gateway
    pub job_source: u32,
}

impl Default for DispatchDefaults {
    fn default() -> Self {
        Self {
            company_id: 99,
            fallback_phone: "03000000000".to_string(),
            placeholder_job_ref: "string".to_string(),
            job_source: 3,
        }
    }
}

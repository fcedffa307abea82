/// Fixed vehicle classes the booking vendor identifies by small integer codes

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleClass {
    Standard,
    Estate,
    Mpv,
    Luxury,
}

impl VehicleClass {
    pub fn id(self) -> u32 {
        match self {
            VehicleClass::Standard => 68,
            VehicleClass::Estate => 69,
            VehicleClass::Mpv => 70,
            VehicleClass::Luxury => 71,
        }
    }

    /// Resolve a free-form selection token, case-insensitively.
    /// Unrecognized or absent tokens fall back to the standard class,
    /// silently: the vehicle choice was already confirmed
    /// conversationally before the booking call.
    pub fn resolve(token: Option<&str>) -> Self {
        let lowered = token.map(|t| t.trim().to_lowercase());
        match lowered.as_deref() {
            Some("standard") => VehicleClass::Standard,
            Some("estate") => VehicleClass::Estate,
            Some("mpv") => VehicleClass::Mpv,
            Some("luxury") | Some("executive") => VehicleClass::Luxury,
            _ => VehicleClass::Standard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_is_case_insensitive() {
        assert_eq!(VehicleClass::resolve(Some("MPV")), VehicleClass::Mpv);
        assert_eq!(VehicleClass::resolve(Some("mpv")), VehicleClass::Mpv);
        assert_eq!(VehicleClass::resolve(Some("Luxury")), VehicleClass::Luxury);
        assert_eq!(VehicleClass::resolve(Some("ESTATE")), VehicleClass::Estate);
    }

    #[test]
    fn test_executive_is_a_luxury_synonym() {
        assert_eq!(
            VehicleClass::resolve(Some("executive")),
            VehicleClass::resolve(Some("luxury"))
        );
        assert_eq!(VehicleClass::resolve(Some("executive")).id(), 71);
    }

    #[test]
    fn test_unrecognized_and_absent_default_to_standard() {
        assert_eq!(VehicleClass::resolve(Some("")), VehicleClass::Standard);
        assert_eq!(VehicleClass::resolve(None), VehicleClass::Standard);
        assert_eq!(VehicleClass::resolve(Some("hovercraft")), VehicleClass::Standard);
    }

    #[test]
    fn test_vendor_ids() {
        assert_eq!(VehicleClass::Standard.id(), 68);
        assert_eq!(VehicleClass::Estate.id(), 69);
        assert_eq!(VehicleClass::Mpv.id(), 70);
        assert_eq!(VehicleClass::Luxury.id(), 71);
    }
}

/// Cancel-response classification
/// The vendor's cancel endpoint replies with free text rather than a
/// structured code, so success has to be inferred from the body. The
/// marker list lives in one place: an upstream wording change must be
/// a one-line update here.

const FAILURE_MARKERS: [&str; 3] = ["not found", "notfound", "error"];

/// True when the cancel body indicates the booking was not cancelled.
pub fn is_failure_text(body: &str) -> bool {
    let lowered = body.to_lowercase();
    FAILURE_MARKERS.iter().any(|marker| lowered.contains(marker))
}

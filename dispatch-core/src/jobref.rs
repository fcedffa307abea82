/// Job-reference normalization
/// Booking references are displayed to callers with visual separators
/// ("A2-62") but the vendor stores and looks them up unseparated.

/// Strip separator characters so the reference matches the vendor's
/// storage format. Idempotent.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

//! UUID utilities
//!
//! Record identifiers (users, entries, analyses) are UUIDv4 stored as text.

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Generate a new record identifier in its stored (hyphenated) form
pub fn new_id() -> String {
    generate().to_string()
}

/// Parse UUID from string
pub fn parse(s: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(s)
}

/// Whether `s` is a well-formed record identifier
pub fn is_valid_id(s: &str) -> bool {
    parse(s).is_ok()
}

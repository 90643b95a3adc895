//! Identifier generation for tasks submitted without an explicit identifier.

use uuid::Uuid;

/// Generate an opaque task identifier.
///
/// Identifiers are random v4 UUIDs, unique across calls with overwhelming
/// probability. Caller-supplied identifiers always take precedence over
/// generated ones; this is only the fallback for bare submissions.
pub fn generate() -> String {
    Uuid::new_v4().to_string()
}

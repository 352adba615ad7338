//! Constant-time comparison for the admin PIN.

/// Constant-time string comparison to prevent timing attacks.
///
/// Length is not hidden; every byte of equal-length inputs is compared.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

//! Number formatting shared by the report and the advisory text.

use super::config::{BYTE_UNITS, BYTE_UNIT_BASE, BYTE_UNIT_THRESHOLD};

/// Format a byte count for humans
///
/// **Public** - used for size tables and the SCOREP_TOTAL_MEMORY hint
///
/// Divides by 1024 while the value exceeds 4096, then rounds up by one.
/// The unit is appended without a separator, e.g. `501bytes` or `1025kB`.
pub fn readable_bytes(bytes: u64) -> String {
    let mut value = bytes;
    let mut exp = 0usize;
    while value > BYTE_UNIT_THRESHOLD {
        value /= BYTE_UNIT_BASE;
        exp += 1;
    }
    // round up
    value += 1;

    // u64 tops out at EB, the clamp only guards the table
    let unit = BYTE_UNITS[exp.min(BYTE_UNITS.len() - 1)];
    format!("{}{}", value, unit)
}

/// Format an integer with thousands separators
///
/// **Public** - used by the score report columns
pub fn number_with_commas(number: u64) -> String {
    let digits = number.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result
}

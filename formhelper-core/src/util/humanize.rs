//! src/util/humanize.rs
//!
//! Binary (1024-based) size formatting used by pickers, aggregates and
//! violation messages.

const KILOBYTE: f64 = 1024.0;

const BYTE_UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Index into [`BYTE_UNITS`] for `size`, saturating at the last unit.
///
/// Computed with integer division so exact powers of 1024 never land one unit
/// short because of floating point log error.
fn unit_index(size: u128) -> usize {
    let mut index: usize = 0;
    let mut rest: u128 = size;

    while rest >= 1024 && index < BYTE_UNITS.len() - 1 {
        rest /= 1024;
        index += 1;
    }

    index
}

/// Format a byte count as `"<value> <unit>"` with exactly two decimals.
///
/// `format_bytes(0u64) == "0.00 Bytes"`, `format_bytes(1536u64) == "1.50 KB"`.
/// Inputs past the yottabyte range stay in `YB`.
#[must_use]
pub fn format_bytes<T: Into<u128>>(size: T) -> String {
    let size: u128 = size.into();
    let index: usize = unit_index(size);

    #[expect(
        clippy::cast_precision_loss,
        reason = "Display value only needs two decimals"
    )]
    let value: f64 = size as f64 / KILOBYTE.powi(index as i32);

    format!("{value:.2} {}", BYTE_UNITS[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_and_small_sizes() {
        assert_eq!(format_bytes(0u64), "0.00 Bytes");
        assert_eq!(format_bytes(1u64), "1.00 Bytes");
        assert_eq!(format_bytes(1000u64), "1000.00 Bytes");
        assert_eq!(format_bytes(1023u64), "1023.00 Bytes");
    }

    #[test]
    fn test_unit_boundaries() {
        assert_eq!(format_bytes(1024u64), "1.00 KB");
        assert_eq!(format_bytes(1536u64), "1.50 KB");
        assert_eq!(format_bytes(10u64 * 1024 * 1024), "10.00 MB");
        assert_eq!(format_bytes(1024u64.pow(3)), "1.00 GB");
        assert_eq!(format_bytes(u64::MAX), "16.00 EB");
    }

    #[test]
    fn test_saturates_at_yottabytes() {
        assert_eq!(format_bytes(1024u128.pow(8)), "1.00 YB");
        assert_eq!(format_bytes(1024u128.pow(9)), "1024.00 YB");
        // Far beyond the table must not index past it
        assert!(format_bytes(u128::MAX).ends_with(" YB"));
    }
}

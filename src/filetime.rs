//! FILETIME interval decoding
//!
//! `pKIExpirationPeriod` and `pKIOverlapPeriod` hold a relative FILETIME:
//! eight little-endian bytes counting 100ns ticks. The bit pattern is
//! read as an unsigned magnitude, sign and all.

use crate::common_types::to_hex;

const TICKS_PER_SECOND: f64 = 10_000_000.0;
const SECONDS_PER_HOUR: f64 = 3_600.0;
const SECONDS_PER_DAY: f64 = 86_400.0;
const SECONDS_PER_YEAR: f64 = 31_536_000.0;

/// Renders an 8-byte FILETIME interval as years, days or hours.
///
/// Zero ticks means "Never". Input that is not exactly eight bytes is
/// rendered as hex instead.
pub fn decode_interval(bytes: &[u8]) -> String {
    match interval_ticks(bytes) {
        Some(0) => "Never".to_string(),
        Some(ticks) => format_ticks(ticks),
        None => to_hex(bytes),
    }
}

/// Raw tick count, unsigned little-endian
fn interval_ticks(bytes: &[u8]) -> Option<u64> {
    let raw: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_le_bytes(raw))
}

fn format_ticks(ticks: u64) -> String {
    let seconds = ticks as f64 / TICKS_PER_SECOND;
    if seconds > SECONDS_PER_YEAR {
        format!("{:.1} years", seconds / SECONDS_PER_YEAR)
    } else if seconds > SECONDS_PER_DAY {
        format!("{:.1} days", seconds / SECONDS_PER_DAY)
    } else {
        format!("{:.1} hours", seconds / SECONDS_PER_HOUR)
    }
}

//! Reference number generation.
//!
//! A reference number is 17 characters of `[0-9A-Z]`: nine base-36 digits of
//! the UTC millisecond timestamp followed by eight base-36 digits drawn from
//! the OS CSPRNG. No central counter is consulted, so concurrent submissions
//! never contend, and numbers sort by creation time.

use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, RngCore};

use crate::core::error::{AppError, Result};

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const TIMESTAMP_DIGITS: usize = 9;
const RANDOM_DIGITS: usize = 8;

pub const REFERENCE_NUMBER_LEN: usize = TIMESTAMP_DIGITS + RANDOM_DIGITS;

/// Generate a fresh reference number.
///
/// Fails only when the entropy source is unavailable.
pub fn generate() -> Result<String> {
    generate_at(Utc::now())
}

fn generate_at(now: DateTime<Utc>) -> Result<String> {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);

    let mut entropy = [0u8; 8];
    OsRng
        .try_fill_bytes(&mut entropy)
        .map_err(|e| AppError::Internal(format!("Entropy source unavailable: {}", e)))?;
    let random = u64::from_le_bytes(entropy) % 36u64.pow(RANDOM_DIGITS as u32);

    let mut out = String::with_capacity(REFERENCE_NUMBER_LEN);
    push_base36(&mut out, millis, TIMESTAMP_DIGITS);
    push_base36(&mut out, random, RANDOM_DIGITS);
    Ok(out)
}

/// Append `value` as exactly `width` base-36 digits (high digits dropped)
fn push_base36(out: &mut String, mut value: u64, width: usize) {
    let mut digits = [b'0'; 13];
    for slot in digits[..width].iter_mut().rev() {
        *slot = ALPHABET[(value % 36) as usize];
        value /= 36;
    }
    out.extend(digits[..width].iter().map(|&b| b as char));
}

/// Canonical form used for every lookup: trimmed and upper-cased
pub fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

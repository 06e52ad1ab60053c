//! Credential gate for inbound requests

use log::warn;

use crate::config::Config;
use crate::errors::{Result, ServiceError};

/// Name of the header carrying the shared secret
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Check a presented credential against the configured secret.
///
/// The comparison time does not depend on where the first mismatching byte
/// sits, so the secret cannot be probed position by position. Rejections are
/// logged without the presented value.
pub fn authenticate(presented: Option<&str>, config: &Config) -> Result<()> {
    match presented {
        Some(key) if constant_time_eq(key.as_bytes(), config.api_key.as_bytes()) => Ok(()),
        Some(_) => {
            warn!("Rejected request with incorrect API key");
            Err(ServiceError::Auth)
        }
        None => {
            warn!("Rejected request with no API key");
            Err(ServiceError::Auth)
        }
    }
}

/// Byte-wise equality with a single accumulated difference, no early exit.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

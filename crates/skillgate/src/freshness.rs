//! Application binding and timestamp freshness checks.
//!
//! Independent of certificate and signature verification; composed on top of
//! a dispatcher by [`crate::strict::StrictHandler`].

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::warn;

use crate::envelope::RequestEnvelope;
use crate::error::ValidationError;

/// Check that the envelope is addressed to `expected_id`.
///
/// An empty id and a different id are distinct failures.
pub fn validate_application_id(
    envelope: &RequestEnvelope,
    expected_id: &str,
) -> Result<(), ValidationError> {
    let actual = envelope.application_id();
    if actual.is_empty() {
        warn!("request carries no application id");
        return Err(ValidationError::ApplicationIdMissing);
    }
    if actual != expected_id {
        warn!(actual = %actual, "request application id mismatch");
        return Err(ValidationError::ApplicationIdMismatch {
            actual: actual.to_string(),
        });
    }
    Ok(())
}

/// Check that the request timestamp is within `max_skew` of `now`.
///
/// The timestamp must be RFC 3339. Exactly `max_skew` apart is accepted, in
/// either direction.
pub fn validate_timestamp(
    envelope: &RequestEnvelope,
    now: DateTime<Utc>,
    max_skew: Duration,
) -> Result<(), ValidationError> {
    let raw = &envelope.request.timestamp;
    let timestamp = DateTime::parse_from_rfc3339(raw)
        .map_err(|e| ValidationError::InvalidTimestamp {
            value: raw.clone(),
            reason: e.to_string(),
        })?
        .with_timezone(&Utc);

    let skew = now.signed_duration_since(timestamp);
    let max = TimeDelta::from_std(max_skew).unwrap_or(TimeDelta::MAX);
    if skew.abs() > max {
        warn!(
            timestamp = %timestamp,
            skew_ms = skew.num_milliseconds(),
            max_secs = max_skew.as_secs(),
            "request timestamp outside clock skew tolerance"
        );
        return Err(ValidationError::StaleTimestamp {
            timestamp: raw.clone(),
            skew_ms: skew.num_milliseconds(),
            max_secs: max_skew.as_secs(),
        });
    }
    Ok(())
}

// Error taxonomy for remote faults and local failures
//
// The server reports failures as numeric codes inside the response body.
// A small closed set of codes maps to `FaultKind` variants the retry policy
// refuses to retry, so calling code can branch on them ("not enough fuel"
// vs. "waypoint already charted"). Everything else is `Unclassified` and
// stays retryable with backoff.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Network-level failure (connect, timeout, malformed response).
    #[error("transport failure: {0}")]
    Transport(String),

    /// A fault reported by the server, classified by its numeric code.
    #[error("{kind} (code {}): {}", .fault.code, .fault.message)]
    Fault { kind: FaultKind, fault: ApiFault },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// Locally-detected precondition violation: the mode string does not
    /// name a known flight mode.
    #[error("{0} is not a recognized flight mode")]
    InvalidFlightMode(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

impl Error {
    pub fn fault_kind(&self) -> Option<FaultKind> {
        match self {
            Error::Fault { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_insufficient_fuel(&self) -> bool {
        self.fault_kind() == Some(FaultKind::InsufficientFuel)
    }

    /// Builds the typed insufficient-fuel fault the autopilot raises when a
    /// ship is proven unable to complete its route.
    pub(crate) fn insufficient_fuel(message: impl Into<String>) -> Self {
        Error::Fault {
            kind: FaultKind::InsufficientFuel,
            fault: ApiFault {
                code: 4203,
                message: message.into(),
                data: FaultData::default(),
            },
        }
    }
}

/// Closed set of classified server fault codes.
///
/// Codes follow the remote API's numbering; anything unmapped lands in
/// `Unclassified` and remains eligible for retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    CooldownConflict,
    NavigateInTransit,
    InvalidDestination,
    OutsideSystem,
    InsufficientFuel,
    SameDestination,
    SurveyExpired,
    SurveyExhausted,
    RefuelRequiresDock,
    RefuelInvalidWaypoint,
    CargoFull,
    AlreadyCharted,
    NotInOrbit,
    NotDocked,
    MarketNotFound,
    Unclassified,
}

impl FaultKind {
    pub fn from_code(code: i64) -> Self {
        match code {
            4000 => FaultKind::CooldownConflict,
            4200 => FaultKind::NavigateInTransit,
            4201 => FaultKind::InvalidDestination,
            4202 => FaultKind::OutsideSystem,
            4203 => FaultKind::InsufficientFuel,
            4204 => FaultKind::SameDestination,
            4221 => FaultKind::SurveyExpired,
            4224 => FaultKind::SurveyExhausted,
            4225 => FaultKind::RefuelRequiresDock,
            4226 => FaultKind::RefuelInvalidWaypoint,
            4228 => FaultKind::CargoFull,
            4230 => FaultKind::AlreadyCharted,
            4236 => FaultKind::NotInOrbit,
            4244 => FaultKind::NotDocked,
            4603 => FaultKind::MarketNotFound,
            _ => FaultKind::Unclassified,
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FaultKind::CooldownConflict => "cooldown conflict",
            FaultKind::NavigateInTransit => "ship in transit",
            FaultKind::InvalidDestination => "invalid destination",
            FaultKind::OutsideSystem => "destination outside system",
            FaultKind::InsufficientFuel => "insufficient fuel",
            FaultKind::SameDestination => "already at destination",
            FaultKind::SurveyExpired => "survey expired",
            FaultKind::SurveyExhausted => "survey exhausted",
            FaultKind::RefuelRequiresDock => "refuel requires docking",
            FaultKind::RefuelInvalidWaypoint => "waypoint sells no fuel",
            FaultKind::CargoFull => "cargo full",
            FaultKind::AlreadyCharted => "waypoint already charted",
            FaultKind::NotInOrbit => "ship not in orbit",
            FaultKind::NotDocked => "ship not docked",
            FaultKind::MarketNotFound => "market not found",
            FaultKind::Unclassified => "unclassified fault",
        };
        f.write_str(name)
    }
}

/// The decoded `error` object of a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiFault {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: FaultData,
}

/// Structured payload some faults carry. The retry policy consults the wait
/// hints here to pick its sleep duration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FaultData {
    pub cooldown: Option<CooldownHint>,
    pub seconds_to_arrival: Option<f64>,
    pub retry_after: Option<f64>,
    pub remaining_seconds: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownHint {
    #[serde(default)]
    pub remaining_seconds: f64,
}

impl FaultData {
    /// Remaining cooldown reported inside the fault, if any.
    pub fn cooldown_remaining(&self) -> Option<Duration> {
        self.cooldown
            .as_ref()
            .filter(|c| c.remaining_seconds > 0.0)
            .map(|c| Duration::from_secs_f64(c.remaining_seconds))
    }

    /// The largest of the flat wait hints (arrival, retry-after, remaining).
    pub fn wait_hint(&self) -> Option<Duration> {
        let wait = self
            .seconds_to_arrival
            .unwrap_or(0.0)
            .max(self.retry_after.unwrap_or(0.0))
            .max(self.remaining_seconds.unwrap_or(0.0));
        (wait > 0.0).then(|| Duration::from_secs_f64(wait))
    }
}

/// Classifies a non-success response body into a typed fault.
pub(crate) fn classify_fault(status: u16, body: &serde_json::Value) -> Error {
    let fault = body
        .get("error")
        .cloned()
        .and_then(|value| serde_json::from_value::<ApiFault>(value).ok())
        .unwrap_or_else(|| ApiFault {
            code: i64::from(status),
            message: format!("request failed with status {status}"),
            data: FaultData::default(),
        });
    let kind = FaultKind::from_code(fault.code);
    Error::Fault { kind, fault }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_known_codes() {
        assert_eq!(FaultKind::from_code(4000), FaultKind::CooldownConflict);
        assert_eq!(FaultKind::from_code(4203), FaultKind::InsufficientFuel);
        assert_eq!(FaultKind::from_code(4230), FaultKind::AlreadyCharted);
        assert_eq!(FaultKind::from_code(9999), FaultKind::Unclassified);
    }

    #[test]
    fn classifies_error_body() {
        let body = json!({
            "error": {
                "message": "Ship is currently in-transit.",
                "code": 4200,
                "data": {"secondsToArrival": 12.5}
            }
        });
        let err = classify_fault(400, &body);
        assert_eq!(err.fault_kind(), Some(FaultKind::NavigateInTransit));
        match err {
            Error::Fault { fault, .. } => {
                assert_eq!(fault.code, 4200);
                assert_eq!(fault.data.wait_hint(), Some(Duration::from_secs_f64(12.5)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn falls_back_to_status_when_body_is_opaque() {
        let err = classify_fault(502, &json!("bad gateway"));
        assert_eq!(err.fault_kind(), Some(FaultKind::Unclassified));
    }

    #[test]
    fn cooldown_hint_beats_nothing() {
        let data: FaultData = serde_json::from_value(json!({
            "cooldown": {"remainingSeconds": 42.0}
        }))
        .unwrap();
        assert_eq!(data.cooldown_remaining(), Some(Duration::from_secs(42)));
        assert_eq!(data.wait_hint(), None);
    }
}

//! Phone call model
//!
//! Represents a phone call resource tracked through its lifecycle and exposed
//! through the provider-compatible REST contract.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// API version segment used in resource URIs and serialized responses
pub const API_VERSION: &str = "2010-04-01";

/// Call lifecycle state
///
/// `Initiating` and `InProgress` are transient: calls are expected to leave
/// them quickly, and stale ones are swept to `Expired` by the hourly expiry
/// workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    /// Call resource created, outbound leg not yet started
    #[default]
    Initiating,
    /// Outbound leg handed to the carrier
    Initiated,
    /// Remote party is being alerted
    Ringing,
    /// Call was answered and is ongoing
    InProgress,
    /// Call finished normally
    Completed,
    /// Remote party was busy
    Busy,
    /// Carrier reported a failure
    Failed,
    /// Remote party did not answer
    NotAnswered,
    /// Call was canceled before connecting
    Canceled,
    /// Call sat in a transient state past the staleness threshold
    Expired,
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallState::Initiating => write!(f, "initiating"),
            CallState::Initiated => write!(f, "initiated"),
            CallState::Ringing => write!(f, "ringing"),
            CallState::InProgress => write!(f, "in_progress"),
            CallState::Completed => write!(f, "completed"),
            CallState::Busy => write!(f, "busy"),
            CallState::Failed => write!(f, "failed"),
            CallState::NotAnswered => write!(f, "not_answered"),
            CallState::Canceled => write!(f, "canceled"),
            CallState::Expired => write!(f, "expired"),
        }
    }
}

impl CallState {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "initiating" => Some(CallState::Initiating),
            "initiated" => Some(CallState::Initiated),
            "ringing" => Some(CallState::Ringing),
            "in_progress" => Some(CallState::InProgress),
            "completed" => Some(CallState::Completed),
            "busy" => Some(CallState::Busy),
            "failed" => Some(CallState::Failed),
            "not_answered" => Some(CallState::NotAnswered),
            "canceled" => Some(CallState::Canceled),
            "expired" => Some(CallState::Expired),
            _ => None,
        }
    }

    /// Check if the state is transient (eligible for expiry sweeps)
    pub fn is_transient(&self) -> bool {
        matches!(self, CallState::Initiating | CallState::InProgress)
    }

    /// Check if the call has reached a final state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CallState::Completed
                | CallState::Busy
                | CallState::Failed
                | CallState::NotAnswered
                | CallState::Canceled
                | CallState::Expired
        )
    }

    /// Map the internal state onto the public provider status vocabulary.
    ///
    /// External consumers never see internal state names; `expired` calls
    /// surface as `failed`.
    pub fn twilio_status(&self) -> &'static str {
        match self {
            CallState::Initiating | CallState::Initiated => "queued",
            CallState::Ringing => "ringing",
            CallState::InProgress => "in-progress",
            CallState::Completed => "completed",
            CallState::Busy => "busy",
            CallState::Failed | CallState::Expired => "failed",
            CallState::NotAnswered => "no-answer",
            CallState::Canceled => "canceled",
        }
    }
}

/// Phone call entity
///
/// Lifecycle:
/// 1. Created by the call-initiation path in `Initiating`
/// 2. Advanced by the live call-handling path (ringing, answered, completed)
/// 3. Stale transient calls are moved to `Expired` by the expiry workflows
/// 4. Never deleted; retained for history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneCall {
    /// Internal surrogate key, never exposed through the API
    pub id: i64,

    /// Stable external identifier (`CA` + 32 hex chars)
    pub sid: String,

    /// Owning account SID
    pub account_sid: String,

    /// SID of the parent call leg, if any
    pub parent_call_sid: Option<String>,

    /// Destination number
    pub to: String,

    /// Originating number
    pub from: String,

    /// SID of the provisioned number used for the call
    pub phone_number_sid: Option<String>,

    /// Current lifecycle state
    pub state: CallState,

    /// Call direction (inbound, outbound-api, outbound-dial)
    pub direction: String,

    /// When the call was answered/started
    pub start_time: Option<DateTime<Utc>>,

    /// When the call ended
    pub end_time: Option<DateTime<Utc>>,

    /// Call duration in seconds, set once the call ends
    pub duration: Option<i32>,

    /// Charged price, set once billing has run
    pub price: Option<Decimal>,

    /// Currency of `price`
    pub price_unit: Option<String>,

    /// External-facing creation timestamp
    pub date_created: DateTime<Utc>,

    /// External-facing last-modification timestamp; refreshed by every state
    /// transition, including expiry
    pub date_updated: DateTime<Utc>,

    /// Internal audit column, never exposed through the API
    pub created_at: DateTime<Utc>,

    /// Internal audit column, never exposed through the API
    pub updated_at: DateTime<Utc>,
}

impl PhoneCall {
    /// Create a new call in `Initiating` state
    pub fn new(account_sid: String, to: String, from: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            sid: Self::generate_sid(),
            account_sid,
            parent_call_sid: None,
            to,
            from,
            phone_number_sid: None,
            state: CallState::Initiating,
            direction: "outbound-api".to_string(),
            start_time: None,
            end_time: None,
            duration: None,
            price: None,
            price_unit: None,
            date_created: now,
            date_updated: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Generate a provider-style call SID (`CA` + 32 hex chars)
    pub fn generate_sid() -> String {
        format!("CA{}", Uuid::new_v4().simple())
    }

    /// Canonical external locator for this resource
    pub fn uri(&self) -> String {
        format!(
            "/{}/Accounts/{}/Calls/{}.json",
            API_VERSION, self.account_sid, self.sid
        )
    }

    /// Check if the call is in a transient state
    #[inline]
    pub fn is_transient(&self) -> bool {
        self.state.is_transient()
    }

    /// Check if the call has been updated before the given cutoff
    pub fn is_stale(&self, cutoff: DateTime<Utc>) -> bool {
        self.date_updated <= cutoff
    }
}

impl Default for PhoneCall {
    fn default() -> Self {
        Self::new(
            format!("AC{}", Uuid::new_v4().simple()),
            String::new(),
            String::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_state_roundtrip() {
        for state in [
            CallState::Initiating,
            CallState::InProgress,
            CallState::Completed,
            CallState::Expired,
        ] {
            assert_eq!(CallState::from_str(&state.to_string()), Some(state));
        }
        assert_eq!(CallState::from_str("bogus"), None);
    }

    #[test]
    fn test_transient_states() {
        assert!(CallState::Initiating.is_transient());
        assert!(CallState::InProgress.is_transient());
        assert!(!CallState::Completed.is_transient());
        assert!(!CallState::Expired.is_transient());
    }

    #[test]
    fn test_terminal_states() {
        assert!(CallState::Expired.is_terminal());
        assert!(CallState::Completed.is_terminal());
        assert!(!CallState::Ringing.is_terminal());
        assert!(!CallState::Initiating.is_terminal());
    }

    #[test]
    fn test_twilio_status_mapping() {
        assert_eq!(CallState::Initiating.twilio_status(), "queued");
        assert_eq!(CallState::InProgress.twilio_status(), "in-progress");
        assert_eq!(CallState::NotAnswered.twilio_status(), "no-answer");
        assert_eq!(CallState::Expired.twilio_status(), "failed");
    }

    #[test]
    fn test_generate_sid() {
        let sid = PhoneCall::generate_sid();
        assert!(sid.starts_with("CA"));
        assert_eq!(sid.len(), 34);
        assert!(sid[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_uri() {
        let mut call = PhoneCall::new(
            "AC00000000000000000000000000000001".to_string(),
            "+14155551234".to_string(),
            "+14155556789".to_string(),
        );
        call.sid = "CA00000000000000000000000000000002".to_string();

        assert_eq!(
            call.uri(),
            "/2010-04-01/Accounts/AC00000000000000000000000000000001\
             /Calls/CA00000000000000000000000000000002.json"
        );
    }

    #[test]
    fn test_new_call_starts_initiating() {
        let call = PhoneCall::new(
            "AC123".to_string(),
            "+14155551234".to_string(),
            "+14155556789".to_string(),
        );
        assert_eq!(call.state, CallState::Initiating);
        assert!(call.is_transient());
        assert_eq!(call.date_created, call.date_updated);
    }

    #[test]
    fn test_is_stale() {
        let mut call = PhoneCall::default();
        call.date_updated = Utc::now() - Duration::hours(2);

        assert!(call.is_stale(Utc::now() - Duration::hours(1)));
        assert!(!call.is_stale(Utc::now() - Duration::hours(3)));
    }
}

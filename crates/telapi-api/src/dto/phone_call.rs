//! Phone call DTOs
//!
//! `PhoneCallResponse` is the external view of a call record. It renders the
//! provider-compatible wire shape: `sid`, `date_created`, `date_updated`,
//! `account_sid`, `uri` and friends are always present, while the internal
//! surrogate `id` and the `created_at`/`updated_at` audit columns have no
//! corresponding fields at all. That exclusion is an external-compatibility
//! contract, not a serde attribute to be toggled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use telapi_core::models::{PhoneCall, API_VERSION};
use validator::Validate;

/// Render a timestamp in the provider's RFC 2822 wire format
fn format_date(date: DateTime<Utc>) -> String {
    date.to_rfc2822()
}

/// Call creation request
///
/// Parameters arrive form-encoded with provider-style capitalized names.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCallRequest {
    /// Destination number
    #[serde(rename = "To", alias = "to")]
    #[validate(length(min = 1, message = "To is required"))]
    pub to: String,

    /// Originating number
    #[serde(rename = "From", alias = "from")]
    #[validate(length(min = 1, message = "From is required"))]
    pub from: String,
}

/// Page window for list endpoints (provider pages count from zero)
#[derive(Debug, Clone, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: i64,

    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page_size() -> i64 {
    50
}

impl PageParams {
    pub fn offset(&self) -> i64 {
        self.page.max(0) * self.limit()
    }

    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, 1000)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: 50,
        }
    }
}

/// External representation of one phone call resource
#[derive(Debug, Clone, Serialize)]
pub struct PhoneCallResponse {
    pub sid: String,
    pub date_created: String,
    pub date_updated: String,
    pub parent_call_sid: Option<String>,
    pub account_sid: String,
    pub to: String,
    pub from: String,
    pub phone_number_sid: Option<String>,
    pub status: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: Option<String>,
    pub price: Option<String>,
    pub price_unit: Option<String>,
    pub direction: String,
    pub api_version: String,
    pub uri: String,
}

impl From<&PhoneCall> for PhoneCallResponse {
    fn from(call: &PhoneCall) -> Self {
        Self {
            sid: call.sid.clone(),
            date_created: format_date(call.date_created),
            date_updated: format_date(call.date_updated),
            parent_call_sid: call.parent_call_sid.clone(),
            account_sid: call.account_sid.clone(),
            to: call.to.clone(),
            from: call.from.clone(),
            phone_number_sid: call.phone_number_sid.clone(),
            status: call.state.twilio_status().to_string(),
            start_time: call.start_time.map(format_date),
            end_time: call.end_time.map(format_date),
            duration: call.duration.map(|d| d.to_string()),
            price: call.price.map(|p| p.to_string()),
            price_unit: call.price_unit.clone(),
            direction: call.direction.clone(),
            api_version: API_VERSION.to_string(),
            uri: call.uri(),
        }
    }
}

impl From<PhoneCall> for PhoneCallResponse {
    fn from(call: PhoneCall) -> Self {
        Self::from(&call)
    }
}

/// Paged list of call resources
#[derive(Debug, Clone, Serialize)]
pub struct CallListResponse {
    pub page: i64,
    pub page_size: i64,
    pub calls: Vec<PhoneCallResponse>,
}

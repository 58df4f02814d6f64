//! Session request models and DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use super::Record;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SessionStatus {
    pub const ALL: [SessionStatus; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Invalid status '{}'. Must be one of: pending, approved, rejected",
                    s
                )
            })
    }
}

/// A user's request for a review session over an uploaded PDF.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    /// Stored upload name; only the last path segment is significant.
    pub pdf_path: String,
    pub original_file_name: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(deserialize_with = "deserialize_calendar_date")]
    pub requested_date: NaiveDate,
    pub requested_time: String,
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for SessionRequest {
    fn id(&self) -> &str {
        &self.id
    }
}

impl SessionRequest {
    /// File name of the backing upload, stripped of any directory prefix.
    pub fn stored_file_name(&self) -> Option<&str> {
        self.pdf_path
            .rsplit(&['/', '\\'][..])
            .next()
            .filter(|name| !name.is_empty())
    }

    /// Approved and scheduled for `today` or later.
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.status == SessionStatus::Approved && self.requested_date >= today
    }
}

/// Validated input for creating a session request.
#[derive(Debug, Clone)]
pub struct NewSessionRequest {
    pub title: String,
    pub description: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub pdf_path: String,
    pub original_file_name: String,
    pub file_size: u64,
    pub requested_date: NaiveDate,
    pub requested_time: String,
}

/// Raw create body. Every field is optional so missing fields surface as
/// validation errors instead of extractor rejections.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub pdf_path: Option<String>,
    pub original_file_name: Option<String>,
    pub file_size: Option<u64>,
    pub requested_date: Option<String>,
    pub requested_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionStatusRequest {
    pub status: Option<String>,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDownload {
    pub file_name: String,
    pub data: String,
    pub mime_type: &'static str,
}

/// Parse a requested date as sent by clients: either `YYYY-MM-DD` or a full
/// RFC 3339 timestamp, which is truncated to its UTC date.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
}

fn deserialize_calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid calendar date '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SessionRequest {
        let now = Utc::now();
        SessionRequest {
            id: "s1".to_string(),
            title: "Thesis draft".to_string(),
            description: String::new(),
            user_id: "u1".to_string(),
            user_name: "Ada".to_string(),
            user_email: "ada@example.com".to_string(),
            pdf_path: "data/uploads/abc.pdf".to_string(),
            original_file_name: "draft.pdf".to_string(),
            file_size: 42,
            requested_date: NaiveDate::from_ymd_opt(2030, 1, 15).unwrap(),
            requested_time: "10:00 AM".to_string(),
            status: SessionStatus::Pending,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("approved".parse::<SessionStatus>(), Ok(SessionStatus::Approved));
        assert_eq!("pending".parse::<SessionStatus>(), Ok(SessionStatus::Pending));
        assert!("cancelled".parse::<SessionStatus>().is_err());
        assert!("Approved".parse::<SessionStatus>().is_err());
    }

    #[test]
    fn test_parse_calendar_date() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(parse_calendar_date("2025-03-09"), Some(expected));
        assert_eq!(parse_calendar_date("2025-03-09T00:00:00.000Z"), Some(expected));
        assert_eq!(parse_calendar_date("09/03/2025"), None);
        assert_eq!(parse_calendar_date(""), None);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["originalFileName"], "draft.pdf");
        assert_eq!(json["requestedDate"], "2030-01-15");
        assert_eq!(json["status"], "pending");
        assert!(json.get("adminNotes").is_none());
    }

    #[test]
    fn test_deserialize_accepts_iso_timestamp_date() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json["requestedDate"] = "2030-01-15T09:30:00Z".into();
        let parsed: SessionRequest = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.requested_date, NaiveDate::from_ymd_opt(2030, 1, 15).unwrap());
    }

    #[test]
    fn test_stored_file_name() {
        let mut session = sample();
        assert_eq!(session.stored_file_name(), Some("abc.pdf"));
        session.pdf_path = "abc.pdf".to_string();
        assert_eq!(session.stored_file_name(), Some("abc.pdf"));
        session.pdf_path = "uploads/".to_string();
        assert_eq!(session.stored_file_name(), None);
    }

    #[test]
    fn test_is_upcoming_is_date_only() {
        let mut session = sample();
        let day = session.requested_date;
        assert!(!session.is_upcoming(day));

        session.status = SessionStatus::Approved;
        assert!(session.is_upcoming(day));
        assert!(session.is_upcoming(day.pred_opt().unwrap()));
        assert!(!session.is_upcoming(day.succ_opt().unwrap()));
    }
}

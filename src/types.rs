use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in the message list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSummary {
    pub id: String,
    pub text: String,
}

/// Full message, as shown on the detail screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub creation_date: DateTime<Utc>,
    pub text: String,
}

/// Relay-style pagination metadata for a single page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub edges: Vec<MessageSummary>,
    pub page_info: PageInfo,
}

/// Variables for one message search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub search_term: Option<String>,
    pub page_size: u32,
    pub after: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
}

/// Server verdict on a create-message mutation, using HTTP-like status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateStatus {
    Created,
    Invalid,
    Forbidden,
    Other(u16),
}

impl From<u16> for CreateStatus {
    fn from(code: u16) -> Self {
        match code {
            200 => CreateStatus::Created,
            400 => CreateStatus::Invalid,
            403 => CreateStatus::Forbidden,
            other => CreateStatus::Other(other),
        }
    }
}

impl fmt::Display for CreateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateStatus::Created => write!(f, "Created"),
            CreateStatus::Invalid => write!(f, "Invalid input"),
            CreateStatus::Forbidden => write!(f, "Not logged in"),
            CreateStatus::Other(code) => write!(f, "Status {}", code),
        }
    }
}

/// Field name -> validation messages
pub type FormErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    pub status: CreateStatus,
    pub form_errors: FormErrors,
    pub message_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_status_from_code() {
        assert_eq!(CreateStatus::from(200), CreateStatus::Created);
        assert_eq!(CreateStatus::from(400), CreateStatus::Invalid);
        assert_eq!(CreateStatus::from(403), CreateStatus::Forbidden);
        assert_eq!(CreateStatus::from(500), CreateStatus::Other(500));
    }

    #[test]
    fn create_status_display() {
        assert_eq!(CreateStatus::Forbidden.to_string(), "Not logged in");
        assert_eq!(CreateStatus::Other(502).to_string(), "Status 502");
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Seat, Session};

/// Жизненный цикл билета.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Pending,
    Confirmed,
    Failed,
    Reserved,
    Available,
    Refunded,
    Cancelled,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 8] = [
        TicketStatus::Confirmed,
        TicketStatus::Pending,
        TicketStatus::Failed,
        TicketStatus::Reserved,
        TicketStatus::Available,
        TicketStatus::Unknown,
        TicketStatus::Refunded,
        TicketStatus::Cancelled,
    ];

    /// Статусы, при которых место снова становится свободным.
    pub fn frees_seat(self) -> bool {
        matches!(
            self,
            TicketStatus::Available | TicketStatus::Cancelled | TicketStatus::Refunded
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::Confirmed => "confirmed",
            TicketStatus::Failed => "failed",
            TicketStatus::Reserved => "reserved",
            TicketStatus::Available => "available",
            TicketStatus::Refunded => "refunded",
            TicketStatus::Cancelled => "cancelled",
            TicketStatus::Unknown => "unknown",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    #[serde(default)]
    pub session_id: i64,
    #[serde(default)]
    pub seat_id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub price: f64,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub seat: Option<Seat>,
}

/// Тело `PATCH /tickets/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketUpdate {
    pub price: f64,
    pub status: TicketStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_and_missing_status_decode_as_unknown() {
        let t: Ticket = serde_json::from_str(r#"{"id":1,"price":100,"status":"lost"}"#).unwrap();
        assert_eq!(t.status, TicketStatus::Unknown);
        let t: Ticket = serde_json::from_str(r#"{"id":1,"price":100}"#).unwrap();
        assert_eq!(t.status, TicketStatus::Unknown);
    }

    #[test]
    fn freeing_statuses() {
        let freeing: Vec<_> = TicketStatus::ALL.into_iter().filter(|s| s.frees_seat()).collect();
        assert_eq!(
            freeing,
            vec![TicketStatus::Available, TicketStatus::Refunded, TicketStatus::Cancelled]
        );
    }

    #[test]
    fn update_serializes_lowercase_status() {
        let body = serde_json::to_value(TicketUpdate {
            price: 150.0,
            status: TicketStatus::Confirmed,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"price": 150.0, "status": "confirmed"}));
        assert_eq!(TicketStatus::parse("Refunded"), Some(TicketStatus::Refunded));
    }
}

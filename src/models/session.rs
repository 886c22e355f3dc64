use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{Movie, Room};

/// Сеанс (показ фильма в зале), не путать с сессией авторизации.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    #[serde(default)]
    pub movie_id: i64,
    #[serde(default)]
    pub room_id: i64,
    pub start_time: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub room: Room,
    #[serde(default)]
    pub movie: Option<Movie>,
}

impl Session {
    /// Время начала. Понимает RFC 3339 и формат `YYYY-MM-DD HH:MM:SS`.
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        parse_start_time(&self.start_time)
    }
}

pub(crate) fn parse_start_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").ok())
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").ok())
}

/// Тело `POST /sessions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSession {
    pub movie_id: i64,
    pub room_id: i64,
    /// `YYYY-MM-DD HH:MM:SS`
    pub start_time: String,
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_time_formats() {
        let a = parse_start_time("2025-03-10T18:30:00Z").unwrap();
        let b = parse_start_time("2025-03-10 18:30:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_start_time("tomorrow").is_none());
    }

    #[test]
    fn decodes_session_with_room() {
        let session: Session = serde_json::from_str(
            r#"{"id":7,"movie_id":1,"room_id":3,"start_time":"2025-03-10 18:30:00","price":150,"room":{"id":3,"name":"Red","capacity":80}}"#,
        )
        .unwrap();
        assert_eq!(session.room.name, "Red");
        assert!(session.movie.is_none());
        assert!(session.starts_at().is_some());
    }
}

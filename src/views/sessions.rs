use crate::models::Session;

pub fn session_label(session: &Session) -> String {
    let when = session
        .starts_at()
        .map(|t| t.format("%d.%m.%Y %H:%M").to_string())
        .unwrap_or_else(|| session.start_time.clone());
    if session.room.name.is_empty() {
        when
    } else {
        format!("{} - {}", when, session.room.name)
    }
}

/// Содержимое выпадающего списка сеансов.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOptions {
    Loading,
    Error,
    Empty,
    Options(Vec<(i64, String)>),
}

impl SessionOptions {
    pub fn from_sessions(sessions: &[Session]) -> Self {
        if sessions.is_empty() {
            return SessionOptions::Empty;
        }
        SessionOptions::Options(sessions.iter().map(|s| (s.id, session_label(s))).collect())
    }

    pub fn render(&self, selected: Option<i64>) -> String {
        match self {
            SessionOptions::Loading => "Loading sessions...".to_string(),
            SessionOptions::Error => "Failed to load sessions".to_string(),
            SessionOptions::Empty => "No sessions available".to_string(),
            SessionOptions::Options(options) => options
                .iter()
                .map(|(id, label)| {
                    let marker = if selected == Some(*id) { '>' } else { ' ' };
                    format!("{} [{}] {}", marker, id, label)
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: i64, start: &str, room: &str) -> Session {
        serde_json::from_value(serde_json::json!({
            "id": id, "start_time": start, "room": {"name": room}
        }))
        .unwrap()
    }

    #[test]
    fn labels_show_time_and_room() {
        assert_eq!(session_label(&session(1, "2025-03-10 18:30:00", "Red")), "10.03.2025 18:30 - Red");
        assert_eq!(session_label(&session(1, "later", "")), "later");
    }

    #[test]
    fn selected_option_is_marked() {
        let options = SessionOptions::from_sessions(&[
            session(1, "2025-03-10 18:30:00", "Red"),
            session(2, "2025-03-10 21:00:00", "Blue"),
        ]);
        let text = options.render(Some(2));
        assert!(text.contains("  [1]"));
        assert!(text.contains("> [2] 10.03.2025 21:00 - Blue"));
        assert_eq!(SessionOptions::from_sessions(&[]), SessionOptions::Empty);
    }
}

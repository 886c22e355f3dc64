use std::fmt;

/// Ключ запроса. Смена ключа (например, выбор другого сеанса) означает, что
/// старый результат больше никому не нужен.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// Список фильмов для конкретной строки запроса (`limit=..&offset=..`)
    Movies(String),
    Movie(String),
    Sessions(i64),
    Seats(i64),
    Rooms,
}

impl QueryKey {
    pub fn is_movie_list(&self) -> bool {
        matches!(self, QueryKey::Movies(_))
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Movies(query) => write!(f, "movies?{}", query),
            QueryKey::Movie(slug) => write!(f, "movie:{}", slug),
            QueryKey::Sessions(movie_id) => write!(f, "sessions:{}", movie_id),
            QueryKey::Seats(session_id) => write!(f, "seats:{}", session_id),
            QueryKey::Rooms => f.write_str("rooms"),
        }
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub poster_url: Option<String>,
    /// Длительность в минутах
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub age_rating: Option<u8>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Movie {
    /// Дата релиза; сервер отдаёт либо `YYYY-MM-DD`, либо полный RFC 3339.
    pub fn release_day(&self) -> Option<NaiveDate> {
        let raw = self.release_date.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| {
                chrono::DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|dt| dt.date_naive())
            })
            .or_else(|| raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Параметры выборки списка фильмов (`GET /movies`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoviesQuery {
    pub limit: u32,
    pub offset: u32,
    pub sort: SortOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for MoviesQuery {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
            sort: SortOrder::Desc,
            search: None,
        }
    }
}

impl MoviesQuery {
    /// Сервер принимает limit в диапазоне 1..=20.
    pub fn normalized(&self) -> Self {
        Self {
            limit: self.limit.clamp(1, 20),
            offset: self.offset,
            sort: self.sort,
            search: self
                .search
                .as_ref()
                .map(|s| s.trim().chars().take(100).collect::<String>())
                .filter(|s| !s.is_empty()),
        }
    }

    pub fn to_query_string(&self) -> Result<String, serde_urlencoded::ser::Error> {
        serde_urlencoded::to_string(self.normalized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_release_date_formats() {
        let mut movie: Movie = serde_json::from_str(
            r#"{"id":1,"slug":"dune","title":"Dune","release_date":"2024-03-01"}"#,
        )
        .unwrap();
        assert_eq!(movie.release_day(), NaiveDate::from_ymd_opt(2024, 3, 1));

        movie.release_date = "2024-03-01T00:00:00Z".to_string();
        assert_eq!(movie.release_day(), NaiveDate::from_ymd_opt(2024, 3, 1));

        movie.release_date = "soon".to_string();
        assert_eq!(movie.release_day(), None);
    }

    #[test]
    fn query_string_clamps_limit_and_trims_search() {
        let query = MoviesQuery {
            limit: 50,
            offset: 40,
            sort: SortOrder::Asc,
            search: Some("  dune ".to_string()),
        };
        assert_eq!(
            query.to_query_string().unwrap(),
            "limit=20&offset=40&sort=asc&search=dune"
        );

        let blank = MoviesQuery {
            search: Some("   ".to_string()),
            ..MoviesQuery::default()
        };
        assert_eq!(blank.to_query_string().unwrap(), "limit=20&offset=0&sort=desc");
    }
}

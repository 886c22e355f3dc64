use crate::models::Movie;

/// "2 h 46 min", "45 min".
pub fn format_duration(minutes: i64) -> String {
    if minutes <= 0 {
        return "-".to_string();
    }
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{} min", m),
        (h, 0) => format!("{} h", h),
        (h, m) => format!("{} h {} min", h, m),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieCard {
    pub slug: String,
    pub title: String,
    pub release: String,
    pub duration: String,
    pub genre: Option<String>,
    pub poster_url: Option<String>,
}

impl MovieCard {
    pub fn from_movie(movie: &Movie) -> Self {
        let release = movie
            .release_day()
            .map(|d| d.format("%d %B %Y").to_string())
            .unwrap_or_else(|| movie.release_date.clone());
        Self {
            slug: movie.slug.clone(),
            title: movie.title.clone(),
            release,
            duration: format_duration(movie.duration),
            genre: movie.genre.clone(),
            poster_url: movie.poster_url.clone(),
        }
    }

    /// Однострочная карточка для списка фильмов.
    pub fn render_line(&self) -> String {
        let mut line = format!("{:<30} {:<18} {:>12}", self.title, self.release, self.duration);
        if let Some(genre) = &self.genre {
            line.push_str("  ");
            line.push_str(genre);
        }
        line.push_str(&format!("  [{}]", self.slug));
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(format_duration(45), "45 min");
        assert_eq!(format_duration(120), "2 h");
        assert_eq!(format_duration(166), "2 h 46 min");
        assert_eq!(format_duration(0), "-");
    }

    #[test]
    fn card_falls_back_to_raw_release_date() {
        let mut movie: Movie = serde_json::from_str(
            r#"{"id":1,"slug":"dune","title":"Dune","duration":155,"release_date":"2021-10-22"}"#,
        )
        .unwrap();
        assert_eq!(MovieCard::from_movie(&movie).release, "22 October 2021");
        movie.release_date = "TBA".to_string();
        let card = MovieCard::from_movie(&movie);
        assert_eq!(card.release, "TBA");
        assert!(card.render_line().ends_with("[dune]"));
    }
}

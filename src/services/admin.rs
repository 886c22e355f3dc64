//! Действия администратора: фильмы, сеансы, залы.
//!
//! Права проверяются на клиенте до отправки формы. Сервер всё равно
//! проверит их сам, здесь это нужно, чтобы не показывать форму зря.

use tracing::info;

use crate::{
    api::ApiClient,
    error::ClientError,
    forms::{MovieForm, RoomForm, SessionForm},
    models::{Movie, MoviesQuery, Room, Session},
    notify::Toasts,
};

/// Чем закончилась правка фильма.
#[derive(Debug, Clone, PartialEq)]
pub enum MovieEditOutcome {
    /// Slug сменился, старый адрес страницы больше не работает.
    Navigate { slug: String },
    /// Slug прежний, карточка перечитана с сервера.
    Refreshed(Option<Movie>),
}

/// Варианты для формы нового сеанса.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionFormOptions {
    pub rooms: Vec<Room>,
    pub movies: Vec<Movie>,
}

pub struct AdminService {
    api: ApiClient,
    toasts: Toasts,
}

impl AdminService {
    pub fn new(api: ApiClient, toasts: Toasts) -> Self {
        Self { api, toasts }
    }

    fn report<T>(&self, action: &str, result: Result<T, ClientError>) -> Result<T, ClientError> {
        match result {
            Ok(value) => {
                self.toasts.success(format!("{} succeeded", action));
                Ok(value)
            }
            Err(e) => {
                self.toasts.error(format!("{} failed: {}", action, e.user_message()));
                Err(e)
            }
        }
    }

    pub async fn add_movie(&self, form: &MovieForm) -> Result<Option<Movie>, ClientError> {
        self.api.require_admin()?;
        form.check(true)?;
        let result = self.api.create_movie(form).await;
        self.report("Adding movie", result)
    }

    pub async fn edit_movie(
        &self,
        movie: &Movie,
        form: &MovieForm,
    ) -> Result<MovieEditOutcome, ClientError> {
        self.api.require_admin()?;
        form.check(false)?;
        let result = self.api.update_movie(movie, form).await;
        self.report("Updating movie", result)?;

        let new_slug = form.slug.trim();
        if new_slug != movie.slug {
            info!("Movie {} moved to slug {}", movie.id, new_slug);
            return Ok(MovieEditOutcome::Navigate {
                slug: new_slug.to_string(),
            });
        }
        Ok(MovieEditOutcome::Refreshed(self.api.movie(&movie.slug).await?))
    }

    pub async fn delete_movie(&self, movie: &Movie) -> Result<(), ClientError> {
        let result = self.api.delete_movie(movie).await;
        self.report("Deleting movie", result)
    }

    /// Залы и фильмы для формы сеанса, запрашиваются параллельно.
    pub async fn session_form_options(&self) -> Result<SessionFormOptions, ClientError> {
        self.api.require_admin()?;
        let query = MoviesQuery::default();
        let (rooms, movies) = futures::try_join!(self.api.rooms(), self.api.list_movies(&query))?;
        Ok(SessionFormOptions { rooms, movies })
    }

    pub async fn add_session(&self, form: &SessionForm) -> Result<Option<Session>, ClientError> {
        self.api.require_admin()?;
        form.check()?;
        let result = self.api.create_session(&form.to_new_session()).await;
        self.report("Adding session", result)
    }

    pub async fn delete_session(&self, movie_id: i64, session_id: i64) -> Result<(), ClientError> {
        let result = self.api.delete_session(movie_id, session_id).await;
        self.report("Deleting session", result)
    }

    pub async fn add_room(&self, form: &RoomForm) -> Result<Option<Room>, ClientError> {
        self.api.require_admin()?;
        form.check()?;
        let result = self.api.create_room(&form.to_new_room()).await;
        self.report("Adding room", result)
    }
}

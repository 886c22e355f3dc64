//! Формы и их проверка на клиенте.
//!
//! Проверка выполняется до любого запроса. Сообщения собираются в порядке
//! полей формы, чтобы интерфейс показывал их сверху вниз.

use std::borrow::Cow;
use std::path::PathBuf;

use chrono::NaiveDate;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::{
    api::FormField,
    error::ClientError,
    models::{Credentials, NewRoom, NewSession, NewUser, TicketStatus, TicketUpdate},
};

/// Сервер принимает постеры до 10 МБ.
pub const MAX_POSTER_BYTES: u64 = 10 << 20;

fn invalid(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Первое сообщение каждого поля, в порядке `fields`.
pub fn ordered_messages(errors: &ValidationErrors, fields: &[&str]) -> Vec<String> {
    let by_field = errors.field_errors();
    fields
        .iter()
        .filter_map(|field| by_field.get(*field))
        .filter_map(|errs| errs.first())
        .map(|err| {
            err.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string())
        })
        .collect()
}

fn check<T: Validate>(form: &T, fields: &[&str]) -> Result<(), ClientError> {
    form.validate()
        .map_err(|errors| ClientError::Validation(ordered_messages(&errors, fields)))
}

/// Длина без пробелов по краям: сервер получает обрезанное значение.
fn trimmed_length(
    value: &str,
    min: usize,
    max: usize,
    message: &'static str,
) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        return Err(invalid("length", message));
    }
    Ok(())
}

fn username(value: &str) -> Result<(), ValidationError> {
    trimmed_length(value, 1, 100, "username is required (at most 100 characters)")
}

fn slug(value: &str) -> Result<(), ValidationError> {
    trimmed_length(value, 3, 100, "slug must be 3 to 100 characters")
}

fn title(value: &str) -> Result<(), ValidationError> {
    trimmed_length(value, 3, 100, "title must be 3 to 100 characters")
}

fn description(value: &str) -> Result<(), ValidationError> {
    trimmed_length(value, 5, 500, "description must be 5 to 500 characters")
}

fn room_name(value: &str) -> Result<(), ValidationError> {
    trimmed_length(value, 3, 100, "room name must be 3 to 100 characters")
}

fn required_email(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid("required", "email is required"));
    }
    if !value.validate_email() {
        return Err(invalid("email", "invalid email address"));
    }
    if value.chars().count() > 255 {
        return Err(invalid("length", "email must be at most 255 characters"));
    }
    Ok(())
}

fn new_password(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len == 0 {
        return Err(invalid("required", "password is required"));
    }
    if len < 8 {
        return Err(invalid("length", "password must be minimum 8 characters"));
    }
    if len > 72 {
        return Err(invalid("length", "password must be at most 72 characters"));
    }
    Ok(())
}

fn release_date(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| invalid("date", "release date must be YYYY-MM-DD"))
}

fn start_time(value: &str) -> Result<(), ValidationError> {
    chrono::NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M:%S")
        .map(|_| ())
        .map_err(|_| invalid("datetime", "start time must be YYYY-MM-DD HH:MM:SS"))
}

#[derive(Debug, Clone, Default, Validate)]
pub struct RegisterForm {
    #[validate(custom(function = "username"))]
    pub username: String,
    #[validate(custom(function = "required_email"))]
    pub email: String,
    #[validate(custom(function = "new_password"))]
    pub password: String,
}

impl RegisterForm {
    const FIELDS: &'static [&'static str] = &["username", "email", "password"];

    pub fn check(&self) -> Result<(), ClientError> {
        check(self, Self::FIELDS)
    }

    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct LoginForm {
    #[validate(custom(function = "required_email"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

impl LoginForm {
    const FIELDS: &'static [&'static str] = &["email", "password"];

    pub fn check(&self) -> Result<(), ClientError> {
        check(self, Self::FIELDS)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

/// Форма фильма. Постер обязателен при создании и необязателен при правке.
#[derive(Debug, Clone, Default, Validate)]
pub struct MovieForm {
    #[validate(custom(function = "slug"))]
    pub slug: String,
    #[validate(custom(function = "title"))]
    pub title: String,
    #[validate(custom(function = "description"))]
    pub description: String,
    #[validate(range(min = 1, message = "duration must be at least 1 minute"))]
    pub duration: i64,
    #[validate(custom(function = "release_date"))]
    pub release_date: String,
    pub poster: Option<PathBuf>,
}

impl MovieForm {
    const FIELDS: &'static [&'static str] =
        &["slug", "title", "description", "duration", "release_date"];

    pub fn check(&self, poster_required: bool) -> Result<(), ClientError> {
        let mut messages = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => ordered_messages(&errors, Self::FIELDS),
        };
        match &self.poster {
            None if poster_required => messages.push("poster file is required".to_string()),
            Some(path) => {
                if let Ok(meta) = std::fs::metadata(path) {
                    if meta.len() > MAX_POSTER_BYTES {
                        messages.push("poster must be at most 10 MB".to_string());
                    }
                } else {
                    messages.push(format!("poster file {} cannot be read", path.display()));
                }
            }
            None => {}
        }
        if messages.is_empty() {
            Ok(())
        } else {
            Err(ClientError::Validation(messages))
        }
    }

    /// Поля multipart-запроса; файл постера читается с диска.
    pub async fn to_multipart(&self) -> Result<Vec<FormField>, ClientError> {
        let mut fields = Vec::with_capacity(6);
        if let Some(path) = &self.poster {
            let bytes = tokio::fs::read(path).await?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "poster".to_string());
            fields.push(FormField::File {
                name: "file".to_string(),
                mime: poster_mime(&file_name).to_string(),
                file_name,
                bytes,
            });
        }
        fields.push(FormField::text("slug", self.slug.trim()));
        fields.push(FormField::text("title", self.title.trim()));
        fields.push(FormField::text("description", self.description.trim()));
        fields.push(FormField::text("duration", self.duration));
        fields.push(FormField::text("release_date", self.release_date.trim()));
        Ok(fields)
    }
}

pub fn poster_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct SessionForm {
    #[validate(range(min = 1, message = "movie is required"))]
    pub movie_id: i64,
    #[validate(range(min = 1, message = "room is required"))]
    pub room_id: i64,
    #[validate(custom(function = "start_time"))]
    pub start_time: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
}

impl SessionForm {
    const FIELDS: &'static [&'static str] = &["movie_id", "room_id", "start_time", "price"];

    pub fn check(&self) -> Result<(), ClientError> {
        check(self, Self::FIELDS)
    }

    pub fn to_new_session(&self) -> NewSession {
        NewSession {
            movie_id: self.movie_id,
            room_id: self.room_id,
            start_time: self.start_time.trim().to_string(),
            price: self.price,
        }
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct RoomForm {
    #[validate(custom(function = "room_name"))]
    pub name: String,
    #[validate(range(min = 1, message = "capacity must be at least 1"))]
    pub capacity: i64,
    /// Сразу заполнить зал местами по `rows` рядам.
    pub auto_fill: bool,
    pub rows: Option<i64>,
}

impl RoomForm {
    const FIELDS: &'static [&'static str] = &["name", "capacity"];

    pub fn check(&self) -> Result<(), ClientError> {
        let mut messages = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => ordered_messages(&errors, Self::FIELDS),
        };
        if self.auto_fill && !self.rows.is_some_and(|rows| rows > 0) {
            messages.push("rows must be greater than 0".to_string());
        }
        if messages.is_empty() {
            Ok(())
        } else {
            Err(ClientError::Validation(messages))
        }
    }

    pub fn to_new_room(&self) -> NewRoom {
        NewRoom {
            name: self.name.trim().to_string(),
            capacity: self.capacity,
            rows: if self.auto_fill { self.rows } else { None },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct TicketForm {
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    pub status: TicketStatus,
}

impl TicketForm {
    const FIELDS: &'static [&'static str] = &["price"];

    pub fn check(&self) -> Result<(), ClientError> {
        check(self, Self::FIELDS)
    }

    pub fn to_update(&self) -> TicketUpdate {
        TicketUpdate {
            price: self.price,
            status: self.status,
        }
    }
}

//! HTTP-транспорт к REST API кинотеатра.
//!
//! Здесь и только здесь ответы сервера превращаются из байтов в типы:
//! конверт `{ "data": ... }` разворачивается, 204 и 404 становятся `None`,
//! остальные неуспешные коды становятся `ClientError`.

use reqwest::{header, multipart, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::{
    config::ApiConfig,
    error::ClientError,
    models::{ApiEnvelope, ApiErrorBody},
};

/// Поле multipart-формы (загрузка постера вместе с полями фильма).
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Text { name: String, value: String },
    File {
        name: String,
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

impl FormField {
    pub fn text(name: &str, value: impl ToString) -> Self {
        FormField::Text {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FormField::Text { name, .. } | FormField::File { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormField>),
}

/// Описание одного запроса: метод, путь относительно базового URL и тело.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn multipart(mut self, fields: Vec<FormField>) -> Self {
        self.body = RequestBody::Multipart(fields);
        self
    }
}

/// Экранирует значение, которое подставляется в путь как один сегмент.
pub(crate) fn path_segment(raw: &str) -> Result<String, ClientError> {
    let mut url = reqwest::Url::parse("http://localhost/")
        .map_err(|e| ClientError::InvalidPath(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| ClientError::InvalidPath(raw.to_string()))?
        .clear()
        .push(raw);
    Ok(url.path().trim_start_matches('/').to_string())
}

/// Асинхронный HTTP-клиент с базовым URL API.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("cinema-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(&config.base_url, http_client))
    }

    pub fn with_client(base_url: &str, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Выполняет запрос и разбирает ответ.
    ///
    /// `Ok(None)` означает 204, 404 или пустое тело. 401 возвращается как
    /// `ClientError::Unauthorized`, решать что с ним делать будет вызывающий.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        bearer: Option<&str>,
    ) -> Result<Option<T>, ClientError> {
        let method = request.method.clone();
        let url = self.url(&request.path);
        debug!("{} {}", method, url);

        let mut builder = self.http_client.request(method.clone(), &url);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(fields) => builder.multipart(build_form(fields)?),
        };

        let response = builder.send().await.map_err(|e| {
            warn!("{} {} failed: {}", method, url, e);
            ClientError::Network(e)
        })?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!("{} {} -> {}", method, url, status);

        decode_response(status, &body)
    }
}

fn build_form(fields: Vec<FormField>) -> Result<multipart::Form, ClientError> {
    let mut form = multipart::Form::new();
    for field in fields {
        form = match field {
            FormField::Text { name, value } => form.text(name, value),
            FormField::File {
                name,
                file_name,
                mime,
                bytes,
            } => {
                let part = multipart::Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&mime)?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

/// Классификация ответа по статусу и разбор конверта.
pub(crate) fn decode_response<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> Result<Option<T>, ClientError> {
    match status {
        StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(None),
        StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
        s if s.is_success() => {
            if body.iter().all(u8::is_ascii_whitespace) {
                return Ok(None);
            }
            let envelope: ApiEnvelope<T> = serde_json::from_slice(body)
                .map_err(|e| ClientError::Decode(format!("{} (status {})", e, s)))?;
            Ok(Some(envelope.data))
        }
        s => {
            let message = serde_json::from_slice::<ApiErrorBody>(body)
                .ok()
                .and_then(ApiErrorBody::into_message)
                .unwrap_or_else(|| {
                    s.canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            Err(ClientError::status(s, message))
        }
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Room {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub capacity: i64,
}

/// Тело `POST /rooms`. `rows` заставляет сервер сразу заполнить зал местами.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRoom {
    pub name: String,
    pub capacity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<i64>,
}

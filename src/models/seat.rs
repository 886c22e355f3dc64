use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Reserved,
    // Всё, что сервер не пометил как reserved, можно покупать
    #[serde(other)]
    Available,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub id: i64,
    #[serde(default)]
    pub room_id: i64,
    pub row: i32,
    pub seat_number: i32,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default = "default_status")]
    pub status: SeatStatus,
}

fn default_status() -> SeatStatus {
    SeatStatus::Available
}

impl Seat {
    pub fn is_reserved(&self) -> bool {
        self.status == SeatStatus::Reserved
    }
}

//! Представление данных для терминала. Здесь нет ни запросов, ни состояния:
//! только превращение моделей в строки и таблицы.

pub mod movie_card;
pub mod seat_map;
pub mod sessions;
pub mod tickets;

pub use movie_card::{format_duration, MovieCard};
pub use seat_map::{legend, PriceTier, SeatMap, SeatMark};
pub use sessions::{session_label, SessionOptions};
pub use tickets::{qr_payload, status_label, TicketRow};

pub mod envelope;
pub mod movie;
pub mod payment;
pub mod room;
pub mod seat;
pub mod session;
pub mod ticket;
pub mod user;

pub use envelope::{ApiEnvelope, ApiErrorBody};
pub use movie::{Movie, MoviesQuery, SortOrder};
pub use payment::{PaymentCheck, PaymentLink, PaymentRequest};
pub use room::{NewRoom, Room};
pub use seat::{Seat, SeatStatus};
pub use session::{NewSession, Session};
pub use ticket::{Ticket, TicketStatus, TicketUpdate};
pub use user::{Credentials, NewUser, Role, User};

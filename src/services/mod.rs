pub mod account;
#[cfg(feature = "admin")]
pub mod admin;
pub mod booking;
pub mod purchase;
pub mod ticket_edit;

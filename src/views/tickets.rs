use crate::models::{Ticket, TicketStatus};
use crate::views::sessions::session_label;

pub fn status_label(status: TicketStatus) -> &'static str {
    match status {
        TicketStatus::Confirmed => "Confirmed",
        TicketStatus::Pending => "Processing",
        TicketStatus::Failed => "Payment failed",
        TicketStatus::Reserved => "Reserved",
        TicketStatus::Available => "Available",
        TicketStatus::Unknown => "Unknown",
        TicketStatus::Refunded => "Refunded",
        TicketStatus::Cancelled => "Cancelled",
    }
}

/// Данные для QR-кода: только у подтверждённого билета.
pub fn qr_payload(api_base: &str, ticket: &Ticket) -> Option<String> {
    (ticket.status == TicketStatus::Confirmed)
        .then(|| format!("{}/validate/{}", api_base.trim_end_matches('/'), ticket.id))
}

/// Строка списка "мои билеты".
#[derive(Debug, Clone, PartialEq)]
pub struct TicketRow {
    pub ticket_id: i64,
    pub movie: String,
    pub session: String,
    pub place: String,
    pub price: f64,
    pub status: &'static str,
    pub qr: Option<String>,
}

impl TicketRow {
    pub fn new(api_base: &str, ticket: &Ticket) -> Self {
        let movie = ticket
            .session
            .as_ref()
            .and_then(|s| s.movie.as_ref())
            .map(|m| m.title.clone())
            .unwrap_or_else(|| format!("session #{}", ticket.session_id));
        let session = ticket
            .session
            .as_ref()
            .map(session_label)
            .unwrap_or_default();
        let place = ticket
            .seat
            .as_ref()
            .map(|s| format!("row {}, seat {}", s.row, s.seat_number))
            .unwrap_or_else(|| format!("seat #{}", ticket.seat_id));
        Self {
            ticket_id: ticket.id,
            movie,
            session,
            place,
            price: ticket.price,
            status: status_label(ticket.status),
            qr: qr_payload(api_base, ticket),
        }
    }

    pub fn render(&self) -> String {
        let mut line = format!(
            "#{:<5} {:<28} {:<26} {:<18} {:>8.2}  {}",
            self.ticket_id, self.movie, self.session, self.place, self.price, self.status
        );
        if let Some(qr) = &self.qr {
            line.push_str("\n       QR: ");
            line.push_str(qr);
        }
        line
    }
}

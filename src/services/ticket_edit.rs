//! Редактор билета администратора.
//!
//! Открывается по клику на занятое место. Смена статуса на освобождающий
//! место (available, cancelled, refunded) проходит через подтверждение и
//! заканчивается удалением билета, а не обновлением.

use tracing::{debug, info};

use crate::{
    api::ApiClient,
    error::ClientError,
    forms::TicketForm,
    models::{Ticket, TicketStatus},
    notify::Toasts,
};

#[derive(Debug, Clone, PartialEq)]
pub enum TicketEditState {
    /// Билет загружается. При ошибке остаёмся здесь, можно повторить.
    Loading { session_id: i64, seat_id: i64 },
    /// Сеанс и место берутся из клика по карте: сервер их в ответе не заполняет.
    Editable {
        session_id: i64,
        seat_id: i64,
        ticket: Ticket,
        draft: TicketForm,
    },
    /// Ждём подтверждения удаления; черновик сохраняется на случай отмены.
    ConfirmDelete {
        session_id: i64,
        seat_id: i64,
        ticket: Ticket,
        draft: TicketForm,
    },
    Deleted { ticket_id: i64, session_id: i64 },
    Closed { ticket_id: i64, session_id: i64 },
}

impl TicketEditState {
    pub fn name(&self) -> &'static str {
        match self {
            TicketEditState::Loading { .. } => "Loading",
            TicketEditState::Editable { .. } => "Editable",
            TicketEditState::ConfirmDelete { .. } => "ConfirmDelete",
            TicketEditState::Deleted { .. } => "Deleted",
            TicketEditState::Closed { .. } => "Closed",
        }
    }

    /// Редактор закрыт, карту мест пора перерисовать.
    pub fn is_finished(&self) -> bool {
        matches!(self, TicketEditState::Deleted { .. } | TicketEditState::Closed { .. })
    }
}

pub struct TicketEditor {
    api: ApiClient,
    toasts: Toasts,
    state: TicketEditState,
}

impl TicketEditor {
    pub fn open(api: ApiClient, toasts: Toasts, session_id: i64, seat_id: i64) -> Self {
        Self {
            api,
            toasts,
            state: TicketEditState::Loading { session_id, seat_id },
        }
    }

    pub fn state(&self) -> &TicketEditState {
        &self.state
    }

    fn rejected(&self, event: &str) -> ClientError {
        ClientError::InvalidTransition {
            state: self.state.name().to_string(),
            event: event.to_string(),
        }
    }

    pub async fn load(&mut self) -> Result<(), ClientError> {
        let TicketEditState::Loading { session_id, seat_id } = self.state else {
            return Err(self.rejected("Load"));
        };
        self.api.require_admin()?;

        match self.api.ticket_for_seat(session_id, seat_id).await {
            Ok(Some(ticket)) => {
                debug!("Editing ticket {} ({})", ticket.id, ticket.status);
                let draft = TicketForm {
                    price: ticket.price,
                    status: ticket.status,
                };
                self.state = TicketEditState::Editable {
                    session_id,
                    seat_id,
                    ticket,
                    draft,
                };
                Ok(())
            }
            Ok(None) => {
                let err = ClientError::NotFound(format!("ticket for seat {}", seat_id));
                self.toasts.error(err.user_message());
                Err(err)
            }
            Err(e) => {
                self.toasts.error(format!("Failed to load ticket: {}", e.user_message()));
                Err(e)
            }
        }
    }

    pub fn set_price(&mut self, price: f64) -> Result<(), ClientError> {
        if let TicketEditState::Editable { draft, .. } = &mut self.state {
            draft.price = price;
            return Ok(());
        }
        Err(self.rejected("SetPrice"))
    }

    pub fn set_status(&mut self, status: TicketStatus) -> Result<(), ClientError> {
        if let TicketEditState::Editable { draft, .. } = &mut self.state {
            draft.status = status;
            return Ok(());
        }
        Err(self.rejected("SetStatus"))
    }

    /// Сохранение черновика. Освобождающий статус ведёт к подтверждению
    /// удаления без запроса к серверу.
    pub async fn submit(&mut self) -> Result<(), ClientError> {
        let TicketEditState::Editable {
            session_id,
            seat_id,
            ticket,
            draft,
        } = &self.state
        else {
            return Err(self.rejected("Submit"));
        };
        draft.check()?;

        if draft.status.frees_seat() && ticket.status != TicketStatus::Available {
            debug!("Ticket {} moves to {}, asking for confirmation", ticket.id, draft.status);
            self.state = TicketEditState::ConfirmDelete {
                session_id: *session_id,
                seat_id: *seat_id,
                ticket: ticket.clone(),
                draft: draft.clone(),
            };
            return Ok(());
        }

        let (ticket_id, session_id) = (ticket.id, *session_id);
        match self.api.update_ticket(ticket_id, session_id, &draft.to_update()).await {
            Ok(()) => {
                self.toasts.success("Ticket updated");
                self.state = TicketEditState::Closed { ticket_id, session_id };
                Ok(())
            }
            Err(e) => {
                self.toasts.error(format!("Failed to update ticket: {}", e.user_message()));
                Err(e)
            }
        }
    }

    pub fn cancel_delete(&mut self) -> Result<(), ClientError> {
        match &self.state {
            TicketEditState::ConfirmDelete {
                session_id,
                seat_id,
                ticket,
                draft,
            } => {
                self.state = TicketEditState::Editable {
                    session_id: *session_id,
                    seat_id: *seat_id,
                    ticket: ticket.clone(),
                    draft: draft.clone(),
                };
                Ok(())
            }
            _ => Err(self.rejected("CancelDelete")),
        }
    }

    pub async fn confirm_delete(&mut self) -> Result<(), ClientError> {
        let TicketEditState::ConfirmDelete {
            session_id, ticket, ..
        } = &self.state
        else {
            return Err(self.rejected("ConfirmDelete"));
        };
        let (ticket_id, session_id) = (ticket.id, *session_id);

        match self.api.delete_ticket(ticket_id, session_id).await {
            Ok(()) => {
                info!("Seat freed by deleting ticket {}", ticket_id);
                self.toasts.success("Ticket deleted, seat is free again");
                self.state = TicketEditState::Deleted { ticket_id, session_id };
                Ok(())
            }
            Err(e) => {
                self.toasts.error(format!("Failed to delete ticket: {}", e.user_message()));
                Err(e)
            }
        }
    }
}

//! booking.rs
//!
//! Выбор сеанса и места на странице фильма.
//!
//! Ключевые компоненты:
//! 1.  **BookingState**: конечный автомат выбора. Каждое состояние хранит ровно
//!     те идентификаторы, которые в нём имеют смысл: место без сеанса
//!     невыразимо.
//! 2.  **BookingEvent**: события, которые автомат умеет применять. Недопустимое
//!     событие возвращает `InvalidTransition` и не меняет состояние.
//! 3.  **MovieDetailPage**: страница фильма. Загружает фильм, затем сеансы,
//!     затем места выбранного сеанса, и ведёт автомат от выбора до оплаты.

use tracing::{debug, info, warn};

use crate::{
    api::ApiClient,
    error::ClientError,
    models::{Movie, Seat, Session},
    notify::Toasts,
    views::{SeatMap, SessionOptions},
};

/// Состояния выбора билета.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BookingState {
    /// Сеанс ещё не выбран (или у фильма нет сеансов).
    #[default]
    NoSession,
    /// Выбран сеанс, место нет.
    SessionSelected { session_id: i64 },
    /// Выбрано свободное место в текущем сеансе.
    SeatSelected { session_id: i64, seat_id: i64 },
    /// Платёж создаётся на сервере, любые изменения выбора запрещены.
    PurchaseInFlight { session_id: i64, seat_id: i64 },
    /// Платёж создан, пользователя нужно отправить на `payment_url`.
    PurchaseComplete {
        session_id: i64,
        seat_id: i64,
        payment_url: String,
    },
    /// Создать платёж не удалось. Из этого состояния возвращаемся к выбранному месту.
    PurchaseFailed {
        session_id: i64,
        seat_id: i64,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingEvent {
    /// Пришёл (или обновился) список сеансов фильма.
    SessionsLoaded(Vec<i64>),
    SelectSession(i64),
    SelectSeat(i64),
    PurchaseStarted,
    PurchaseSucceeded { payment_url: String },
    PurchaseFailed { reason: String },
    /// Пользователь закрыл сообщение об ошибке оплаты.
    Acknowledge,
}

impl BookingEvent {
    fn name(&self) -> &'static str {
        match self {
            BookingEvent::SessionsLoaded(_) => "SessionsLoaded",
            BookingEvent::SelectSession(_) => "SelectSession",
            BookingEvent::SelectSeat(_) => "SelectSeat",
            BookingEvent::PurchaseStarted => "PurchaseStarted",
            BookingEvent::PurchaseSucceeded { .. } => "PurchaseSucceeded",
            BookingEvent::PurchaseFailed { .. } => "PurchaseFailed",
            BookingEvent::Acknowledge => "Acknowledge",
        }
    }
}

impl BookingState {
    pub fn name(&self) -> &'static str {
        match self {
            BookingState::NoSession => "NoSession",
            BookingState::SessionSelected { .. } => "SessionSelected",
            BookingState::SeatSelected { .. } => "SeatSelected",
            BookingState::PurchaseInFlight { .. } => "PurchaseInFlight",
            BookingState::PurchaseComplete { .. } => "PurchaseComplete",
            BookingState::PurchaseFailed { .. } => "PurchaseFailed",
        }
    }

    pub fn session_id(&self) -> Option<i64> {
        match self {
            BookingState::NoSession => None,
            BookingState::SessionSelected { session_id }
            | BookingState::SeatSelected { session_id, .. }
            | BookingState::PurchaseInFlight { session_id, .. }
            | BookingState::PurchaseComplete { session_id, .. }
            | BookingState::PurchaseFailed { session_id, .. } => Some(*session_id),
        }
    }

    pub fn seat_id(&self) -> Option<i64> {
        match self {
            BookingState::NoSession | BookingState::SessionSelected { .. } => None,
            BookingState::SeatSelected { seat_id, .. }
            | BookingState::PurchaseInFlight { seat_id, .. }
            | BookingState::PurchaseComplete { seat_id, .. }
            | BookingState::PurchaseFailed { seat_id, .. } => Some(*seat_id),
        }
    }

    fn is_locked(&self) -> bool {
        matches!(
            self,
            BookingState::PurchaseInFlight { .. } | BookingState::PurchaseComplete { .. }
        )
    }

    /// Применяет событие и возвращает новое состояние. Текущее состояние не меняется.
    pub fn apply(&self, event: BookingEvent) -> Result<BookingState, ClientError> {
        let rejected = |event: &BookingEvent| ClientError::InvalidTransition {
            state: self.name().to_string(),
            event: event.name().to_string(),
        };

        let next = match (self, &event) {
            (state, BookingEvent::SessionsLoaded(_)) if state.is_locked() => state.clone(),
            (state, BookingEvent::SessionsLoaded(ids)) => match state.session_id() {
                // Обновлённый список, в котором текущий сеанс остался, выбор не трогает
                Some(current) if ids.contains(&current) => state.clone(),
                _ => match ids.first() {
                    Some(&first) => BookingState::SessionSelected { session_id: first },
                    None => BookingState::NoSession,
                },
            },

            (state, BookingEvent::SelectSession(_)) if state.is_locked() => {
                return Err(rejected(&event))
            }
            (state, BookingEvent::SelectSession(id)) if state.session_id() == Some(*id) => {
                state.clone()
            }
            (_, BookingEvent::SelectSession(id)) => BookingState::SessionSelected { session_id: *id },

            (
                BookingState::SessionSelected { session_id }
                | BookingState::SeatSelected { session_id, .. }
                | BookingState::PurchaseFailed { session_id, .. },
                BookingEvent::SelectSeat(seat_id),
            ) => BookingState::SeatSelected {
                session_id: *session_id,
                seat_id: *seat_id,
            },

            (BookingState::SeatSelected { session_id, seat_id }, BookingEvent::PurchaseStarted) => {
                BookingState::PurchaseInFlight {
                    session_id: *session_id,
                    seat_id: *seat_id,
                }
            }

            (
                BookingState::PurchaseInFlight { session_id, seat_id },
                BookingEvent::PurchaseSucceeded { payment_url },
            ) => BookingState::PurchaseComplete {
                session_id: *session_id,
                seat_id: *seat_id,
                payment_url: payment_url.clone(),
            },

            (
                BookingState::PurchaseInFlight { session_id, seat_id },
                BookingEvent::PurchaseFailed { reason },
            ) => BookingState::PurchaseFailed {
                session_id: *session_id,
                seat_id: *seat_id,
                reason: reason.clone(),
            },

            (BookingState::PurchaseFailed { session_id, seat_id, .. }, BookingEvent::Acknowledge) => {
                BookingState::SeatSelected {
                    session_id: *session_id,
                    seat_id: *seat_id,
                }
            }

            _ => return Err(rejected(&event)),
        };
        Ok(next)
    }
}

/// Состояние страницы фильма целиком.
#[derive(Debug, Clone, PartialEq)]
pub enum PageState {
    Loading,
    /// Фильма с таким slug нет (404). Это не ошибка.
    NotFound,
    Error(String),
    Ready,
}

/// Что делать после клика по месту.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatAction {
    /// Свободное место выбрано.
    Selected { session_id: i64, seat_id: i64 },
    /// Администратор кликнул по занятому месту: открыть редактор билета.
    EditTicket { session_id: i64, seat_id: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    /// Перейти на страницу оплаты.
    Redirect { payment_url: String },
    /// Покупка доступна только после входа.
    LoginRequired,
    Failed { reason: String },
}

/// Страница фильма: фильм, его сеансы и карта мест выбранного сеанса.
pub struct MovieDetailPage {
    api: ApiClient,
    toasts: Toasts,
    slug: String,
    page: PageState,
    movie: Option<Movie>,
    sessions: Vec<Session>,
    /// Места хранятся вместе с id сеанса, для которого они загружены.
    seats: Option<(i64, Vec<Seat>)>,
    booking: BookingState,
}

impl MovieDetailPage {
    pub fn new(api: ApiClient, toasts: Toasts, slug: impl Into<String>) -> Self {
        Self {
            api,
            toasts,
            slug: slug.into(),
            page: PageState::Loading,
            movie: None,
            sessions: Vec::new(),
            seats: None,
            booking: BookingState::NoSession,
        }
    }

    pub fn page(&self) -> &PageState {
        &self.page
    }

    pub fn movie(&self) -> Option<&Movie> {
        self.movie.as_ref()
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn booking(&self) -> &BookingState {
        &self.booking
    }

    pub fn current_session(&self) -> Option<&Session> {
        let id = self.booking.session_id()?;
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Места текущего сеанса. Места другого сеанса никогда не показываются.
    pub fn seats(&self) -> Option<&[Seat]> {
        match (&self.seats, self.booking.session_id()) {
            (Some((loaded_for, seats)), Some(current)) if *loaded_for == current => Some(seats),
            _ => None,
        }
    }

    pub fn seat_map(&self) -> Option<SeatMap> {
        let fallback = self.current_session().map(|s| s.price).unwrap_or_default();
        self.seats()
            .map(|seats| SeatMap::build(seats, self.booking.seat_id(), fallback))
    }

    pub fn session_options(&self) -> SessionOptions {
        match self.page {
            PageState::Loading => SessionOptions::Loading,
            PageState::Error(_) => SessionOptions::Error,
            _ => SessionOptions::from_sessions(&self.sessions),
        }
    }

    /// Полная загрузка: фильм, сеансы, места.
    pub async fn load(&mut self) -> &PageState {
        self.page = PageState::Loading;
        match self.api.movie(&self.slug).await {
            Ok(Some(movie)) => {
                debug!("Loaded movie {} ({})", movie.slug, movie.id);
                self.movie = Some(movie);
            }
            Ok(None) => {
                info!("Movie {} not found", self.slug);
                self.movie = None;
                self.page = PageState::NotFound;
                return &self.page;
            }
            Err(e) => {
                warn!("Failed to load movie {}: {}", self.slug, e);
                self.page = PageState::Error(e.user_message());
                return &self.page;
            }
        }

        if let Err(e) = self.load_sessions().await {
            self.page = PageState::Error(e.user_message());
            return &self.page;
        }
        self.page = PageState::Ready;
        self.load_seats().await;
        &self.page
    }

    /// Загружает сеансы фильма и при необходимости выбирает первый.
    pub async fn load_sessions(&mut self) -> Result<(), ClientError> {
        let Some(movie_id) = self.movie.as_ref().map(|m| m.id) else {
            return Ok(());
        };
        let sessions = self.api.sessions_for_movie(movie_id).await?;
        let ids = sessions.iter().map(|s| s.id).collect();
        self.sessions = sessions;
        self.booking = self.booking.apply(BookingEvent::SessionsLoaded(ids))?;
        Ok(())
    }

    /// Загружает места текущего сеанса. Ошибка показывается уведомлением.
    pub async fn load_seats(&mut self) {
        let Some(session_id) = self.booking.session_id() else {
            return;
        };
        match self.api.seats_for_session(session_id).await {
            Ok(seats) => self.seats = Some((session_id, seats)),
            Err(e) => {
                self.toasts.error(format!("Failed to load seats: {}", e.user_message()));
            }
        }
    }

    /// Повторная загрузка мест с сервера (после правки билета или неудачной оплаты).
    pub async fn reload_seats(&mut self) {
        let Some(session_id) = self.booking.session_id() else {
            return;
        };
        match self.api.refresh_seats(session_id).await {
            Ok(seats) => self.seats = Some((session_id, seats)),
            Err(e) => {
                self.toasts.error(format!("Failed to load seats: {}", e.user_message()));
            }
        }
    }

    pub async fn select_session(&mut self, session_id: i64) -> Result<(), ClientError> {
        if !self.sessions.iter().any(|s| s.id == session_id) {
            return Err(ClientError::NotFound(format!("session {}", session_id)));
        }
        let next = self.booking.apply(BookingEvent::SelectSession(session_id))?;
        if next == self.booking {
            return Ok(());
        }
        debug!("Session changed to {}", session_id);
        self.booking = next;
        self.load_seats().await;
        Ok(())
    }

    pub fn select_seat(&mut self, seat_id: i64) -> Result<SeatAction, ClientError> {
        let session_id = self.booking.session_id().ok_or_else(|| ClientError::InvalidTransition {
            state: self.booking.name().to_string(),
            event: "SelectSeat".to_string(),
        })?;
        let seat = self
            .seats()
            .and_then(|seats| seats.iter().find(|s| s.id == seat_id))
            .ok_or_else(|| ClientError::NotFound(format!("seat {} in session {}", seat_id, session_id)))?;

        if seat.is_reserved() {
            if self.api.auth().is_admin() {
                return Ok(SeatAction::EditTicket { session_id, seat_id });
            }
            return Err(ClientError::InvalidTransition {
                state: self.booking.name().to_string(),
                event: "SelectReservedSeat".to_string(),
            });
        }

        self.booking = self.booking.apply(BookingEvent::SelectSeat(seat_id))?;
        Ok(SeatAction::Selected { session_id, seat_id })
    }

    /// Создаёт платёж за выбранное место.
    pub async fn purchase(&mut self) -> Result<PurchaseOutcome, ClientError> {
        if !self.api.auth().is_authenticated() {
            return Ok(PurchaseOutcome::LoginRequired);
        }
        let in_flight = self.booking.apply(BookingEvent::PurchaseStarted)?;
        let (Some(session_id), Some(seat_id)) = (in_flight.session_id(), in_flight.seat_id()) else {
            return Err(ClientError::InvalidTransition {
                state: self.booking.name().to_string(),
                event: "PurchaseStarted".to_string(),
            });
        };
        self.booking = in_flight;

        match self.api.create_payment(session_id, seat_id).await {
            Ok(link) => {
                self.booking = self.booking.apply(BookingEvent::PurchaseSucceeded {
                    payment_url: link.url.clone(),
                })?;
                Ok(PurchaseOutcome::Redirect { payment_url: link.url })
            }
            Err(e) => {
                let reason = e.user_message();
                self.booking = self.booking.apply(BookingEvent::PurchaseFailed {
                    reason: reason.clone(),
                })?;
                self.toasts.error(format!("Failed to create payment: {}", reason));
                self.booking = self.booking.apply(BookingEvent::Acknowledge)?;
                // Место могли занять, пока пользователь думал
                self.reload_seats().await;
                if self.seats().is_some_and(|seats| {
                    seats.iter().any(|s| s.id == seat_id && s.is_reserved())
                }) {
                    self.toasts.warning(format!("Seat {} has just been taken", seat_id));
                    self.booking = BookingState::SessionSelected { session_id };
                }
                Ok(PurchaseOutcome::Failed { reason })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seat_selected(session_id: i64, seat_id: i64) -> BookingState {
        BookingState::SeatSelected { session_id, seat_id }
    }

    #[test]
    fn first_session_is_selected_when_nothing_is() {
        let state = BookingState::NoSession
            .apply(BookingEvent::SessionsLoaded(vec![5, 6]))
            .unwrap();
        assert_eq!(state, BookingState::SessionSelected { session_id: 5 });

        let empty = state.apply(BookingEvent::SessionsLoaded(vec![])).unwrap();
        assert_eq!(empty, BookingState::NoSession);
    }

    #[test]
    fn refetch_keeps_valid_selection() {
        let state = seat_selected(6, 1);
        let next = state.apply(BookingEvent::SessionsLoaded(vec![5, 6])).unwrap();
        assert_eq!(next, state);

        let gone = state.apply(BookingEvent::SessionsLoaded(vec![5])).unwrap();
        assert_eq!(gone, BookingState::SessionSelected { session_id: 5 });
    }

    #[test]
    fn switching_session_drops_seat_even_if_it_exists_there() {
        let state = BookingState::SessionSelected { session_id: 1 }
            .apply(BookingEvent::SelectSeat(10))
            .unwrap();
        let next = state.apply(BookingEvent::SelectSession(2)).unwrap();
        assert_eq!(next, BookingState::SessionSelected { session_id: 2 });
        assert_eq!(next.seat_id(), None);
    }

    #[test]
    fn reselecting_same_session_is_a_noop() {
        let state = seat_selected(1, 10);
        assert_eq!(state.apply(BookingEvent::SelectSession(1)).unwrap(), state);
    }

    #[test]
    fn purchase_cycle() {
        let in_flight = seat_selected(1, 10).apply(BookingEvent::PurchaseStarted).unwrap();
        assert!(in_flight.apply(BookingEvent::SelectSeat(11)).is_err());
        assert!(in_flight.apply(BookingEvent::SelectSession(2)).is_err());

        let failed = in_flight
            .apply(BookingEvent::PurchaseFailed {
                reason: "seat taken".to_string(),
            })
            .unwrap();
        assert_eq!(failed.apply(BookingEvent::Acknowledge).unwrap(), seat_selected(1, 10));

        let done = in_flight
            .apply(BookingEvent::PurchaseSucceeded {
                payment_url: "https://pay/1".to_string(),
            })
            .unwrap();
        assert_eq!(done.name(), "PurchaseComplete");
    }

    #[test]
    fn invalid_transitions_are_reported() {
        let err = BookingState::NoSession.apply(BookingEvent::SelectSeat(1)).unwrap_err();
        match err {
            ClientError::InvalidTransition { state, event } => {
                assert_eq!(state, "NoSession");
                assert_eq!(event, "SelectSeat");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(BookingState::SessionSelected { session_id: 1 }
            .apply(BookingEvent::PurchaseStarted)
            .is_err());
    }

    fn event() -> impl Strategy<Value = BookingEvent> {
        prop_oneof![
            (1i64..4).prop_map(BookingEvent::SelectSession),
            (1i64..6).prop_map(BookingEvent::SelectSeat),
            proptest::collection::vec(1i64..4, 0..3).prop_map(BookingEvent::SessionsLoaded),
            Just(BookingEvent::PurchaseStarted),
            Just(BookingEvent::Acknowledge),
            Just(BookingEvent::PurchaseFailed {
                reason: "x".to_string()
            }),
        ]
    }

    proptest! {
        #[test]
        fn seat_is_cleared_whenever_session_changes(events in proptest::collection::vec(event(), 1..40)) {
            let mut state = BookingState::NoSession;
            for event in events {
                match state.apply(event) {
                    Ok(next) => {
                        if next.session_id() != state.session_id() {
                            prop_assert_eq!(next.seat_id(), None);
                        }
                        state = next;
                    }
                    Err(ClientError::InvalidTransition { .. }) => {}
                    Err(other) => prop_assert!(false, "unexpected error {:?}", other),
                }
                if state.seat_id().is_some() {
                    prop_assert!(state.session_id().is_some());
                }
            }
        }
    }
}

mod common;

use serde_json::json;
use wiremock::{
    matchers::{body_json, method, path},
    Mock, ResponseTemplate,
};

use cinema_client::{
    error::ClientError,
    notify::Level,
    services::booking::{BookingState, MovieDetailPage, PageState, PurchaseOutcome, SeatAction},
};
use common::{data, harness, log_in, movie_json, seat_json, session_json, Harness};

async fn mount_movie_with_two_sessions(h: &Harness) {
    Mock::given(method("GET"))
        .and(path("/movies/dune"))
        .respond_with(data(movie_json(1, "dune")))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sessions/movie/1"))
        .respond_with(data(json!([session_json(10, 1, 120.0), session_json(20, 1, 90.0)])))
        .mount(&h.server)
        .await;
    // Одинаковые id мест в обоих сеансах
    Mock::given(method("GET"))
        .and(path("/seats/session/10"))
        .respond_with(data(json!([seat_json(100, 1, 1, false), seat_json(101, 1, 2, true)])))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/seats/session/20"))
        .respond_with(data(json!([seat_json(100, 1, 1, false)])))
        .mount(&h.server)
        .await;
}

fn page(h: &Harness) -> MovieDetailPage {
    MovieDetailPage::new(h.api.clone(), h.toasts.clone(), "dune")
}

#[tokio::test]
async fn missing_movie_is_not_found_rather_than_error() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/movies/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sessions/movie/1"))
        .respond_with(data(json!([])))
        .expect(0)
        .mount(&h.server)
        .await;

    let mut page = MovieDetailPage::new(h.api.clone(), h.toasts.clone(), "nope");
    assert_eq!(*page.load().await, PageState::NotFound);
    assert!(page.movie().is_none());
}

#[tokio::test]
async fn server_failure_is_an_error_page() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/movies/dune"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .mount(&h.server)
        .await;

    let mut page = page(&h);
    assert_eq!(*page.load().await, PageState::Error("boom".to_string()));
}

#[tokio::test]
async fn first_session_is_picked_and_its_seats_loaded() {
    let h = harness().await;
    mount_movie_with_two_sessions(&h).await;

    let mut page = page(&h);
    assert_eq!(*page.load().await, PageState::Ready);
    assert_eq!(*page.booking(), BookingState::SessionSelected { session_id: 10 });
    let map = page.seat_map().unwrap();
    assert_eq!(map.seat_count(), 2);
}

#[tokio::test]
async fn switching_session_clears_the_seat_even_if_it_exists_there() {
    let h = harness().await;
    mount_movie_with_two_sessions(&h).await;

    let mut page = page(&h);
    page.load().await;
    assert_eq!(
        page.select_seat(100).unwrap(),
        SeatAction::Selected {
            session_id: 10,
            seat_id: 100
        }
    );

    page.select_session(20).await.unwrap();
    assert_eq!(*page.booking(), BookingState::SessionSelected { session_id: 20 });
    assert_eq!(page.booking().seat_id(), None);
    assert_eq!(page.seats().map(|s| s.len()), Some(1));
}

#[tokio::test]
async fn reserved_seat_is_rejected_for_viewers_and_opens_editor_for_admins() {
    let h = harness().await;
    mount_movie_with_two_sessions(&h).await;
    let mut page = page(&h);
    page.load().await;

    let err = page.select_seat(101).unwrap_err();
    assert!(matches!(err, ClientError::InvalidTransition { .. }));
    assert_eq!(*page.booking(), BookingState::SessionSelected { session_id: 10 });

    assert!(matches!(page.select_seat(999), Err(ClientError::NotFound(_))));

    log_in(&h, true).await;
    assert_eq!(
        page.select_seat(101).unwrap(),
        SeatAction::EditTicket {
            session_id: 10,
            seat_id: 101
        }
    );
    assert_eq!(page.booking().seat_id(), None);
}

#[tokio::test]
async fn purchase_requires_login() {
    let h = harness().await;
    mount_movie_with_two_sessions(&h).await;
    Mock::given(method("POST"))
        .and(path("/payments/create"))
        .respond_with(data(json!({})))
        .expect(0)
        .mount(&h.server)
        .await;

    let mut page = page(&h);
    page.load().await;
    page.select_seat(100).unwrap();
    assert_eq!(page.purchase().await.unwrap(), PurchaseOutcome::LoginRequired);
}

#[tokio::test]
async fn purchase_redirects_to_payment_page() {
    let h = harness().await;
    mount_movie_with_two_sessions(&h).await;
    log_in(&h, false).await;
    Mock::given(method("POST"))
        .and(path("/payments/create"))
        .and(body_json(json!({"session_id": 10, "seat_id": 100})))
        .respond_with(data(json!({
            "order_id": 77,
            "status": "pending",
            "url": "https://pay.example/77"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut page = page(&h);
    page.load().await;
    page.select_seat(100).unwrap();
    assert_eq!(
        page.purchase().await.unwrap(),
        PurchaseOutcome::Redirect {
            payment_url: "https://pay.example/77".to_string()
        }
    );
    assert_eq!(page.booking().name(), "PurchaseComplete");
}

#[tokio::test]
async fn failed_purchase_returns_to_selected_seat_with_toast() {
    let h = harness().await;
    mount_movie_with_two_sessions(&h).await;
    log_in(&h, false).await;
    Mock::given(method("POST"))
        .and(path("/payments/create"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({"error": "gateway down"})))
        .mount(&h.server)
        .await;

    let mut page = page(&h);
    page.load().await;
    page.select_seat(100).unwrap();

    let outcome = page.purchase().await.unwrap();
    assert_eq!(
        outcome,
        PurchaseOutcome::Failed {
            reason: "gateway down".to_string()
        }
    );
    assert_eq!(
        *page.booking(),
        BookingState::SeatSelected {
            session_id: 10,
            seat_id: 100
        }
    );
    let toast = h.toasts.last().unwrap();
    assert_eq!(toast.level, Level::Error);
    assert!(toast.message.contains("gateway down"));
}

#[tokio::test]
async fn seat_taken_during_purchase_is_released_with_warning() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/movies/dune"))
        .respond_with(data(movie_json(1, "dune")))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sessions/movie/1"))
        .respond_with(data(json!([session_json(10, 1, 120.0)])))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/seats/session/10"))
        .respond_with(data(json!([seat_json(100, 1, 1, false)])))
        .up_to_n_times(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/seats/session/10"))
        .respond_with(data(json!([seat_json(100, 1, 1, true)])))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/payments/create"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"error": "seat is reserved"})))
        .mount(&h.server)
        .await;
    log_in(&h, false).await;

    let mut page = page(&h);
    page.load().await;
    page.select_seat(100).unwrap();
    assert!(matches!(page.purchase().await.unwrap(), PurchaseOutcome::Failed { .. }));

    assert_eq!(*page.booking(), BookingState::SessionSelected { session_id: 10 });
    let toast = h.toasts.last().unwrap();
    assert_eq!(toast.level, Level::Warning);
    assert!(toast.message.contains("100"));
}

#[tokio::test]
async fn purchase_without_seat_is_invalid() {
    let h = harness().await;
    mount_movie_with_two_sessions(&h).await;
    log_in(&h, false).await;

    let mut page = page(&h);
    page.load().await;
    let err = page.purchase().await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidTransition { .. }));
}

#[tokio::test]
async fn reads_are_served_from_cache() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/movies"))
        .respond_with(data(json!([movie_json(1, "dune")])))
        .expect(1)
        .mount(&h.server)
        .await;

    let query = cinema_client::models::MoviesQuery::default();
    assert_eq!(h.api.list_movies(&query).await.unwrap().len(), 1);
    assert_eq!(h.api.list_movies(&query).await.unwrap().len(), 1);
}

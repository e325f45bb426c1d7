// tests/integration_tests.rs
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use homework_status_bot::api_client::{PracticumClient, StatusSource};
use homework_status_bot::config::{ApiConfig, PollerSettings, TelegramConfig, Verdicts};
use homework_status_bot::errors::{BotError, DeliveryFailure};
use homework_status_bot::models::HomeworkStatus;
use homework_status_bot::notifier::{Notifier, TelegramNotifier};
use homework_status_bot::poller::{CycleOutcome, PollingLoop};
use homework_status_bot::store::{SqliteStore, StateStore};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct FakeUpstream {
    replies: Mutex<VecDeque<(u16, Value)>>,
    plain_text: Mutex<Option<String>>,
    requests: Mutex<Vec<(String, String)>>,
}

#[derive(Default)]
struct FakeTelegram {
    messages: Mutex<Vec<Value>>,
    blocked: AtomicBool,
}

async fn homework_statuses(
    req: HttpRequest,
    query: web::Query<HashMap<String, String>>,
    upstream: web::Data<FakeUpstream>,
) -> HttpResponse {
    let auth = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let from_date = query.get("from_date").cloned().unwrap_or_default();
    upstream.requests.lock().unwrap().push((auth, from_date));

    if let Some(text) = upstream.plain_text.lock().unwrap().take() {
        return HttpResponse::Ok().content_type("text/html").body(text);
    }

    let reply = upstream.replies.lock().unwrap().pop_front();
    match reply {
        Some((200, body)) => HttpResponse::Ok().json(body),
        Some((status, body)) => HttpResponse::build(
            actix_web::http::StatusCode::from_u16(status).unwrap(),
        )
        .json(body),
        None => HttpResponse::Ok().json(json!({"homeworks": [], "current_date": 0})),
    }
}

async fn send_message(
    path: web::Path<String>,
    body: web::Json<Value>,
    telegram: web::Data<FakeTelegram>,
) -> HttpResponse {
    assert_eq!(path.into_inner(), "bott-token");
    if telegram.blocked.load(Ordering::SeqCst) {
        return HttpResponse::Forbidden().json(json!({
            "ok": false,
            "error_code": 403,
            "description": "Forbidden: bot was blocked by the user"
        }));
    }
    telegram.messages.lock().unwrap().push(body.into_inner());
    HttpResponse::Ok().json(json!({"ok": true, "result": {"message_id": 1}}))
}

/// Starts fake homework and Telegram APIs on one local port and returns its base URL.
fn start_fakes(upstream: web::Data<FakeUpstream>, telegram: web::Data<FakeTelegram>) -> String {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(upstream.clone())
            .app_data(telegram.clone())
            .route("/statuses/", web::get().to(homework_statuses))
            .route("/{bot}/sendMessage", web::post().to(send_message))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();

    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());
    format!("http://{}", addr)
}

fn api_config(base: &str) -> ApiConfig {
    ApiConfig {
        endpoint: format!("{}/statuses/", base),
        token: "p-token".to_string(),
        timeout: Duration::from_secs(5),
    }
}

fn telegram_config(base: &str) -> TelegramConfig {
    TelegramConfig {
        api_base: base.to_string(),
        bot_token: "t-token".to_string(),
        chat_id: "42".to_string(),
        timeout: Duration::from_secs(5),
    }
}

async fn poller_against(
    base: &str,
) -> PollingLoop<PracticumClient, TelegramNotifier> {
    let store: Arc<dyn StateStore> = Arc::new(SqliteStore::in_memory().await.unwrap());
    PollingLoop::new(
        PracticumClient::new(api_config(base)).unwrap(),
        TelegramNotifier::new(telegram_config(base)).unwrap(),
        store,
        PollerSettings::default(),
    )
}

#[actix_rt::test]
async fn test_status_change_is_sent_and_persisted() {
    let upstream = web::Data::new(FakeUpstream::default());
    let telegram = web::Data::new(FakeTelegram::default());
    upstream.replies.lock().unwrap().extend([
        (200, json!({"homeworks": [{"homework_name": "hw_bot", "status": "reviewing"}], "current_date": 1000})),
        (200, json!({"homeworks": [{"homework_name": "hw_bot", "status": "approved"}], "current_date": 2000})),
        (200, json!({"homeworks": [{"homework_name": "hw_bot", "status": "approved"}], "current_date": 2100})),
    ]);
    let base = start_fakes(upstream.clone(), telegram.clone());
    let poller = poller_against(&base).await;

    assert!(matches!(poller.run_cycle().await, CycleOutcome::Notified(_)));
    assert!(matches!(poller.run_cycle().await, CycleOutcome::Notified(_)));
    assert_eq!(poller.run_cycle().await, CycleOutcome::Unchanged);

    let messages = telegram.messages.lock().unwrap().clone();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1]["chat_id"], "42");
    assert_eq!(
        messages[1]["text"],
        format!("Homework status changed for \"hw_bot\". {}", Verdicts::default().approved)
    );

    let requests = upstream.requests.lock().unwrap().clone();
    assert!(requests.iter().all(|(auth, _)| auth == "OAuth p-token"));
    assert_eq!(requests[1].1, "1000");
    assert_eq!(requests[2].1, "2000");

    let last = poller.store().last_submission().await.unwrap().unwrap();
    assert_eq!(last.status, HomeworkStatus::Approved);
    assert_eq!(last.cursor, 2000);
}

#[actix_rt::test]
async fn test_repeated_upstream_failure_is_reported_once() {
    let upstream = web::Data::new(FakeUpstream::default());
    let telegram = web::Data::new(FakeTelegram::default());
    upstream.replies.lock().unwrap().extend([
        (500, json!({"error": "boom"})),
        (500, json!({"error": "boom"})),
        (500, json!({"error": "boom"})),
    ]);
    let base = start_fakes(upstream.clone(), telegram.clone());
    let poller = poller_against(&base).await;

    assert!(matches!(poller.run_cycle().await, CycleOutcome::ErrorReported(_)));
    assert!(matches!(poller.run_cycle().await, CycleOutcome::ErrorSuppressed(_)));
    assert!(matches!(poller.run_cycle().await, CycleOutcome::ErrorSuppressed(_)));

    let messages = telegram.messages.lock().unwrap().clone();
    assert_eq!(messages.len(), 1);
    let text = messages[0]["text"].as_str().unwrap();
    assert!(text.starts_with("Program failure:"));
    assert!(text.contains("500"));

    let recorded = poller.store().last_error().await.unwrap().unwrap();
    assert_eq!(recorded.message, text);
}

#[actix_rt::test]
async fn test_client_reports_http_status() {
    let upstream = web::Data::new(FakeUpstream::default());
    let telegram = web::Data::new(FakeTelegram::default());
    upstream.replies.lock().unwrap().push_back((401, json!({"code": "not_authenticated"})));
    let base = start_fakes(upstream, telegram);

    let client = PracticumClient::new(api_config(&base)).unwrap();
    match client.fetch(0).await {
        Err(BotError::HttpStatusNotOk { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("not_authenticated"));
        }
        other => panic!("expected HttpStatusNotOk, got {:?}", other),
    }
}

/// A local port with nothing listening on it.
fn closed_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[actix_rt::test]
async fn test_client_rejects_non_json_body() {
    let upstream = web::Data::new(FakeUpstream::default());
    let telegram = web::Data::new(FakeTelegram::default());
    *upstream.plain_text.lock().unwrap() = Some("<html>maintenance</html>".to_string());
    let base = start_fakes(upstream, telegram);

    let client = PracticumClient::new(api_config(&base)).unwrap();
    assert!(matches!(
        client.fetch(0).await,
        Err(BotError::UpstreamUnavailable(_))
    ));
}

#[actix_rt::test]
async fn test_unreachable_telegram_does_not_leak_bot_token() {
    let upstream = web::Data::new(FakeUpstream::default());
    let telegram = web::Data::new(FakeTelegram::default());
    upstream.replies.lock().unwrap().push_back((
        200,
        json!({"homeworks": [{"homework_name": "hw_bot", "status": "approved"}], "current_date": 1000}),
    ));
    let base = start_fakes(upstream, telegram);

    let mut tg_config = telegram_config(&format!("http://127.0.0.1:{}", closed_port()));
    tg_config.bot_token = "123456:SECRET-TOKEN".to_string();
    let store: Arc<dyn StateStore> = Arc::new(SqliteStore::in_memory().await.unwrap());
    let poller = PollingLoop::new(
        PracticumClient::new(api_config(&base)).unwrap(),
        TelegramNotifier::new(tg_config).unwrap(),
        store,
        PollerSettings::default(),
    );

    match poller.run_cycle().await {
        CycleOutcome::ErrorReported(msg) => {
            assert!(msg.starts_with("Program failure: Failed to send Telegram message"));
            assert!(!msg.contains("SECRET-TOKEN"), "{}", msg);
        }
        other => panic!("expected ErrorReported, got {:?}", other),
    }

    let recorded = poller.store().last_error().await.unwrap().unwrap();
    assert!(!recorded.message.contains("SECRET-TOKEN"));
    assert!(poller.store().last_submission().await.unwrap().is_none());
}

#[actix_rt::test]
async fn test_client_reports_unreachable_upstream() {
    let port = closed_port();
    let client = PracticumClient::new(api_config(&format!("http://127.0.0.1:{}", port))).unwrap();

    assert!(matches!(
        client.fetch(0).await,
        Err(BotError::UpstreamUnavailable(_))
    ));
}

#[actix_rt::test]
async fn test_notifier_surfaces_telegram_rejection() {
    let upstream = web::Data::new(FakeUpstream::default());
    let telegram = web::Data::new(FakeTelegram::default());
    telegram.blocked.store(true, Ordering::SeqCst);
    let base = start_fakes(upstream, telegram.clone());

    let notifier = TelegramNotifier::new(telegram_config(&base)).unwrap();
    match notifier.send("hello").await {
        Err(BotError::NotificationDelivery(DeliveryFailure::Rejected { status, description })) => {
            assert_eq!(status, 403);
            assert!(description.contains("blocked"));
        }
        other => panic!("expected NotificationDelivery, got {:?}", other),
    }
    assert!(telegram.messages.lock().unwrap().is_empty());
}

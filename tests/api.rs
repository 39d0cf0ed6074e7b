mod helpers;

use helpers::{sign_payload, spawn_app};
use lembra_api_structs::event::ListEventsResponse;
use lembra_api_structs::user::UserDTO;
use lembra_domain::{EventEntities, Intent, IntentEnvelope};
use std::time::Duration;

#[actix_web::test]
async fn health_check_works() {
    let app = spawn_app().await;

    let res = reqwest::get(format!("{}/health", app.address))
        .await
        .expect("health request succeeds");
    assert!(res.status().is_success());
}

#[actix_web::test]
async fn inbound_message_provisions_user_and_creates_event() {
    let app = spawn_app().await;

    let starts_at = chrono::Utc::now() + chrono::Duration::hours(4);
    app.llm.push(IntentEnvelope {
        intent: Intent::CreateEvent,
        entities: EventEntities {
            title: Some("dentista".into()),
            starts_at: Some(starts_at),
            ..Default::default()
        },
        confidence: 0.95,
        follow_up_question: None,
        notes: None,
    });

    let body = r#"{
        "results": [{
            "messageId": "e2e-1",
            "from": "+5511999999999",
            "to": "+5511000000000",
            "receivedAt": "2025-08-20T12:00:00Z",
            "message": {"type": "TEXT", "text": "Marcar dentista"}
        }]
    }"#;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/webhook/whatsapp", app.address))
        .header("Content-Type", "application/json")
        .header("X-Signature-256", sign_payload(&app.webhook_secret, body))
        .body(body)
        .send()
        .await
        .expect("webhook request succeeds");
    assert!(res.status().is_success());

    // processing happens on a background task; poll until the reply lands
    for _ in 0..100 {
        if !app.sender.sent_to().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let sent = app.sender.sent_to();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.starts_with("✅ Evento criado: dentista"));

    // the auto-provisioned user can use the REST API right away
    let res = client
        .get(format!("{}/api/v1/profile", app.address))
        .header("X-WA-Number", "+5511999999999")
        .send()
        .await
        .expect("profile request succeeds");
    assert!(res.status().is_success());
    let profile: UserDTO = res.json().await.unwrap();
    assert!(profile.is_active);

    let res = client
        .get(format!("{}/api/v1/events", app.address))
        .header("X-WA-Number", "+5511999999999")
        .send()
        .await
        .expect("events request succeeds");
    let events: ListEventsResponse = res.json().await.unwrap();
    assert_eq!(events.events.len(), 1);
    assert_eq!(events.events[0].title, "dentista");
}

#[actix_web::test]
async fn webhook_rejects_a_bad_signature() {
    let app = spawn_app().await;

    let res = reqwest::Client::new()
        .post(format!("{}/webhook/whatsapp", app.address))
        .header("Content-Type", "application/json")
        .header("X-Signature-256", "deadbeef")
        .body(r#"{"results": []}"#)
        .send()
        .await
        .expect("webhook request succeeds");
    assert_eq!(res.status().as_u16(), 401);
}

#[actix_web::test]
async fn protected_routes_require_a_known_number() {
    let app = spawn_app().await;

    let res = reqwest::Client::new()
        .get(format!("{}/api/v1/events", app.address))
        .send()
        .await
        .expect("events request succeeds");
    assert_eq!(res.status().as_u16(), 401);

    let res = reqwest::Client::new()
        .get(format!("{}/api/v1/events", app.address))
        .header("X-WA-Number", "+5511777000111")
        .send()
        .await
        .expect("events request succeeds");
    assert_eq!(res.status().as_u16(), 401);
}

use crate::message::ProcessInboundMessageUseCase;
use crate::shared::rate_limit::RateLimiter;
use crate::shared::usecase::execute;
use actix_web::{web, HttpRequest, HttpResponse};
use lembra_api_structs::status::{ErrorResponse, StatusResponse};
use lembra_infra::{LembraContext, WebhookRequest};
use tracing::{error, info, warn};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/webhook/whatsapp", web::post().to(webhook_controller));
}

const SIGNATURE_HEADER: &str = "X-Signature-256";

/// Accepts a provider delivery: verifies the HMAC over the raw body, parses
/// the payload and hands the extracted messages to the inbound pipeline on a
/// background task. Messages of one delivery are processed sequentially so
/// replies to the same sender keep their order.
pub async fn webhook_controller(
    http_req: HttpRequest,
    body: web::Bytes,
    ctx: web::Data<LembraContext>,
    rate_limiter: web::Data<RateLimiter>,
) -> HttpResponse {
    let signature = http_req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !ctx
        .services
        .webhook_verifier
        .verify_signature(&body, signature)
    {
        warn!("Invalid webhook signature");
        return HttpResponse::Unauthorized().json(ErrorResponse {
            error: "unauthorized".into(),
            message: "Invalid signature".into(),
        });
    }

    let request: WebhookRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            error!("Failed to parse webhook payload: {:?}", e);
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "invalid_request".into(),
                message: "Invalid JSON payload".into(),
            });
        }
    };

    let mut messages = request.extract_messages();
    info!("Received provider messages, count: {}", messages.len());

    let now = ctx.sys.now();
    messages.retain(|message| {
        let allowed = rate_limiter.allow(&message.from, now);
        if !allowed {
            warn!("Rate limit exceeded for number: {}", message.from);
        }
        allowed
    });

    if !messages.is_empty() {
        let ctx = ctx.into_inner();
        actix_web::rt::spawn(async move {
            for message in messages {
                let usecase = ProcessInboundMessageUseCase { message };
                let _ = execute(usecase, &ctx).await;
            }
        });
    }

    HttpResponse::Ok().json(StatusResponse::ok())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_helpers::{setup, TestHarness};
    use actix_web::{test, App};
    use lembra_domain::{Intent, IntentEnvelope};
    use lembra_infra::HmacWebhookVerifier;
    use std::sync::Arc;

    async fn post_webhook(
        harness: &TestHarness,
        rate_limit: u32,
        body: &'static str,
        signature: Option<&str>,
    ) -> u16 {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(harness.ctx.clone()))
                .app_data(web::Data::new(RateLimiter::new(rate_limit)))
                .configure(configure_routes),
        )
        .await;

        let mut req = test::TestRequest::post()
            .uri("/webhook/whatsapp")
            .insert_header(("Content-Type", "application/json"))
            .set_payload(body);
        if let Some(signature) = signature {
            req = req.insert_header((SIGNATURE_HEADER, signature));
        }

        let res = test::call_service(&app, req.to_request()).await;
        res.status().as_u16()
    }

    async fn wait_for_replies(harness: &TestHarness, expected: usize) {
        for _ in 0..100 {
            if harness.sender.sent_to().len() >= expected {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("expected {} replies, got {:?}", expected, harness.sender.sent_to());
    }

    fn text_message_body() -> &'static str {
        r#"{
            "results": [{
                "messageId": "m-123",
                "from": "+5511999999999",
                "to": "+5511000000000",
                "receivedAt": "2025-08-20T12:00:00Z",
                "message": {"type": "TEXT", "text": "oi"}
            }]
        }"#
    }

    #[actix_web::test]
    async fn empty_results_is_accepted_without_side_effects() {
        let harness = setup();
        let status = post_webhook(&harness, 30, r#"{"results": []}"#, None).await;
        assert_eq!(status, 200);
        assert!(harness.sender.sent_to().is_empty());
    }

    #[actix_web::test]
    async fn signature_mismatch_is_rejected_before_any_logging() {
        let mut harness = setup();
        harness.ctx.services.webhook_verifier = Arc::new(HmacWebhookVerifier::new("secret"));

        let status = post_webhook(&harness, 30, text_message_body(), Some("deadbeef")).await;
        assert_eq!(status, 401);
        assert!(!harness.ctx.repos.inbound_messages.exists("m-123").await);
        assert!(harness.sender.sent_to().is_empty());
    }

    #[actix_web::test]
    async fn malformed_json_is_a_bad_request() {
        let harness = setup();
        let status = post_webhook(&harness, 30, "{not json", None).await;
        assert_eq!(status, 400);
    }

    #[actix_web::test]
    async fn text_message_flows_through_the_pipeline() {
        let harness = setup();
        harness.llm.push(IntentEnvelope {
            intent: Intent::SmallTalk,
            entities: Default::default(),
            confidence: 1.0,
            follow_up_question: None,
            notes: None,
        });

        let status = post_webhook(&harness, 30, text_message_body(), None).await;
        assert_eq!(status, 200);

        wait_for_replies(&harness, 1).await;
        assert!(harness.ctx.repos.inbound_messages.exists("m-123").await);
    }

    #[actix_web::test]
    async fn rate_limited_messages_are_dropped_silently() {
        let harness = setup();
        harness.llm.push(IntentEnvelope {
            intent: Intent::SmallTalk,
            entities: Default::default(),
            confidence: 1.0,
            follow_up_question: None,
            notes: None,
        });

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(harness.ctx.clone()))
                .app_data(web::Data::new(RateLimiter::new(1)))
                .configure(configure_routes),
        )
        .await;

        for (id, payload) in [
            ("a", r#"{"results": [{"messageId": "rl-a", "from": "+5511999999999", "to": "x", "receivedAt": "2025-08-20T12:00:00Z", "message": {"type": "TEXT", "text": "um"}}]}"#),
            ("b", r#"{"results": [{"messageId": "rl-b", "from": "+5511999999999", "to": "x", "receivedAt": "2025-08-20T12:00:01Z", "message": {"type": "TEXT", "text": "dois"}}]}"#),
        ] {
            let req = test::TestRequest::post()
                .uri("/webhook/whatsapp")
                .insert_header(("Content-Type", "application/json"))
                .set_payload(payload)
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status().as_u16(), 200, "delivery {}", id);
        }

        wait_for_replies(&harness, 1).await;
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(harness.sender.sent_to().len(), 1);
        assert!(!harness.ctx.repos.inbound_messages.exists("rl-b").await);
    }
}

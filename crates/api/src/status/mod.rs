use actix_web::{web, HttpResponse};
use lembra_api_structs::status::{ErrorResponse, StatusResponse};
use lembra_infra::LembraContext;
use tracing::error;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
    cfg.route("/ready", web::get().to(ready));
    cfg.route("/metrics", web::get().to(metrics));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(StatusResponse::ok())
}

async fn ready(ctx: web::Data<LembraContext>) -> HttpResponse {
    match ctx.repos.check_connection().await {
        Ok(()) => HttpResponse::Ok().json(StatusResponse::ok()),
        Err(e) => {
            error!("Readiness probe failed: {:?}", e);
            HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: "db_unavailable".into(),
                message: "Database is not reachable".into(),
            })
        }
    }
}

async fn metrics(ctx: web::Data<LembraContext>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(ctx.metrics.export())
}

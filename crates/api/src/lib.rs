mod error;
mod event;
mod llm;
mod message;
mod shared;
mod status;
mod user;
mod webhook;
mod workers;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::LembraError;
pub use message::ProcessInboundMessageUseCase;
pub use workers::ReminderWorker;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use lembra_infra::LembraContext;
use shared::rate_limit::RateLimiter;
use std::net::TcpListener;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_actix_web::TracingLogger;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    event::configure_routes(cfg);
    llm::configure_routes(cfg);
    user::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
    context: LembraContext,
}

impl Application {
    pub async fn new(context: LembraContext) -> anyhow::Result<Self> {
        let (server, port) = Application::configure_server(context.clone())?;

        Ok(Self {
            server,
            port,
            context,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn configure_server(context: LembraContext) -> anyhow::Result<(Server, u16)> {
        let address = format!("0.0.0.0:{}", context.config.port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();
        let rate_limiter = web::Data::new(RateLimiter::new(context.config.rate_limit_per_minute));

        let server = HttpServer::new(move || {
            let ctx = context.clone();

            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(ctx))
                .app_data(rate_limiter.clone())
                .configure(status::configure_routes)
                .configure(webhook::configure_routes)
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .disable_signals()
        .shutdown_timeout(30)
        .run();

        Ok((server, port))
    }

    /// Runs the reminder worker and the HTTP server in parallel until the
    /// process receives SIGINT/SIGTERM, then shuts both down gracefully:
    /// no new work is started, in-flight handlers get up to the server
    /// shutdown budget, and the worker finishes its in-flight event.
    pub async fn start(self) -> anyhow::Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker = Arc::new(ReminderWorker::new(self.context.clone()));
        let worker_task = {
            let worker = worker.clone();
            tokio::spawn(async move { worker.start(shutdown_rx).await })
        };

        let server_handle = self.server.handle();
        let server_task = tokio::spawn(self.server);

        wait_for_termination().await;
        info!("Termination signal received. Shutting down gracefully...");

        let _ = shutdown_tx.send(true);
        server_handle.stop(true).await;

        match worker_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Reminder worker error: {:?}", e),
            Err(e) => error!("Reminder worker task failed: {:?}", e),
        }
        match server_task.await {
            Ok(res) => res?,
            Err(e) => error!("HTTP server task failed: {:?}", e),
        }

        info!("Shutdown complete");
        Ok(())
    }
}

#[cfg(unix)]
async fn wait_for_termination() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler installs");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_termination() {
    let _ = tokio::signal::ctrl_c().await;
}

mod cancel_event;
mod confirm_event;
mod create_event;
mod get_event;
mod list_events;
mod update_event;

pub use cancel_event::CancelEventUseCase;
pub use confirm_event::ConfirmEventUseCase;
pub use create_event::CreateEventUseCase;
pub use get_event::GetEventUseCase;
pub use list_events::ListEventsUseCase;
pub use update_event::UpdateEventUseCase;

use actix_web::web;
use lembra_domain::{Event, EventIdentifier, ID};
use lembra_infra::Repos;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/events", web::post().to(create_event::create_event_controller));
    cfg.route("/events", web::get().to(list_events::list_events_controller));
    cfg.route("/events/{event_id}", web::get().to(get_event::get_event_controller));
    cfg.route(
        "/events/{event_id}",
        web::put().to(update_event::update_event_controller),
    );
    cfg.route(
        "/events/{event_id}",
        web::delete().to(cancel_event::cancel_event_controller),
    );
    cfg.route(
        "/events/{event_id}/confirm",
        web::post().to(confirm_event::confirm_event_controller),
    );
}

pub(crate) enum ResolveError {
    NotFound,
    Ambiguous,
    Storage(anyhow::Error),
}

/// Caller policy over identifier resolution: 0 matches is `NotFound`, one
/// match is used, two or more is `Ambiguous`.
pub(crate) async fn resolve_event(
    repos: &Repos,
    user_id: &ID,
    identifier: &EventIdentifier,
) -> Result<Event, ResolveError> {
    let mut events = repos
        .events
        .find_by_user_and_identifier(user_id, identifier)
        .await
        .map_err(ResolveError::Storage)?;

    match events.len() {
        0 => Err(ResolveError::NotFound),
        1 => Ok(events.remove(0)),
        _ => Err(ResolveError::Ambiguous),
    }
}

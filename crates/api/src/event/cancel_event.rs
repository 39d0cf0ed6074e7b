use super::{resolve_event, ResolveError};
use crate::error::LembraError;
use crate::shared::auth::protect_route;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use lembra_api_structs::event::EventDTO;
use lembra_domain::{Event, EventIdentifier, EventStatus, ID};
use lembra_infra::LembraContext;

pub async fn cancel_event_controller(
    http_req: HttpRequest,
    path_params: web::Path<String>,
    ctx: web::Data<LembraContext>,
) -> Result<HttpResponse, LembraError> {
    let user = protect_route(&http_req, &ctx).await?;
    let event_id = path_params
        .parse::<ID>()
        .map_err(|e| LembraError::BadClientData(e.to_string()))?;

    let usecase = CancelEventUseCase {
        user_id: user.id,
        identifier: EventIdentifier::for_event(event_id),
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Ok().json(EventDTO::new(event)))
        .map_err(LembraError::from)
}

/// Cancel is idempotent: cancelling an already-canceled event succeeds
/// without touching it.
#[derive(Debug)]
pub struct CancelEventUseCase {
    pub user_id: ID,
    pub identifier: EventIdentifier,
}

#[derive(Debug, thiserror::Error)]
pub enum UseCaseError {
    #[error("event identifier is required")]
    IdentifierRequired,
    #[error("event not found")]
    NotFound,
    #[error("multiple events found, please be more specific")]
    Ambiguous,
    #[error("event is completed and cannot be canceled")]
    AlreadyCompleted,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<UseCaseError> for LembraError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::IdentifierRequired => Self::BadClientData(e.to_string()),
            UseCaseError::NotFound => Self::NotFound(e.to_string()),
            UseCaseError::Ambiguous => Self::AmbiguousIdentifier(e.to_string()),
            UseCaseError::AlreadyCompleted => Self::InvalidTransition(e.to_string()),
            UseCaseError::Internal(_) => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CancelEventUseCase {
    type Response = Event;

    type Error = UseCaseError;

    const NAME: &'static str = "CancelEvent";

    async fn execute(&mut self, ctx: &LembraContext) -> Result<Self::Response, Self::Error> {
        if self.identifier.is_empty() {
            return Err(UseCaseError::IdentifierRequired);
        }

        let identifier = self.identifier.clone();
        let user_id = self.user_id.clone();
        let now = ctx.sys.now();

        ctx.repos
            .with_transaction(|repos| async move {
                let mut event =
                    resolve_event(&repos, &user_id, &identifier)
                        .await
                        .map_err(|e| match e {
                            ResolveError::NotFound => UseCaseError::NotFound,
                            ResolveError::Ambiguous => UseCaseError::Ambiguous,
                            ResolveError::Storage(e) => UseCaseError::Internal(e),
                        })?;

                match event.status {
                    EventStatus::Canceled => Ok(event),
                    EventStatus::Completed => Err(UseCaseError::AlreadyCompleted),
                    EventStatus::Scheduled | EventStatus::Confirmed => {
                        event.status = EventStatus::Canceled;
                        event.updated_at = now;
                        repos.events.save(&event).await?;
                        Ok(event)
                    }
                }
            })
            .await
    }
}

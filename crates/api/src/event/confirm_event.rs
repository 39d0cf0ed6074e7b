use super::{resolve_event, ResolveError};
use crate::error::LembraError;
use crate::shared::auth::protect_route;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use lembra_api_structs::event::EventDTO;
use lembra_domain::{Event, EventIdentifier, EventStatus, ID};
use lembra_infra::LembraContext;

pub async fn confirm_event_controller(
    http_req: HttpRequest,
    path_params: web::Path<String>,
    ctx: web::Data<LembraContext>,
) -> Result<HttpResponse, LembraError> {
    let user = protect_route(&http_req, &ctx).await?;
    let event_id = path_params
        .parse::<ID>()
        .map_err(|e| LembraError::BadClientData(e.to_string()))?;

    let usecase = ConfirmEventUseCase {
        user_id: user.id,
        identifier: EventIdentifier::for_event(event_id),
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Ok().json(EventDTO::new(event)))
        .map_err(LembraError::from)
}

/// `scheduled -> confirmed`; confirming a confirmed event is a no-op success
#[derive(Debug)]
pub struct ConfirmEventUseCase {
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
    #[error("event is {0} and cannot be confirmed")]
    InvalidTransition(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<UseCaseError> for LembraError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::IdentifierRequired => Self::BadClientData(e.to_string()),
            UseCaseError::NotFound => Self::NotFound(e.to_string()),
            UseCaseError::Ambiguous => Self::AmbiguousIdentifier(e.to_string()),
            UseCaseError::InvalidTransition(_) => Self::InvalidTransition(e.to_string()),
            UseCaseError::Internal(_) => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ConfirmEventUseCase {
    type Response = Event;

    type Error = UseCaseError;

    const NAME: &'static str = "ConfirmEvent";

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
                    EventStatus::Scheduled => {
                        event.status = EventStatus::Confirmed;
                        event.updated_at = now;
                        repos.events.save(&event).await?;
                        Ok(event)
                    }
                    EventStatus::Confirmed => Ok(event),
                    status => Err(UseCaseError::InvalidTransition(status.as_str())),
                }
            })
            .await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::CreateEventUseCase;
    use crate::test_helpers::{seed_user, setup};
    use chrono::Duration;
    use lembra_domain::EventEntities;

    async fn seed_event(ctx: &LembraContext, user: &lembra_domain::User) -> Event {
        execute(
            CreateEventUseCase {
                user: user.clone(),
                entities: EventEntities {
                    title: Some("dentista".into()),
                    starts_at: Some(ctx.sys.now() + Duration::hours(3)),
                    ..Default::default()
                },
            },
            ctx,
        )
        .await
        .unwrap()
    }

    #[actix_web::test]
    async fn confirms_a_scheduled_event_once() {
        let harness = setup();
        let ctx = &harness.ctx;
        let user = seed_user(ctx, "+5511999999999", "America/Sao_Paulo").await;
        let event = seed_event(ctx, &user).await;

        let confirmed = execute(
            ConfirmEventUseCase {
                user_id: user.id.clone(),
                identifier: EventIdentifier::for_event(event.id.clone()),
            },
            ctx,
        )
        .await
        .unwrap();
        assert_eq!(confirmed.status, EventStatus::Confirmed);

        // confirming again is a no-op success
        let confirmed_again = execute(
            ConfirmEventUseCase {
                user_id: user.id,
                identifier: EventIdentifier::for_event(event.id),
            },
            ctx,
        )
        .await
        .unwrap();
        assert_eq!(confirmed_again.status, EventStatus::Confirmed);
    }

    #[actix_web::test]
    async fn canceled_event_cannot_be_confirmed() {
        let harness = setup();
        let ctx = &harness.ctx;
        let user = seed_user(ctx, "+5511999999999", "America/Sao_Paulo").await;
        let mut event = seed_event(ctx, &user).await;
        event.status = EventStatus::Canceled;
        ctx.repos.events.save(&event).await.unwrap();

        let res = execute(
            ConfirmEventUseCase {
                user_id: user.id,
                identifier: EventIdentifier::for_event(event.id),
            },
            ctx,
        )
        .await;
        assert!(matches!(
            res,
            Err(UseCaseError::InvalidTransition("canceled"))
        ));
    }
}

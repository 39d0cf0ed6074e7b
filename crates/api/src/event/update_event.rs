use super::{resolve_event, ResolveError};
use crate::error::LembraError;
use crate::shared::auth::protect_route;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use lembra_api_structs::event::{EventDTO, UpdateEventRequest};
use lembra_domain::{EntityValidationError, Event, EventEntities, EventIdentifier, ID};
use lembra_infra::LembraContext;

pub async fn update_event_controller(
    http_req: HttpRequest,
    path_params: web::Path<String>,
    body: web::Json<UpdateEventRequest>,
    ctx: web::Data<LembraContext>,
) -> Result<HttpResponse, LembraError> {
    let user = protect_route(&http_req, &ctx).await?;
    let event_id = path_params
        .parse::<ID>()
        .map_err(|e| LembraError::BadClientData(e.to_string()))?;

    let body = body.into_inner();
    let usecase = UpdateEventUseCase {
        user_id: user.id,
        entities: EventEntities {
            title: body.title,
            starts_at: body.starts_at,
            location: body.location,
            remind_before_minutes: body.remind_before_minutes,
            remind_frequency_minutes: body.remind_frequency_minutes,
            require_confirmation: body.require_confirmation,
            max_notifications: body.max_notifications,
            identifier: Some(EventIdentifier::for_event(event_id)),
            ..Default::default()
        },
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Ok().json(EventDTO::new(event)))
        .map_err(LembraError::from)
}

/// Sparse update: only the supplied fields are applied to the resolved event
#[derive(Debug)]
pub struct UpdateEventUseCase {
    pub user_id: ID,
    pub entities: EventEntities,
}

#[derive(Debug, thiserror::Error)]
pub enum UseCaseError {
    #[error("event identifier is required for update")]
    IdentifierRequired,
    #[error("event not found")]
    NotFound,
    #[error("multiple events found, please be more specific")]
    Ambiguous,
    #[error("event is {0} and cannot be updated")]
    Terminal(&'static str),
    #[error(transparent)]
    InvalidEntities(#[from] EntityValidationError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<UseCaseError> for LembraError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::IdentifierRequired | UseCaseError::InvalidEntities(_) => {
                Self::BadClientData(e.to_string())
            }
            UseCaseError::NotFound => Self::NotFound(e.to_string()),
            UseCaseError::Ambiguous => Self::AmbiguousIdentifier(e.to_string()),
            UseCaseError::Terminal(_) => Self::InvalidTransition(e.to_string()),
            UseCaseError::Internal(_) => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateEventUseCase {
    type Response = Event;

    type Error = UseCaseError;

    const NAME: &'static str = "UpdateEvent";

    async fn execute(&mut self, ctx: &LembraContext) -> Result<Self::Response, Self::Error> {
        let identifier = self
            .entities
            .identifier
            .clone()
            .filter(|identifier| !identifier.is_empty())
            .ok_or(UseCaseError::IdentifierRequired)?;
        self.entities.validate()?;

        let entities = self.entities.clone();
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

                if event.is_terminal() {
                    return Err(UseCaseError::Terminal(event.status.as_str()));
                }

                if let Some(title) = &entities.title {
                    event.title = title.trim().to_string();
                }
                if let Some(starts_at) = entities.starts_at {
                    event.starts_at = starts_at;
                }
                if let Some(location) = &entities.location {
                    event.location = Some(location.clone());
                }
                if let Some(minutes) = entities.remind_before_minutes {
                    event.remind_before_minutes = minutes;
                }
                if let Some(minutes) = entities.remind_frequency_minutes {
                    event.remind_frequency_minutes = minutes;
                }
                if let Some(require_confirmation) = entities.require_confirmation {
                    event.require_confirmation = require_confirmation;
                }
                if let Some(max_notifications) = entities.max_notifications {
                    event.max_notifications = max_notifications;
                }
                event.updated_at = now;

                repos.events.save(&event).await?;
                Ok(event)
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
    use lembra_domain::{EventStatus, User};

    async fn seed_event(
        ctx: &LembraContext,
        user: &User,
        title: &str,
        starts_in_hours: i64,
    ) -> Event {
        let usecase = CreateEventUseCase {
            user: user.clone(),
            entities: EventEntities {
                title: Some(title.into()),
                starts_at: Some(ctx.sys.now() + Duration::hours(starts_in_hours)),
                ..Default::default()
            },
        };
        execute(usecase, ctx).await.unwrap()
    }

    #[actix_web::test]
    async fn applies_only_supplied_fields() {
        let harness = setup();
        let ctx = &harness.ctx;
        let user = seed_user(ctx, "+5511999999999", "America/Sao_Paulo").await;
        let event = seed_event(ctx, &user, "Reunião", 3).await;

        let new_start = ctx.sys.now() + Duration::hours(5);
        let usecase = UpdateEventUseCase {
            user_id: user.id.clone(),
            entities: EventEntities {
                starts_at: Some(new_start),
                identifier: Some(EventIdentifier::for_event(event.id.clone())),
                ..Default::default()
            },
        };

        let updated = execute(usecase, ctx).await.unwrap();
        assert_eq!(updated.starts_at, new_start);
        assert_eq!(updated.title, "Reunião");
        assert_eq!(
            updated.remind_before_minutes,
            event.remind_before_minutes
        );
    }

    #[actix_web::test]
    async fn resolves_by_title_substring() {
        let harness = setup();
        let ctx = &harness.ctx;
        let user = seed_user(ctx, "+5511999999999", "America/Sao_Paulo").await;
        seed_event(ctx, &user, "Reunião de status", 3).await;

        let usecase = UpdateEventUseCase {
            user_id: user.id.clone(),
            entities: EventEntities {
                location: Some("sala 2".into()),
                identifier: Some(EventIdentifier {
                    title: Some("reunião".into()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        };

        let updated = execute(usecase, ctx).await.unwrap();
        assert_eq!(updated.location.as_deref(), Some("sala 2"));
    }

    #[actix_web::test]
    async fn two_matches_is_ambiguous_and_mutates_nothing() {
        let harness = setup();
        let ctx = &harness.ctx;
        let user = seed_user(ctx, "+5511999999999", "America/Sao_Paulo").await;
        let first = seed_event(ctx, &user, "Reunião", 3).await;
        let second = seed_event(ctx, &user, "Reunião", 27).await;

        let usecase = UpdateEventUseCase {
            user_id: user.id.clone(),
            entities: EventEntities {
                starts_at: Some(ctx.sys.now() + Duration::hours(10)),
                identifier: Some(EventIdentifier {
                    title: Some("Reunião".into()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        };

        assert!(matches!(
            execute(usecase, ctx).await,
            Err(UseCaseError::Ambiguous)
        ));
        let untouched = ctx.repos.events.find(&first.id).await.unwrap();
        assert_eq!(untouched.starts_at, first.starts_at);
        let untouched = ctx.repos.events.find(&second.id).await.unwrap();
        assert_eq!(untouched.starts_at, second.starts_at);
    }

    #[actix_web::test]
    async fn zero_matches_is_not_found() {
        let harness = setup();
        let ctx = &harness.ctx;
        let user = seed_user(ctx, "+5511999999999", "America/Sao_Paulo").await;

        let usecase = UpdateEventUseCase {
            user_id: user.id.clone(),
            entities: EventEntities {
                starts_at: Some(ctx.sys.now() + Duration::hours(10)),
                identifier: Some(EventIdentifier {
                    title: Some("inexistente".into()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        };

        assert!(matches!(
            execute(usecase, ctx).await,
            Err(UseCaseError::NotFound)
        ));
    }

    #[actix_web::test]
    async fn does_not_touch_events_of_other_users() {
        let harness = setup();
        let ctx = &harness.ctx;
        let owner = seed_user(ctx, "+5511999999999", "America/Sao_Paulo").await;
        let other = seed_user(ctx, "+5511888888888", "America/Sao_Paulo").await;
        let event = seed_event(ctx, &owner, "Reunião", 3).await;

        let usecase = UpdateEventUseCase {
            user_id: other.id.clone(),
            entities: EventEntities {
                starts_at: Some(ctx.sys.now() + Duration::hours(10)),
                identifier: Some(EventIdentifier::for_event(event.id.clone())),
                ..Default::default()
            },
        };

        assert!(matches!(
            execute(usecase, ctx).await,
            Err(UseCaseError::NotFound)
        ));
    }

    #[actix_web::test]
    async fn cannot_revive_a_terminal_event() {
        let harness = setup();
        let ctx = &harness.ctx;
        let user = seed_user(ctx, "+5511999999999", "America/Sao_Paulo").await;
        let mut event = seed_event(ctx, &user, "Reunião", 3).await;
        event.status = EventStatus::Canceled;
        ctx.repos.events.save(&event).await.unwrap();

        let usecase = UpdateEventUseCase {
            user_id: user.id.clone(),
            entities: EventEntities {
                starts_at: Some(ctx.sys.now() + Duration::hours(10)),
                identifier: Some(EventIdentifier::for_event(event.id.clone())),
                ..Default::default()
            },
        };

        assert!(matches!(
            execute(usecase, ctx).await,
            Err(UseCaseError::Terminal("canceled"))
        ));
    }
}

use crate::error::LembraError;
use crate::shared::auth::protect_route;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use lembra_api_structs::event::{CreateEventRequest, EventDTO};
use lembra_domain::{EntityValidationError, Event, EventEntities, EventStatus, User};
use lembra_infra::LembraContext;

pub async fn create_event_controller(
    http_req: HttpRequest,
    body: web::Json<CreateEventRequest>,
    ctx: web::Data<LembraContext>,
) -> Result<HttpResponse, LembraError> {
    let user = protect_route(&http_req, &ctx).await?;

    let body = body.into_inner();
    let usecase = CreateEventUseCase {
        user,
        entities: EventEntities {
            title: Some(body.title),
            starts_at: Some(body.starts_at),
            location: body.location,
            remind_before_minutes: body.remind_before_minutes,
            remind_frequency_minutes: body.remind_frequency_minutes,
            require_confirmation: body.require_confirmation,
            max_notifications: body.max_notifications,
            ..Default::default()
        },
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Created().json(EventDTO::new(event)))
        .map_err(LembraError::from)
}

#[derive(Debug)]
pub struct CreateEventUseCase {
    pub user: User,
    pub entities: EventEntities,
}

#[derive(Debug, thiserror::Error)]
pub enum UseCaseError {
    #[error("event title is required")]
    TitleRequired,
    #[error("event start time is required")]
    StartsAtRequired,
    #[error(transparent)]
    InvalidEntities(#[from] EntityValidationError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<UseCaseError> for LembraError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::TitleRequired
            | UseCaseError::StartsAtRequired
            | UseCaseError::InvalidEntities(_) => Self::BadClientData(e.to_string()),
            UseCaseError::Internal(_) => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateEventUseCase {
    type Response = Event;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateEvent";

    async fn execute(&mut self, ctx: &LembraContext) -> Result<Self::Response, Self::Error> {
        let title = match self.entities.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => return Err(UseCaseError::TitleRequired),
        };
        let starts_at = self
            .entities
            .starts_at
            .ok_or(UseCaseError::StartsAtRequired)?;
        self.entities.validate()?;

        let now = ctx.sys.now();
        let event = Event {
            id: Default::default(),
            user_id: self.user.id.clone(),
            title,
            location: self.entities.location.clone(),
            starts_at,
            remind_before_minutes: self
                .entities
                .remind_before_minutes
                .unwrap_or(self.user.default_remind_before_minutes),
            remind_frequency_minutes: self
                .entities
                .remind_frequency_minutes
                .unwrap_or(self.user.default_remind_frequency_minutes),
            require_confirmation: self
                .entities
                .require_confirmation
                .unwrap_or(self.user.default_require_confirmation),
            max_notifications: self.entities.max_notifications.unwrap_or(3),
            status: EventStatus::Scheduled,
            notifications_sent: 0,
            last_notified_at: None,
            created_at: now,
            updated_at: now,
        };

        ctx.repos.events.insert(&event).await?;

        Ok(event)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_helpers::{seed_user, setup};
    use chrono::Duration;

    #[actix_web::test]
    async fn creates_event_with_user_defaults() {
        let harness = setup();
        let ctx = &harness.ctx;
        let user = seed_user(ctx, "+5511999999999", "America/Sao_Paulo").await;

        let starts_at = ctx.sys.now() + Duration::hours(3);
        let usecase = CreateEventUseCase {
            user: user.clone(),
            entities: EventEntities {
                title: Some("dentista".into()),
                starts_at: Some(starts_at),
                ..Default::default()
            },
        };

        let event = execute(usecase, ctx).await.unwrap();
        assert_eq!(event.title, "dentista");
        assert_eq!(event.status, EventStatus::Scheduled);
        assert_eq!(event.notifications_sent, 0);
        assert_eq!(event.remind_before_minutes, user.default_remind_before_minutes);
        assert_eq!(
            event.remind_frequency_minutes,
            user.default_remind_frequency_minutes
        );
        assert_eq!(
            event.require_confirmation,
            user.default_require_confirmation
        );
        assert_eq!(event.max_notifications, 3);

        let persisted = ctx.repos.events.find(&event.id).await.unwrap();
        assert_eq!(persisted, event);
    }

    #[actix_web::test]
    async fn explicit_reminder_fields_win_over_defaults() {
        let harness = setup();
        let ctx = &harness.ctx;
        let user = seed_user(ctx, "+5511999999999", "America/Sao_Paulo").await;

        let usecase = CreateEventUseCase {
            user,
            entities: EventEntities {
                title: Some("dentista".into()),
                starts_at: Some(ctx.sys.now() + Duration::hours(3)),
                remind_before_minutes: Some(60),
                require_confirmation: Some(true),
                max_notifications: Some(5),
                ..Default::default()
            },
        };

        let event = execute(usecase, ctx).await.unwrap();
        assert_eq!(event.remind_before_minutes, 60);
        assert!(event.require_confirmation);
        assert_eq!(event.max_notifications, 5);
    }

    #[actix_web::test]
    async fn rejects_missing_title_and_missing_start() {
        let harness = setup();
        let ctx = &harness.ctx;
        let user = seed_user(ctx, "+5511999999999", "America/Sao_Paulo").await;

        let usecase = CreateEventUseCase {
            user: user.clone(),
            entities: EventEntities {
                starts_at: Some(ctx.sys.now() + Duration::hours(3)),
                ..Default::default()
            },
        };
        assert!(matches!(
            execute(usecase, ctx).await,
            Err(UseCaseError::TitleRequired)
        ));

        let usecase = CreateEventUseCase {
            user,
            entities: EventEntities {
                title: Some("dentista".into()),
                ..Default::default()
            },
        };
        assert!(matches!(
            execute(usecase, ctx).await,
            Err(UseCaseError::StartsAtRequired)
        ));
    }

    #[actix_web::test]
    async fn rejects_out_of_range_reminder_fields() {
        let harness = setup();
        let ctx = &harness.ctx;
        let user = seed_user(ctx, "+5511999999999", "America/Sao_Paulo").await;

        let usecase = CreateEventUseCase {
            user,
            entities: EventEntities {
                title: Some("dentista".into()),
                starts_at: Some(ctx.sys.now() + Duration::hours(3)),
                max_notifications: Some(11),
                ..Default::default()
            },
        };
        assert!(matches!(
            execute(usecase, ctx).await,
            Err(UseCaseError::InvalidEntities(_))
        ));
    }
}

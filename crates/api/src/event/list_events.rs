use crate::error::LembraError;
use crate::shared::auth::protect_route;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use lembra_api_structs::event::{EventDTO, ListEventsQuery, ListEventsResponse};
use lembra_domain::{Event, EventStatus, ID};
use lembra_infra::LembraContext;

pub async fn list_events_controller(
    http_req: HttpRequest,
    query: web::Query<ListEventsQuery>,
    ctx: web::Data<LembraContext>,
) -> Result<HttpResponse, LembraError> {
    let user = protect_route(&http_req, &ctx).await?;

    let range = match (query.start, query.end) {
        (Some(start), Some(end)) => Some((start, end)),
        (None, None) => None,
        _ => {
            return Err(LembraError::BadClientData(
                "start and end must be provided together".into(),
            ))
        }
    };

    let usecase = ListEventsUseCase {
        user_id: user.id,
        range,
    };

    execute(usecase, &ctx)
        .await
        .map(|events| {
            HttpResponse::Ok().json(ListEventsResponse {
                events: events.into_iter().map(EventDTO::new).collect(),
            })
        })
        .map_err(LembraError::from)
}

/// With a range: every event starting inside it. Without: upcoming
/// non-canceled events. Both ascending by `starts_at`.
#[derive(Debug)]
pub struct ListEventsUseCase {
    pub user_id: ID,
    pub range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

#[derive(Debug, thiserror::Error)]
pub enum UseCaseError {}

impl From<UseCaseError> for LembraError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ListEventsUseCase {
    type Response = Vec<Event>;

    type Error = UseCaseError;

    const NAME: &'static str = "ListEvents";

    async fn execute(&mut self, ctx: &LembraContext) -> Result<Self::Response, Self::Error> {
        if let Some((start, end)) = self.range {
            return Ok(ctx
                .repos
                .events
                .find_by_user_and_range(&self.user_id, start, end)
                .await);
        }

        let now = ctx.sys.now();
        let events = ctx
            .repos
            .events
            .find_by_user(&self.user_id)
            .await
            .into_iter()
            .filter(|event| event.status != EventStatus::Canceled && event.starts_at > now)
            .collect();
        Ok(events)
    }
}

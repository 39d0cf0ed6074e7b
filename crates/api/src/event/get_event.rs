use crate::error::LembraError;
use crate::shared::auth::protect_route;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use lembra_api_structs::event::EventDTO;
use lembra_domain::{Event, ID};
use lembra_infra::LembraContext;

pub async fn get_event_controller(
    http_req: HttpRequest,
    path_params: web::Path<String>,
    ctx: web::Data<LembraContext>,
) -> Result<HttpResponse, LembraError> {
    let user = protect_route(&http_req, &ctx).await?;
    let event_id = path_params
        .parse::<ID>()
        .map_err(|e| LembraError::BadClientData(e.to_string()))?;

    let usecase = GetEventUseCase {
        user_id: user.id,
        event_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Ok().json(EventDTO::new(event)))
        .map_err(LembraError::from)
}

#[derive(Debug)]
pub struct GetEventUseCase {
    pub user_id: ID,
    pub event_id: ID,
}

#[derive(Debug, thiserror::Error)]
pub enum UseCaseError {
    #[error("event not found")]
    NotFound,
}

impl From<UseCaseError> for LembraError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound => Self::NotFound(e.to_string()),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetEventUseCase {
    type Response = Event;

    type Error = UseCaseError;

    const NAME: &'static str = "GetEvent";

    async fn execute(&mut self, ctx: &LembraContext) -> Result<Self::Response, Self::Error> {
        match ctx.repos.events.find(&self.event_id).await {
            Some(event) if event.user_id == self.user_id => Ok(event),
            _ => Err(UseCaseError::NotFound),
        }
    }
}

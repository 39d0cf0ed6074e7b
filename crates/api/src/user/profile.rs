use crate::error::LembraError;
use crate::shared::auth::protect_route;
use actix_web::{web, HttpRequest, HttpResponse};
use lembra_api_structs::user::{UpdateProfileRequest, UserDTO};
use lembra_infra::LembraContext;

pub async fn get_profile_controller(
    http_req: HttpRequest,
    ctx: web::Data<LembraContext>,
) -> Result<HttpResponse, LembraError> {
    let user = protect_route(&http_req, &ctx).await?;
    Ok(HttpResponse::Ok().json(UserDTO::new(user)))
}

pub async fn update_profile_controller(
    http_req: HttpRequest,
    body: web::Json<UpdateProfileRequest>,
    ctx: web::Data<LembraContext>,
) -> Result<HttpResponse, LembraError> {
    let mut user = protect_route(&http_req, &ctx).await?;
    let body = body.into_inner();

    if let Some(timezone) = body.timezone {
        if timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(LembraError::BadClientData(format!(
                "Invalid IANA timezone: {}",
                timezone
            )));
        }
        user.timezone = timezone;
    }
    if let Some(name) = body.name {
        user.name = Some(name);
    }
    if let Some(minutes) = body.default_remind_before_minutes {
        if minutes < 0 {
            return Err(LembraError::BadClientData(
                "default_remind_before_minutes must be >= 0".into(),
            ));
        }
        user.default_remind_before_minutes = minutes;
    }
    if let Some(minutes) = body.default_remind_frequency_minutes {
        if minutes < 1 {
            return Err(LembraError::BadClientData(
                "default_remind_frequency_minutes must be >= 1".into(),
            ));
        }
        user.default_remind_frequency_minutes = minutes;
    }
    if let Some(require_confirmation) = body.default_require_confirmation {
        user.default_require_confirmation = require_confirmation;
    }
    user.updated_at = ctx.sys.now();

    ctx.repos
        .users
        .save(&user)
        .await
        .map_err(|_| LembraError::InternalError)?;

    Ok(HttpResponse::Ok().json(UserDTO::new(user)))
}

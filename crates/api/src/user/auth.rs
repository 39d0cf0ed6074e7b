use crate::error::LembraError;
use actix_web::{web, HttpResponse};
use lembra_api_structs::user::{AuthRequest, UserDTO};
use lembra_infra::LembraContext;

/// Public entry point: validates that a number is registered and active and
/// returns its profile. Users are provisioned by the inbound pipeline, never
/// here.
pub async fn auth_controller(
    body: web::Json<AuthRequest>,
    ctx: web::Data<LembraContext>,
) -> Result<HttpResponse, LembraError> {
    let user = ctx
        .repos
        .users
        .find_by_wa_number(&body.wa_number)
        .await
        .ok_or_else(|| {
            LembraError::NotFound(format!("No user registered for number: {}", body.wa_number))
        })?;

    if !user.is_active {
        return Err(LembraError::Forbidden("User is deactivated".into()));
    }

    Ok(HttpResponse::Ok().json(UserDTO::new(user)))
}

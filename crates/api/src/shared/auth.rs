use crate::error::LembraError;
use actix_web::HttpRequest;
use lembra_domain::User;
use lembra_infra::LembraContext;

pub const WA_NUMBER_HEADER: &str = "X-WA-Number";

/// Resolves the caller from the `X-WA-Number` header. The number must belong
/// to a registered, active user.
pub async fn protect_route(
    http_req: &HttpRequest,
    ctx: &LembraContext,
) -> Result<User, LembraError> {
    let wa_number = http_req
        .headers()
        .get(WA_NUMBER_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            LembraError::Unauthorized(format!("Missing the `{}` header", WA_NUMBER_HEADER))
        })?;

    let user = ctx
        .repos
        .users
        .find_by_wa_number(wa_number)
        .await
        .ok_or_else(|| {
            LembraError::Unauthorized(format!("No user registered for number: {}", wa_number))
        })?;

    if !user.is_active {
        return Err(LembraError::Forbidden("User is deactivated".into()));
    }

    Ok(user)
}

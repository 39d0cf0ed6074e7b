use crate::error::LembraError;
use crate::shared::auth::protect_route;
use actix_web::{web, HttpRequest, HttpResponse};
use lembra_api_structs::llm::LlmModelDTO;
use lembra_api_structs::user::{UpdateUserConfigRequest, UserConfigDTO};
use lembra_domain::User;
use lembra_infra::LembraContext;

pub async fn get_config_controller(
    http_req: HttpRequest,
    ctx: web::Data<LembraContext>,
) -> Result<HttpResponse, LembraError> {
    let user = protect_route(&http_req, &ctx).await?;
    Ok(HttpResponse::Ok().json(config_dto(&ctx, &user).await))
}

/// The LLM pick must name an active model; partial picks are rejected so the
/// stored pair always resolves.
pub async fn update_config_controller(
    http_req: HttpRequest,
    body: web::Json<UpdateUserConfigRequest>,
    ctx: web::Data<LembraContext>,
) -> Result<HttpResponse, LembraError> {
    let mut user = protect_route(&http_req, &ctx).await?;
    let body = body.into_inner();

    match (&body.llm_provider, &body.llm_model) {
        (Some(provider), Some(model)) => {
            if ctx
                .repos
                .llm_configs
                .find_model(provider, model)
                .await
                .is_none()
            {
                return Err(LembraError::BadClientData(format!(
                    "Unknown or inactive LLM model: {}/{}",
                    provider, model
                )));
            }
            user.llm_provider = Some(provider.clone());
            user.llm_model = Some(model.clone());
        }
        (None, None) => {}
        _ => {
            return Err(LembraError::BadClientData(
                "llm_provider and llm_model must be provided together".into(),
            ))
        }
    }

    if let Some(rate_limit) = body.rate_limit_per_minute {
        if rate_limit < 0 {
            return Err(LembraError::BadClientData(
                "rate_limit_per_minute must be >= 0".into(),
            ));
        }
        user.rate_limit_per_minute = rate_limit;
    }
    user.updated_at = ctx.sys.now();

    ctx.repos
        .users
        .save(&user)
        .await
        .map_err(|_| LembraError::InternalError)?;

    Ok(HttpResponse::Ok().json(config_dto(&ctx, &user).await))
}

async fn config_dto(ctx: &LembraContext, user: &User) -> UserConfigDTO {
    let resolved_model = ctx
        .repos
        .llm_configs
        .find_user_config(user)
        .await
        .map(LlmModelDTO::new);
    UserConfigDTO {
        llm_provider: user.llm_provider.clone(),
        llm_model: user.llm_model.clone(),
        rate_limit_per_minute: user.rate_limit_per_minute,
        resolved_model,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::auth::WA_NUMBER_HEADER;
    use crate::test_helpers::{seed_user, setup};
    use actix_web::{test, App};

    #[actix_web::test]
    async fn unset_pick_resolves_to_the_default_model() {
        let harness = setup();
        seed_user(&harness.ctx, "+5511999999999", "UTC").await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(harness.ctx.clone()))
                .configure(super::super::configure_routes),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/user/config")
                .insert_header((WA_NUMBER_HEADER, "+5511999999999"))
                .to_request(),
        )
        .await;
        assert!(res.status().is_success());
        let config: UserConfigDTO = test::read_body_json(res).await;
        assert!(config.llm_provider.is_none());
        assert!(config.resolved_model.unwrap().is_default);
    }

    #[actix_web::test]
    async fn valid_pick_is_stored_and_unknown_pick_rejected() {
        let harness = setup();
        seed_user(&harness.ctx, "+5511999999999", "UTC").await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(harness.ctx.clone()))
                .configure(super::super::configure_routes),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/user/config")
                .insert_header((WA_NUMBER_HEADER, "+5511999999999"))
                .set_json(UpdateUserConfigRequest {
                    llm_provider: Some("openai".into()),
                    llm_model: Some("gpt-4o-mini".into()),
                    ..Default::default()
                })
                .to_request(),
        )
        .await;
        assert!(res.status().is_success());
        let config: UserConfigDTO = test::read_body_json(res).await;
        assert_eq!(config.llm_provider.as_deref(), Some("openai"));
        assert_eq!(config.resolved_model.unwrap().name, "gpt-4o-mini");

        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/user/config")
                .insert_header((WA_NUMBER_HEADER, "+5511999999999"))
                .set_json(UpdateUserConfigRequest {
                    llm_provider: Some("openai".into()),
                    llm_model: Some("gpt-imaginary".into()),
                    ..Default::default()
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status().as_u16(), 400);
    }
}

use crate::error::LembraError;
use actix_web::{web, HttpResponse};
use lembra_api_structs::llm::{LlmModelDTO, LlmProviderDTO, ModelsResponse, ProvidersResponse};
use lembra_infra::LembraContext;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/llm/providers", web::get().to(list_providers_controller));
    cfg.route(
        "/llm/providers/{provider}/models",
        web::get().to(list_models_controller),
    );
    cfg.route("/llm/default", web::get().to(get_default_model_controller));
}

pub async fn list_providers_controller(ctx: web::Data<LembraContext>) -> HttpResponse {
    let providers = ctx.repos.llm_configs.list_active_providers().await;
    HttpResponse::Ok().json(ProvidersResponse {
        providers: providers.into_iter().map(LlmProviderDTO::new).collect(),
    })
}

pub async fn list_models_controller(
    path_params: web::Path<String>,
    ctx: web::Data<LembraContext>,
) -> HttpResponse {
    let models = ctx
        .repos
        .llm_configs
        .list_active_models_by_provider(&path_params)
        .await;
    HttpResponse::Ok().json(ModelsResponse {
        models: models.into_iter().map(LlmModelDTO::new).collect(),
    })
}

pub async fn get_default_model_controller(
    ctx: web::Data<LembraContext>,
) -> Result<HttpResponse, LembraError> {
    match ctx.repos.llm_configs.find_default_model().await {
        Some(model) => Ok(HttpResponse::Ok().json(LlmModelDTO::new(model))),
        None => Err(LembraError::NotFound("No default LLM model is configured".into())),
    }
}

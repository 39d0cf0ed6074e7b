use crate::error::LembraError;
use crate::shared::auth::protect_route;
use actix_web::{web, HttpRequest, HttpResponse};
use lembra_api_structs::status::StatusResponse;
use lembra_api_structs::user::{
    AddAllowedContactRequest, AllowedContactDTO, AllowedContactsResponse,
};
use lembra_domain::AllowedContact;
use lembra_infra::LembraContext;

pub async fn list_controller(
    http_req: HttpRequest,
    ctx: web::Data<LembraContext>,
) -> Result<HttpResponse, LembraError> {
    let user = protect_route(&http_req, &ctx).await?;
    let contacts = ctx.repos.allowed_contacts.find_by_user(&user.id).await;
    Ok(HttpResponse::Ok().json(AllowedContactsResponse {
        contacts: contacts.into_iter().map(AllowedContactDTO::new).collect(),
    }))
}

pub async fn add_controller(
    http_req: HttpRequest,
    body: web::Json<AddAllowedContactRequest>,
    ctx: web::Data<LembraContext>,
) -> Result<HttpResponse, LembraError> {
    let user = protect_route(&http_req, &ctx).await?;
    let body = body.into_inner();

    if body.contact_number.trim().is_empty() {
        return Err(LembraError::BadClientData(
            "contact_number must be non-empty".into(),
        ));
    }

    let contact = AllowedContact {
        user_id: user.id,
        contact_number: body.contact_number.trim().to_string(),
        note: body.note,
        created_at: ctx.sys.now(),
    };
    ctx.repos
        .allowed_contacts
        .insert(&contact)
        .await
        .map_err(|_| LembraError::InternalError)?;

    Ok(HttpResponse::Created().json(AllowedContactDTO::new(contact)))
}

pub async fn remove_controller(
    http_req: HttpRequest,
    path_params: web::Path<String>,
    ctx: web::Data<LembraContext>,
) -> Result<HttpResponse, LembraError> {
    let user = protect_route(&http_req, &ctx).await?;

    if !ctx
        .repos
        .allowed_contacts
        .delete(&user.id, &path_params)
        .await
    {
        return Err(LembraError::NotFound(format!(
            "Number is not in the allow-list: {}",
            path_params
        )));
    }

    Ok(HttpResponse::Ok().json(StatusResponse::ok()))
}

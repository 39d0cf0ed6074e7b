mod allowed_contacts;
mod auth;
mod config;
mod profile;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth", web::post().to(auth::auth_controller));
    cfg.route("/profile", web::get().to(profile::get_profile_controller));
    cfg.route("/profile", web::put().to(profile::update_profile_controller));
    cfg.route("/user/config", web::get().to(config::get_config_controller));
    cfg.route("/user/config", web::put().to(config::update_config_controller));
    cfg.route(
        "/user/allowed-contacts",
        web::get().to(allowed_contacts::list_controller),
    );
    cfg.route(
        "/user/allowed-contacts",
        web::post().to(allowed_contacts::add_controller),
    );
    cfg.route(
        "/user/allowed-contacts/{number}",
        web::delete().to(allowed_contacts::remove_controller),
    );
}

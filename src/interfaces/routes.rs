use actix_web::web;

use crate::handlers::{home::{home, not_found}, json_error::{json_config, query_config}, system::health_check};

mod contact;
mod events;
mod images;
mod projects;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());
    cfg.app_data(query_config());
    cfg.service(home);

    cfg.service(
        web::scope("/api")
            .service(health_check)
            .configure(projects::config_routes)
            .configure(events::config_routes)
            .configure(contact::config_routes)
            .configure(images::config_routes)
    );

    cfg.default_service(web::route().to(not_found));
}

use actix_web::web;

use crate::handlers::events;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/events")
            .service(
                web::resource("")
                    .route(web::get().to(events::list_events))
                    .route(web::post().to(events::create_event))
            )
            .service(
                web::resource("/featured")
                    .route(web::get().to(events::get_featured_events))
            )
            .service(
                web::resource("/types")
                    .route(web::get().to(events::get_event_types))
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(events::get_event))
                    .route(web::put().to(events::update_event))
                    .route(web::delete().to(events::delete_event))
            )
    );
}

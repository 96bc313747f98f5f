use actix_web::web;

use crate::handlers::images;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/images")
            .service(web::resource("/list").route(web::get().to(images::list_images)))
            .service(web::resource("/gallery").route(web::get().to(images::get_gallery)))
    );
}

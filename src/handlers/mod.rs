pub mod health;
pub mod phones;
pub mod platforms;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::config)
            .configure(phones::config)
            .configure(platforms::config),
    );
}

//! API endpoint modules.

pub mod backup;
pub mod catalog;
pub mod health;
pub mod openapi;
pub mod reports;
pub mod submit;
pub mod templates;
pub mod user;

pub use backup::configure_routes as configure_backup_routes;
pub use catalog::configure_routes as configure_catalog_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use reports::configure_routes as configure_report_routes;
pub use submit::configure_routes as configure_submit_routes;
pub use templates::configure_routes as configure_template_routes;
pub use tests::configure_routes as configure_tests_routes;
pub use user::configure_routes as configure_user_routes;

use actix_web::web;

/// Register every `/api/v1` route.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_health_routes)
        .configure(configure_tests_routes)
        .configure(configure_catalog_routes)
        .configure(configure_template_routes)
        .configure(configure_submit_routes)
        .configure(configure_report_routes)
        .configure(configure_user_routes)
        .configure(configure_backup_routes)
        .configure(crate::services::configure_auth_routes);
}

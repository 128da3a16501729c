pub mod auth;
pub mod login;
pub mod system;

use actix_web::{error, web, Result};

/// Registers every API route.
pub fn init(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/system").configure(system::init));
    cfg.service(web::scope("/api/auth").configure(auth::init));
}

pub async fn not_found() -> Result<&'static str> {
    Err(error::ErrorNotFound("route not found"))
}

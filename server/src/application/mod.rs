mod accessapi;
mod v1api;

use std::sync::Arc;

use actix_web::{get, web, Responder, Scope};

use crate::security::RoleStore;

pub use v1api::v1_api_scope;

// group of base endpoints
pub fn base_scope(store: &Arc<dyn RoleStore>) -> Scope {
    web::scope("/mgmt")
        .service(health)
        .service(accessapi::access_scope(store))
}

#[get("/health")]
async fn health() -> impl Responder {
    "OK".to_string()
}

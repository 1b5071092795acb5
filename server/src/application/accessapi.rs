use std::sync::Arc;

use actix_web::dev::HttpServiceFactory;
use actix_web::{get, web, HttpResponse, Responder};

use serde::Serialize;

use crate::security::{Authorized, Role, RoleStore, ALL_ROLES};

// group of endpoints for access management, program administrators only
pub fn access_scope(store: &Arc<dyn RoleStore>) -> impl HttpServiceFactory {
    web::scope("/access")
        .wrap(Authorized::role(Role::Administrator, store.clone()))
        .service(roles_catalog)
}

#[derive(Serialize)]
struct RoleInfo {
    id: u32,
    name: &'static str,
}

#[derive(Serialize)]
struct RoleCatalog {
    roles: Vec<RoleInfo>,
}

#[get("/roles")]
async fn roles_catalog() -> impl Responder {
    let roles = ALL_ROLES
        .iter()
        .map(|role| RoleInfo {
            id: role.id(),
            name: role.name(),
        })
        .collect();
    HttpResponse::Ok().json(RoleCatalog { roles })
}

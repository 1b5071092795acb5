use std::sync::Arc;

use actix_web::dev::HttpServiceFactory;
use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;

use crate::security::{Authorized, Role, RoleStore, SecurityContext};

// group of endpoints for the per-role application areas
pub fn v1_api_scope(store: &Arc<dyn RoleStore>) -> impl HttpServiceFactory {
    web::scope("/api/v1")
        .service(advisor_scope(store))
        .service(student_scope(store))
}

fn advisor_scope(store: &Arc<dyn RoleStore>) -> impl HttpServiceFactory {
    web::scope("/advisor")
        .wrap(Authorized::role(Role::Advisor, store.clone()))
        .service(account)
}

fn student_scope(store: &Arc<dyn RoleStore>) -> impl HttpServiceFactory {
    web::scope("/student")
        .wrap(Authorized::role(Role::Student, store.clone()))
        .service(account)
}

#[derive(Serialize)]
struct AccountInfo {
    user_id: u32,
}

#[get("/account")]
async fn account(context: SecurityContext) -> impl Responder {
    HttpResponse::Ok().json(AccountInfo {
        user_id: context.user_id(),
    })
}

mod application;
mod security;
mod server;

use std::io::{Error, ErrorKind};

use actix_web::http::ContentEncoding;
use actix_web::{middleware, App, HttpServer};
use actix_slog::StructuredLogger;

use slog::info;

// rest api structure:
//   /mgmt              management
//       /health        health checking
//       /access/roles  role catalog, administrators only
//   /api               web applications api
//       /v1/advisor    advisor area
//       /v1/student    student area

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let log = server::setup_logging();
    info!(log, "Starting Academic Access Server");

    // configure server
    let config = server::load_config()
        .expect("Can not load config file");

    let db_config = &config.connection;
    server::create_datasource(db_config)
        .map_err(|e| Error::new(ErrorKind::Other, e))?;

    let role_store = security::OracleRoleStore::shared();

    let http = &config.http;
    let builder = server::setup_tls(&http);
    let identity_service = server::setup_identity(&config.jwt)
        .map_err(|e| Error::new(ErrorKind::Other, e))?;

    let listen = &http.listen;
    let listen = format!("{}:{}", &listen.domain, &listen.port);
    info!(log, "Server Started on https://{}", &listen);

    HttpServer::new(move || {
        App::new()
            .wrap(StructuredLogger::new(log.clone()))
            .wrap(middleware::Compress::new(ContentEncoding::Br))
            .wrap(identity_service.clone())
            .service(application::base_scope(&role_store))
            .service(application::v1_api_scope(&role_store))
    })
        .keep_alive(75)
        .bind_openssl(&listen, builder)?
        .run()
        .await
}

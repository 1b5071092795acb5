use std::path::Path;

use openssl::ssl::{SslAcceptor, SslAcceptorBuilder, SslFiletype, SslMethod};

use slog::{o, Drain};
use slog_async;
use slog_term;

use super::config;
use super::SimpleResult;
use crate::security::IdentityService;

/// setup logging
pub fn setup_logging() -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    slog::Logger::root(drain, o!())
}

/// load ssl keys
// to create a self-signed temporary cert for testing:
// `openssl req -x509 -newkey rsa:4096 -nodes -keyout key.pem -out cert.pem -days 365 -subj '/CN=localhost'`
pub fn setup_tls(settings: &config::HttpListener) -> SslAcceptorBuilder {
    let certfilepath = Path::new(&settings.tls_cert);
    let keyfilepath = Path::new(&settings.tls_key);

    let mut builder = SslAcceptor::mozilla_intermediate(SslMethod::tls()).unwrap();

    builder
        .set_private_key_file(keyfilepath, SslFiletype::PEM)
        .unwrap();
    builder.set_certificate_chain_file(certfilepath).unwrap();
    builder
}

pub fn setup_identity(settings: &config::JwtConfig) -> SimpleResult<IdentityService> {
    IdentityService::new(
        settings.issuer.to_string(),
        Path::new(&settings.public_key).to_path_buf(),
    )
}

use std::fs::File;
use std::future::{ready, Future, Ready};
use std::io::Read;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage};
use serde::{Deserialize, Serialize};

use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use crate::security::SecurityContext;
use crate::server::SimpleResult;

struct Inner {
    key: DecodingKey<'static>,
    validation: Validation,
}

impl Inner {
    fn new(issuer: String, key_file: PathBuf) -> SimpleResult<Self> {
        let mut file = File::open(&key_file)
            .map_err(|err| format!("Can not open jwt public key {:?}: {}", &key_file, err))?;
        let mut source = Vec::with_capacity(1024);
        file.read_to_end(&mut source)
            .map_err(|err| format!("Can not read jwt public key {:?}: {}", &key_file, err))?;

        let key = DecodingKey::from_rsa_pem(&source)
            .map_err(|err| format!("Invalid jwt public key: {}", err))?
            .into_static();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.iss = Some(issuer);
        validation.validate_exp = true;

        Ok(Self { key, validation })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    exp: usize,  // Expiration time
    iat: usize,  // Issued at
    iss: String, // Issuer
    sub: String, // Subject (user-id)
}

fn bearer_token(header: &str) -> Result<&str, String> {
    match header.strip_prefix("Bearer") {
        Some(token) => Ok(token.trim()),
        None => Err("Authorization scheme is not Bearer".to_string()),
    }
}

pub struct IdentityMiddleware<S> {
    service: S,
    inner: Arc<Inner>,
}

impl<S, B> IdentityMiddleware<S>
    where
        S: Service<Request = ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
{
    fn construct_context(&self, req: &ServiceRequest) -> Result<(), String> {
        let auth_header = match req.headers().get("Authorization") {
            Some(value) => value,
            // anonymous request, the gates decide what it may reach
            None => return Ok(()),
        };

        let header = auth_header
            .to_str()
            .map_err(|_| "Malformed authorization header".to_string())?;
        let token = bearer_token(header)?;

        let decoded =
            jsonwebtoken::decode::<Claims>(token, &self.inner.key, &self.inner.validation)
                .map_err(|err| format!("Can not decode authorization token: {}", err))?;

        let claims = decoded.claims;
        // a subject that is not a numeric user id is a broken token, not user 0
        let user_id: u32 = claims
            .sub
            .parse()
            .map_err(|_| format!("Token subject is not a user id: {}", claims.sub))?;

        req.extensions_mut().insert(SecurityContext::new(user_id));
        Ok(())
    }
}

impl<S, B> Service for IdentityMiddleware<S>
    where
        S: Service<Request = ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
{
    type Request = ServiceRequest;
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&mut self, req: Self::Request) -> Self::Future {
        match self.construct_context(&req) {
            Ok(_) => {
                let fut = self.service.call(req);

                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res)
                })
            }
            Err(err) => Box::pin(async { Err(actix_web::error::ErrorBadRequest(err)) }),
        }
    }
}

#[derive(Clone)]
pub struct IdentityService {
    inner: Arc<Inner>,
}

impl IdentityService {
    pub fn new(issuer: String, key_file: PathBuf) -> SimpleResult<Self> {
        let inner = Arc::new(Inner::new(issuer, key_file)?);
        Ok(Self { inner })
    }
}

impl<S, B> Transform<S> for IdentityService
    where
        S: Service<Request = ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
{
    type Request = ServiceRequest;
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = IdentityMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IdentityMiddleware {
            service,
            inner: self.inner.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::bearer_token;

    #[test]
    fn bearer_token_strips_the_scheme() {
        assert_eq!(bearer_token("Bearer aaa.bbb.ccc").unwrap(), "aaa.bbb.ccc");
    }

    #[test]
    fn bearer_token_tolerates_extra_spacing() {
        assert_eq!(bearer_token("Bearer   aaa.bbb.ccc").unwrap(), "aaa.bbb.ccc");
    }

    #[test]
    fn bearer_token_rejects_other_schemes() {
        assert!(bearer_token("Basic dXNlcjpwdw==").is_err());
        assert!(bearer_token("aaa.bbb.ccc").is_err());
    }
}

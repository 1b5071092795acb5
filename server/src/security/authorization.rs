use std::future::{ready, Future, Ready};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::{Error, HttpMessage, HttpResponse, ResponseError};

use serde::Serialize;

use crate::security::{Role, RoleStore, SecurityContext};

/// Terminal rejections of the authorization gate.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("Unauthorized")]
    Unauthenticated,
    #[error("Acesso negado. Você não possui permissão para acessar este recurso.")]
    Forbidden,
}

#[derive(Serialize)]
struct RejectionBody<'a> {
    error: &'a str,
}

impl ResponseError for AccessError {
    fn status_code(&self) -> StatusCode {
        match self {
            AccessError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AccessError::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = self.to_string();
        HttpResponse::build(self.status_code()).json(RejectionBody { error: &message })
    }
}

pub struct AuthorizationMiddleware<S> {
    service: S,
    role: Role,
    store: Arc<dyn RoleStore>,
}

impl<S> AuthorizationMiddleware<S> {
    fn authorize(&self, req: &ServiceRequest) -> Result<(), Error> {
        let user_id = {
            let extensions = &req.extensions();
            extensions.get::<SecurityContext>().map(|ctx| ctx.user_id())
        };

        // no identity is never a wildcard: reject before touching the store
        let user_id = match user_id {
            Some(user_id) => user_id,
            None => return Err(AccessError::Unauthenticated.into()),
        };

        let holds_role = self
            .store
            .has_role(user_id, self.role)
            .map_err(actix_web::error::ErrorInternalServerError)?;

        if holds_role {
            Ok(())
        } else {
            Err(AccessError::Forbidden.into())
        }
    }
}

impl<S, B> Service for AuthorizationMiddleware<S>
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
        match self.authorize(&req) {
            Ok(()) => {
                let fut = self.service.call(req);

                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res)
                })
            }
            Err(err) => Box::pin(async move { Err(err) }),
        }
    }
}

/// Requires a role for every request crossing the wrapped scope.
///
/// Stateless per request: resolve the actor from the request extensions,
/// check the membership relation, then forward or reject.
#[derive(Clone)]
pub struct Authorized {
    role: Role,
    store: Arc<dyn RoleStore>,
}

impl Authorized {
    pub fn role(role: Role, store: Arc<dyn RoleStore>) -> Self {
        Self { role, store }
    }
}

impl<S, B> Transform<S> for Authorized
    where
        S: Service<Request = ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
{
    type Request = ServiceRequest;
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthorizationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthorizationMiddleware {
            service,
            role: self.role,
            store: self.store.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use actix_web::dev::{Body, ResponseBody, Service, ServiceRequest, ServiceResponse, Transform};
    use actix_web::http::StatusCode;
    use actix_web::{test, Error, HttpMessage, HttpResponse, ResponseError};

    use super::Authorized;
    use crate::security::testing::{BrokenRoleStore, StaticRoleStore};
    use crate::security::{Role, SecurityContext};

    struct Downstream {
        hits: Arc<AtomicUsize>,
    }

    impl Service for Downstream {
        type Request = ServiceRequest;
        type Response = ServiceResponse<Body>;
        type Error = Error;
        type Future = std::future::Ready<Result<Self::Response, Self::Error>>;

        fn poll_ready(
            &mut self,
            _ctx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<Result<(), Self::Error>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: ServiceRequest) -> Self::Future {
            self.hits.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(req.into_response(HttpResponse::Ok().body("granted"))))
        }
    }

    fn protected_request(authenticated: Option<u32>) -> ServiceRequest {
        let req = test::TestRequest::get().uri("/protected").to_srv_request();
        if let Some(user_id) = authenticated {
            req.extensions_mut().insert(SecurityContext::new(user_id));
        }
        req
    }

    async fn run_gate(
        gate: Authorized,
        hits: Arc<AtomicUsize>,
        authenticated: Option<u32>,
    ) -> Result<ServiceResponse<Body>, Error> {
        let mut middleware = gate.new_transform(Downstream { hits }).await.unwrap();
        middleware.call(protected_request(authenticated)).await
    }

    fn rejection(err: &Error) -> (StatusCode, serde_json::Value) {
        let response = err.as_response_error().error_response();
        let status = response.status();
        let body = match response.body() {
            ResponseBody::Body(Body::Bytes(bytes)) => serde_json::from_slice(bytes).unwrap(),
            ResponseBody::Other(Body::Bytes(bytes)) => serde_json::from_slice(bytes).unwrap(),
            _ => panic!("rejection body is not in memory"),
        };
        (status, body)
    }

    #[actix_rt::test]
    async fn anonymous_request_is_rejected_before_the_store() {
        let store = Arc::new(StaticRoleStore::new(&[(7, Role::Advisor)]));
        let hits = Arc::new(AtomicUsize::new(0));

        let result = run_gate(
            Authorized::role(Role::Advisor, store.clone()),
            hits.clone(),
            None,
        )
        .await;

        let err = result.err().expect("anonymous request must be rejected");
        let (status, body) = rejection(&err);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, serde_json::json!({"error": "Unauthorized"}));
        assert_eq!(store.queries(), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[actix_rt::test]
    async fn member_request_is_forwarded_unchanged() {
        let store = Arc::new(StaticRoleStore::new(&[(7, Role::Advisor)]));
        let hits = Arc::new(AtomicUsize::new(0));

        let response = run_gate(
            Authorized::role(Role::Advisor, store.clone()),
            hits.clone(),
            Some(7),
        )
        .await
        .expect("member request must be forwarded");

        assert_eq!(response.status(), StatusCode::OK);
        let body = test::read_body(response).await;
        assert_eq!(&body[..], b"granted");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(store.queries(), 1);
    }

    #[actix_rt::test]
    async fn missing_role_is_forbidden_and_never_forwarded() {
        // user 7 holds advisor and student, the scope wants an administrator
        let store = Arc::new(StaticRoleStore::new(&[
            (7, Role::Advisor),
            (7, Role::Student),
        ]));
        let hits = Arc::new(AtomicUsize::new(0));

        let result = run_gate(
            Authorized::role(Role::Administrator, store.clone()),
            hits.clone(),
            Some(7),
        )
        .await;

        let err = result.err().expect("request without the role must be rejected");
        let (status, body) = rejection(&err);
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body,
            serde_json::json!({
                "error": "Acesso negado. Você não possui permissão para acessar este recurso."
            })
        );
        assert_eq!(store.queries(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[actix_rt::test]
    async fn repeated_requests_get_the_same_decision() {
        let store = Arc::new(StaticRoleStore::new(&[(4, Role::Advisor)]));
        let hits = Arc::new(AtomicUsize::new(0));
        let mut middleware = Authorized::role(Role::Student, store.clone())
            .new_transform(Downstream { hits: hits.clone() })
            .await
            .unwrap();

        // the store answers every request, decisions are not cached
        for round in 1..=3 {
            let err = middleware
                .call(protected_request(Some(4)))
                .await
                .err()
                .expect("decision must not drift between requests");
            let (status, _) = rejection(&err);
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(store.queries(), round);
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[actix_rt::test]
    async fn store_failure_surfaces_as_internal_error() {
        let hits = Arc::new(AtomicUsize::new(0));

        let result = run_gate(
            Authorized::role(Role::Advisor, Arc::new(BrokenRoleStore)),
            hits.clone(),
            Some(7),
        )
        .await;

        let err = result.err().expect("store failure must fail the request");
        let response = err.as_response_error().error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}

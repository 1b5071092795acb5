mod authorization;
mod identity;
mod roles;
mod store;

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};

pub use authorization::{AccessError, Authorized};
pub use identity::IdentityService;
pub use roles::{Role, ALL_ROLES};
pub use store::{OracleRoleStore, RoleStore};

#[cfg(test)]
pub use store::testing;

/// Identity resolved for the current request, or absent for anonymous ones.
#[derive(Clone, Debug)]
pub struct SecurityContext {
    user_id: u32, // this is ID of user
}

impl SecurityContext {
    pub fn new(user_id: u32) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> u32 {
        self.user_id
    }
}

// handlers behind a gate can take the context as an extractor argument
impl FromRequest for SecurityContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;
    type Config = ();

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let context = req.extensions().get::<SecurityContext>().cloned();
        ready(context.ok_or_else(|| AccessError::Unauthenticated.into()))
    }
}

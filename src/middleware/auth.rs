use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::database::Database;
use crate::models::{is_admitted, RoleSet};
use crate::services::auth_service::{bearer_token, Claims, SessionTokens};
use crate::services::role_service;
use crate::utils::error::AppError;

/// Verifies the bearer token and attaches its `Claims` to the request.
///
/// Rejects with 401 before the wrapped service runs.
pub struct RequireAuth;

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthService { service }))
    }
}

pub struct RequireAuthService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequireAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let verified = {
            let header = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());

            match (req.app_data::<web::Data<SessionTokens>>(), bearer_token(header)) {
                (Some(tokens), Some(token)) => tokens.verify(token),
                (None, _) => {
                    log::error!("❌ SessionTokens missing from app data");
                    Err(AppError::Unauthorized)
                }
                (_, None) => Err(AppError::Unauthorized),
            }
        };

        match verified {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await })
            }
            Err(e) => {
                log::warn!("🔒 {} {} rejected: missing or invalid token", req.method(), req.path());
                Box::pin(async move { Err(e.into()) })
            }
        }
    }
}

/// Admits the request only if the caller's current stored role is in `allowed`.
///
/// Must sit inside `RequireAuth`. The role is looked up on every request, so role
/// changes take effect without re-issuing tokens.
pub struct RequireRole {
    allowed: RoleSet,
}

impl RequireRole {
    pub fn new(allowed: RoleSet) -> Self {
        Self { allowed }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleService {
            service: Rc::new(service),
            allowed: self.allowed,
        }))
    }
}

pub struct RequireRoleService<S> {
    service: Rc<S>,
    allowed: RoleSet,
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let allowed = self.allowed;

        Box::pin(async move {
            let email = req.extensions().get::<Claims>().map(|claims| claims.email.clone());
            let Some(email) = email else {
                log::error!("❌ RequireRole used without RequireAuth on {}", req.path());
                return Err(AppError::Unauthorized.into());
            };

            let db = req
                .app_data::<web::Data<Database>>()
                .cloned()
                .ok_or_else(|| AppError::Database("Database missing from app data".to_string()))?;

            match role_service::role_of(&db, &email).await? {
                Some(role) if is_admitted(role, allowed) => service.call(req).await,
                role => {
                    log::warn!(
                        "🚫 {} {} forbidden for {} (role: {:?})",
                        req.method(),
                        req.path(),
                        email,
                        role
                    );
                    Err(AppError::Forbidden.into())
                }
            }
        })
    }
}

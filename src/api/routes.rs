//! Demo API routes.
//!
//! | Route | Records beyond the middleware's |
//! |---|---|
//! | `GET <health path>` | none (bypassed) |
//! | `POST /api/auth/register` | `db.createUser` timer, `user.register` audit |
//! | `POST /api/auth/login` | `db.verifyCredentials` timer, `user.login` / `user.login_failed` audit |
//! | `POST /api/auth/logout` | `user.logout` audit |
//! | `GET /api/users/{id}` | `db.findUser` timer |
//! | `GET /api/debug/error` | handler failure |

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::api::users::{StoreError, UserStore};
use crate::http::request::same_path;
use crate::http::{ApiHandler, ApiRequest, ApiResponse, HandlerError, RequestContext};
use crate::observability::audit::{events, AuditTrail};
use crate::observability::{fields, Fields};

#[derive(Debug, Deserialize)]
struct Credentials {
    email: String,
    password: String,
    #[serde(default)]
    name: Option<String>,
}

impl Credentials {
    fn validate(&self) -> Result<(), HandlerError> {
        if !self.email.contains('@') {
            return Err(HandlerError::BadRequest("email is invalid".to_string()));
        }
        if self.password.is_empty() {
            return Err(HandlerError::BadRequest("password is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Logout {
    user_id: String,
}

/// Route table for the demo service.
pub struct ApiRoutes {
    store: Arc<UserStore>,
    health_path: String,
}

impl ApiRoutes {
    pub fn new(store: Arc<UserStore>, health_path: impl Into<String>) -> Self {
        Self {
            store,
            health_path: health_path.into(),
        }
    }

    async fn register(
        &self,
        ctx: &RequestContext,
        req: &ApiRequest,
        res: &mut dyn ApiResponse,
    ) -> Result<(), HandlerError> {
        let creds: Credentials = req.json()?;
        creds.validate()?;

        let timer = ctx.logger().database().start_timer("db.createUser");
        let created = self
            .store
            .create(&creds.email, creds.name.clone(), &creds.password)
            .await;
        timer.complete(fields(json!({ "success": created.is_ok() })));

        match created {
            Ok(user) => {
                AuditTrail::new(ctx.logger()).log_event(
                    events::USER_REGISTER,
                    Some(&user.id),
                    fields(json!({ "email": user.email })),
                );
                res.json(StatusCode::CREATED, json!({ "user": user }));
            }
            Err(StoreError::DuplicateEmail(_)) => {
                res.json(StatusCode::CONFLICT, json!({ "error": "Email already registered" }));
            }
        }
        Ok(())
    }

    async fn login(
        &self,
        ctx: &RequestContext,
        req: &ApiRequest,
        res: &mut dyn ApiResponse,
    ) -> Result<(), HandlerError> {
        let creds: Credentials = req.json()?;
        let audit = AuditTrail::new(ctx.logger());

        let user = ctx
            .logger()
            .database()
            .time("db.verifyCredentials", self.store.verify(&creds.email, &creds.password))
            .await?;

        match user {
            Some(user) => {
                audit.log_event(
                    events::USER_LOGIN,
                    Some(&user.id),
                    fields(json!({ "ip": req.client_ip() })),
                );
                res.json(StatusCode::OK, json!({ "user": user }));
            }
            None => {
                audit.log_event(
                    events::USER_LOGIN_FAILED,
                    None,
                    fields(json!({ "email": creds.email, "ip": req.client_ip() })),
                );
                res.json(StatusCode::UNAUTHORIZED, json!({ "error": "Invalid credentials" }));
            }
        }
        Ok(())
    }

    fn logout(
        &self,
        ctx: &RequestContext,
        req: &ApiRequest,
        res: &mut dyn ApiResponse,
    ) -> Result<(), HandlerError> {
        let logout: Logout = req.json()?;
        AuditTrail::new(ctx.logger()).log_event(events::USER_LOGOUT, Some(&logout.user_id), Fields::new());
        res.set_status(StatusCode::NO_CONTENT);
        res.end();
        Ok(())
    }

    async fn find_user(
        &self,
        ctx: &RequestContext,
        id: &str,
        res: &mut dyn ApiResponse,
    ) -> Result<(), HandlerError> {
        let user = ctx
            .logger()
            .database()
            .time("db.findUser", self.store.find_by_id(id))
            .await?;

        match user {
            Some(user) => res.json(StatusCode::OK, json!({ "user": user })),
            None => res.json(StatusCode::NOT_FOUND, json!({ "error": "User not found" })),
        }
        Ok(())
    }
}

#[async_trait]
impl ApiHandler for ApiRoutes {
    async fn handle(
        &self,
        ctx: &RequestContext,
        req: &ApiRequest,
        res: &mut dyn ApiResponse,
    ) -> Result<(), HandlerError> {
        let method = req.method().clone();
        let path = req.path().trim_end_matches('/');

        if same_path(path, &self.health_path) {
            res.json(
                StatusCode::OK,
                json!({ "status": "ok", "timestamp": ctx.logger().now().to_rfc3339() }),
            );
            return Ok(());
        }

        match (method, path) {
            (Method::POST, "/api/auth/register") => self.register(ctx, req, res).await,
            (Method::POST, "/api/auth/login") => self.login(ctx, req, res).await,
            (Method::POST, "/api/auth/logout") => self.logout(ctx, req, res),
            (Method::GET, "/api/debug/error") => {
                Err(HandlerError::Internal("simulated failure".to_string()))
            }
            (Method::GET, p) if p.starts_with("/api/users/") => {
                let id = &p["/api/users/".len()..];
                self.find_user(ctx, id, res).await
            }
            _ => {
                res.json(StatusCode::NOT_FOUND, json!({ "error": "Not found" }));
                Ok(())
            }
        }
    }
}

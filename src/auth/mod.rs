/// Authentication extractors and utilities
pub mod password;

use crate::{context::AppContext, session::Session};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};

pub const STUDENT_LOGIN_PATH: &str = "/student/login";
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";

/// A logged-in student, identified by roll number
#[derive(Debug, Clone)]
pub struct StudentAuth {
    pub roll_number: String,
}

#[async_trait]
impl FromRequestParts<AppContext> for StudentAuth {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let session = match Session::from_request_parts(parts, state).await {
            Ok(session) => session,
            Err(never) => match never {},
        };

        match session.student_roll() {
            Some(roll_number) => Ok(StudentAuth {
                roll_number: roll_number.to_string(),
            }),
            None => {
                tracing::debug!("StudentAuth: no student session, redirecting to login");
                Err(Redirect::to(STUDENT_LOGIN_PATH))
            }
        }
    }
}

/// A logged-in admin whose account still exists
#[derive(Debug, Clone)]
pub struct AdminAuth {
    pub id: i64,
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppContext> for AdminAuth {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let session = match Session::from_request_parts(parts, state).await {
            Ok(session) => session,
            Err(never) => match never {},
        };

        let Some((id, _)) = session.admin() else {
            tracing::debug!("AdminAuth: no admin session, redirecting to login");
            return Err(Redirect::to(ADMIN_LOGIN_PATH).into_response());
        };

        // The token may outlive the account it names, e.g. after the database is reset
        match state.admin_manager.get_admin(id).await {
            Ok(Some(admin)) => Ok(AdminAuth {
                id: admin.id,
                username: admin.username,
            }),
            Ok(None) => {
                tracing::warn!(admin_id = id, "AdminAuth: session names an unknown admin");
                Err(Redirect::to(ADMIN_LOGIN_PATH).into_response())
            }
            Err(e) => Err(e.into_response()),
        }
    }
}

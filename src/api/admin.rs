/// Admin portal: registration, login, and the complaint management dashboard
use crate::{
    auth::{AdminAuth, ADMIN_LOGIN_PATH},
    complaints::ComplaintFilter,
    context::AppContext,
    error::AppResult,
    session::Session,
    validation::{validate_admin_registration, validate_complaint_update, ComplaintUpdateForm},
    views::{self, AdminDashboard},
};
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use tracing::{info, warn};

const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Build admin portal routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route(ADMIN_LOGIN_PATH, get(login_page).post(login))
        .route("/admin/register", get(register_page).post(register))
        .route(DASHBOARD_PATH, get(dashboard).post(update_complaint))
        .route("/admin/logout", get(logout))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CredentialsForm {
    username: String,
    password: String,
}

/// Decoded query or form pairs. A repeated key keeps its first value.
struct Fields(Vec<(String, String)>);

impl Fields {
    fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn value(&self, key: &str) -> &str {
        self.first(key).unwrap_or("")
    }
}

/// Dashboard filters as they arrive in a query string or form body
#[derive(Debug)]
struct FilterParams<'a> {
    status_filter: Option<&'a str>,
    category_filter: Option<&'a str>,
    priority_filter: Option<&'a str>,
}

impl<'a> FilterParams<'a> {
    fn from_fields(fields: &'a Fields) -> Self {
        FilterParams {
            status_filter: fields.first("status_filter"),
            category_filter: fields.first("category_filter"),
            priority_filter: fields.first("priority_filter"),
        }
    }

    fn to_filter(&self) -> ComplaintFilter {
        ComplaintFilter::from_raw(self.status_filter, self.category_filter, self.priority_filter)
    }

    /// Query values win over body values, field by field
    fn or(self, fallback: FilterParams<'a>) -> FilterParams<'a> {
        FilterParams {
            status_filter: self.status_filter.or(fallback.status_filter),
            category_filter: self.category_filter.or(fallback.category_filter),
            priority_filter: self.priority_filter.or(fallback.priority_filter),
        }
    }
}

async fn login_page(State(ctx): State<AppContext>, mut session: Session) -> Response {
    let notices = session.take_notices();
    (session, Html(views::admin_login(ctx.branding(), &notices))).into_response()
}

async fn login(
    State(ctx): State<AppContext>,
    mut session: Session,
    Form(form): Form<CredentialsForm>,
) -> AppResult<Response> {
    let username = form.username.trim();

    match ctx.admin_manager.authenticate(username, &form.password).await? {
        Some(admin) => {
            info!(admin_id = admin.id, username = %admin.username, "admin logged in");
            session.login_admin(admin.id, admin.username);
            Ok((session, Redirect::to(DASHBOARD_PATH)).into_response())
        }
        None => {
            warn!(username = %username, "admin login failed");
            session.flash("Invalid admin username or password.");
            let notices = session.take_notices();
            Ok((session, Html(views::admin_login(ctx.branding(), &notices))).into_response())
        }
    }
}

async fn register_page(State(ctx): State<AppContext>, mut session: Session) -> Response {
    let notices = session.take_notices();
    (session, Html(views::admin_register(ctx.branding(), &notices))).into_response()
}

async fn register(
    State(ctx): State<AppContext>,
    mut session: Session,
    Form(form): Form<CredentialsForm>,
) -> AppResult<Response> {
    let outcome = match validate_admin_registration(&form.username, &form.password) {
        Ok(registration) => ctx.admin_manager.register(&registration).await.map(|_| ()),
        Err(e) => Err(e.into()),
    };

    match outcome {
        Ok(()) => {
            session.flash("Admin account created. Please login.");
            Ok((session, Redirect::to(ADMIN_LOGIN_PATH)).into_response())
        }
        Err(e) => {
            let Some(notice) = e.notice() else {
                return Err(e);
            };
            session.flash(notice);
            let notices = session.take_notices();
            Ok((session, Html(views::admin_register(ctx.branding(), &notices))).into_response())
        }
    }
}

async fn render_dashboard(
    ctx: &AppContext,
    admin: &AdminAuth,
    mut session: Session,
    filter: ComplaintFilter,
) -> AppResult<Response> {
    let complaints = ctx.complaint_manager.list_for_admin(&filter).await?;
    let summary = ctx.complaint_manager.status_summary().await?;
    let notices = session.take_notices();

    let view = AdminDashboard {
        admin_username: &admin.username,
        complaints: &complaints,
        summary,
        filter,
    };
    let page = views::admin_dashboard(ctx.branding(), &notices, &view);
    Ok((session, Html(page)).into_response())
}

async fn dashboard(
    State(ctx): State<AppContext>,
    admin: AdminAuth,
    session: Session,
    Query(query): Query<Vec<(String, String)>>,
) -> AppResult<Response> {
    let query = Fields(query);
    let filter = FilterParams::from_fields(&query).to_filter();
    render_dashboard(&ctx, &admin, session, filter).await
}

async fn update_complaint(
    State(ctx): State<AppContext>,
    admin: AdminAuth,
    mut session: Session,
    Query(query): Query<Vec<(String, String)>>,
    Form(body): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let (query, body) = (Fields(query), Fields(body));
    let filter = FilterParams::from_fields(&query)
        .or(FilterParams::from_fields(&body))
        .to_filter();

    let update = ComplaintUpdateForm {
        complaint_id: body.value("complaint_id"),
        status: body.value("status"),
        priority: body.value("priority"),
        staff_assigned: body.value("staff_assigned"),
        remarks: body.value("remarks"),
    };
    let update = match validate_complaint_update(&update) {
        Ok(update) => update,
        Err(e) => {
            session.flash(e.to_string());
            return render_dashboard(&ctx, &admin, session, filter).await;
        }
    };

    ctx.complaint_manager.update(&update).await?;
    info!(
        admin_id = admin.id,
        complaint_id = update.complaint_id,
        status = update.status.as_str(),
        "complaint updated by admin"
    );

    session.flash(format!("Complaint #{} updated.", update.complaint_id));
    let location = format!("{}?{}", DASHBOARD_PATH, filter.to_query_string());
    Ok((session, Redirect::to(&location)).into_response())
}

async fn logout(mut session: Session) -> impl IntoResponse {
    session.logout_admin();
    session.flash("Admin logged out.");
    (session, Redirect::to(ADMIN_LOGIN_PATH))
}

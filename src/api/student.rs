/// Student portal: roll-number login, complaint submission and history
use crate::{
    auth::{StudentAuth, STUDENT_LOGIN_PATH},
    context::AppContext,
    error::{AppError, AppResult},
    session::Session,
    validation::{validate_complaint_submission, validate_roll_number, ComplaintSubmission},
    views,
};
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use tracing::{debug, info};

const DASHBOARD_PATH: &str = "/student/dashboard";

/// Build student portal routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route(STUDENT_LOGIN_PATH, get(login_page).post(login))
        .route(DASHBOARD_PATH, get(dashboard).post(submit_complaint))
        .route("/student/logout", get(logout))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginForm {
    roll_number: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ComplaintForm {
    hostel_block: String,
    room_number: String,
    category: String,
    priority: String,
    description: String,
}

async fn login_page(State(ctx): State<AppContext>, mut session: Session) -> Response {
    let notices = session.take_notices();
    (session, Html(views::student_login(ctx.branding(), &notices))).into_response()
}

async fn login(
    State(ctx): State<AppContext>,
    mut session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match validate_roll_number(&form.roll_number) {
        Ok(roll_number) => {
            info!("student logged in");
            debug!(roll_number = %roll_number, "student identity");
            session.login_student(roll_number);
            (session, Redirect::to(DASHBOARD_PATH)).into_response()
        }
        Err(e) => {
            session.flash(e.to_string());
            let notices = session.take_notices();
            (session, Html(views::student_login(ctx.branding(), &notices))).into_response()
        }
    }
}

async fn render_dashboard(
    ctx: &AppContext,
    student: &StudentAuth,
    mut session: Session,
) -> AppResult<Response> {
    let complaints = ctx
        .complaint_manager
        .list_for_student(&student.roll_number)
        .await?;
    let notices = session.take_notices();
    let page = views::student_dashboard(ctx.branding(), &student.roll_number, &notices, &complaints);
    Ok((session, Html(page)).into_response())
}

async fn dashboard(
    State(ctx): State<AppContext>,
    student: StudentAuth,
    session: Session,
) -> AppResult<Response> {
    render_dashboard(&ctx, &student, session).await
}

async fn submit_complaint(
    State(ctx): State<AppContext>,
    student: StudentAuth,
    mut session: Session,
    Form(form): Form<ComplaintForm>,
) -> AppResult<Response> {
    let submission = ComplaintSubmission {
        hostel_block: &form.hostel_block,
        room_number: &form.room_number,
        category: &form.category,
        priority: &form.priority,
        description: &form.description,
    };

    let complaint = match validate_complaint_submission(&submission) {
        Ok(complaint) => complaint,
        Err(e) => {
            session.flash(e.to_string());
            return render_dashboard(&ctx, &student, session).await;
        }
    };

    match ctx
        .complaint_manager
        .create(&student.roll_number, &complaint)
        .await
    {
        Ok(_) => session.flash("Complaint submitted successfully."),
        Err(e @ AppError::QuotaExceeded { .. }) => session.flash(e.to_string()),
        Err(e) => return Err(e),
    }

    Ok((session, Redirect::to(DASHBOARD_PATH)).into_response())
}

async fn logout(mut session: Session) -> impl IntoResponse {
    session.logout_student();
    session.flash("Student logged out.");
    (session, Redirect::to(STUDENT_LOGIN_PATH))
}

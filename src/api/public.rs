/// Public landing page
use crate::{context::AppContext, views};
use axum::{extract::State, response::Html, routing::get, Router};

pub fn routes() -> Router<AppContext> {
    Router::new().route("/", get(index))
}

async fn index(State(ctx): State<AppContext>) -> Html<String> {
    Html(views::index(ctx.branding()))
}

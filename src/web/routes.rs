use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::{templates, SharedState};
use crate::roster::Standing;

pub async fn index(State(state): State<SharedState>) -> Html<String> {
    Html(templates::index_page(&state.class_name))
}

pub async fn question(State(state): State<SharedState>) -> Response {
    let Some(pick) = state.pick() else {
        tracing::warn!(channel = %state.class_name, "question requested but roster is empty");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Html(templates::empty_roster_fragment(&state.class_name)),
        )
            .into_response();
    };

    tracing::info!(member = %pick.member_id, name = %pick.name, count = pick.count, "called on");
    Html(templates::question_fragment(&pick, &state.class_name)).into_response()
}

pub async fn standings(State(state): State<SharedState>) -> Json<Vec<Standing>> {
    Json(state.standings())
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

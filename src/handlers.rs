use crate::models::{EditSubmission, PageQuery};
use crate::state::AppState;
use crate::ui::render_page;
use crate::workflow::{build_page, PageRequest};
use axum::{
    extract::{rejection::FormRejection, Query, State},
    response::Html,
    Form,
};
use tracing::{debug, info};

pub async fn page(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Html<String> {
    respond(&state, PageRequest::new(query, None)).await
}

/// A body that is not a urlencoded form is treated as no submission, so the page renders
/// as it would for a GET.
pub async fn page_submit(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Html<String> {
    let submission = match form {
        Ok(Form(pairs)) => Some(EditSubmission::from_pairs(pairs)),
        Err(rejection) => {
            debug!("ignoring unreadable form body: {rejection}");
            None
        }
    };
    respond(&state, PageRequest::new(query, submission)).await
}

async fn respond(state: &AppState, request: PageRequest) -> Html<String> {
    let page = build_page(&state.registry, state.backend.as_ref(), &request).await;
    info!(
        campus = request.campus.as_deref().unwrap_or("-"),
        row = request.row,
        post = request.submission.is_some(),
        "rendered page"
    );
    Html(render_page(&page, &state.registry, &state.settings.done_url))
}

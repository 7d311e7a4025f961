use axum::Router;
use axum::body::Body;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::{Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::models::SearchForm;
use crate::page::{self, PageContext};
use crate::{SearchOutcome, ShoppingAssistant};

pub fn router(assistant: Arc<ShoppingAssistant>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/search", post(search))
        .route("/health", get(|| async { "ok" }))
        .layer(middleware::from_fn(log_request))
        .with_state(assistant)
}

async fn index(State(assistant): State<Arc<ShoppingAssistant>>) -> Html<String> {
    Html(page::render(&PageContext::form(assistant.default_location())))
}

async fn search(
    State(assistant): State<Arc<ShoppingAssistant>>,
    form: std::result::Result<Form<SearchForm>, FormRejection>,
) -> Response {
    // A missing or unreadable body is treated as an empty submission
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::info!(%rejection, "Search form rejected, treating as empty");
            SearchForm::default()
        }
    };
    let outcome = assistant.handle_search(&form).await;

    let mut ctx = PageContext {
        query: form.query.clone(),
        location: assistant.location_for(&form),
        ..PageContext::default()
    };
    if let Some(message) = outcome.error_message() {
        ctx = ctx.with_error(message);
    }

    let status = match outcome {
        SearchOutcome::Results {
            refined_query,
            comparison_table,
            summary,
        } => {
            ctx.refined_query = Some(refined_query);
            ctx.comparison_table = Some(comparison_table);
            ctx.summary = Some(summary);
            StatusCode::OK
        }
        SearchOutcome::Failed => StatusCode::BAD_GATEWAY,
        SearchOutcome::EmptyQuery | SearchOutcome::NoProducts { .. } => StatusCode::OK,
    };

    (status, Html(page::render(&ctx))).into_response()
}

/// Tag every request with an id and log its status and latency
async fn log_request(req: Request<Body>, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!(
        "request",
        %request_id,
        method = %req.method(),
        path = %req.uri().path()
    );

    async move {
        let started = Instant::now();
        let response = next.run(req).await;
        tracing::info!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request finished"
        );
        response
    }
    .instrument(span)
    .await
}

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};

use crate::core::config::UploadConfig;
use crate::core::middleware::{auth_middleware, optional_auth_middleware};
use crate::features::auth::JwtValidator;
use crate::features::reports::handlers::{self, ReportState};
use crate::features::reports::services::ReportService;

/// Create routes for the reports feature
///
/// `/api/reports` and `/api/reports/{id}` mix access levels per method, so
/// authentication is layered on each method router rather than on the router.
/// The `{id}` segment is a reference number for GET and messages, and the
/// internal id for DELETE.
pub fn routes(
    report_service: Arc<ReportService>,
    jwt_validator: Arc<JwtValidator>,
    limits: &UploadConfig,
) -> Router {
    let state = ReportState { report_service };

    let strict = from_fn_with_state(Arc::clone(&jwt_validator), auth_middleware);
    let optional = from_fn_with_state(jwt_validator, optional_auth_middleware);

    Router::new()
        .route(
            "/api/reports",
            post(handlers::submit_report)
                .route_layer(optional)
                .layer(DefaultBodyLimit::max(limits.max_request_body_size()))
                .merge(get(handlers::list_all_reports).route_layer(strict.clone())),
        )
        .route(
            "/api/reports/user",
            get(handlers::list_own_reports).route_layer(strict.clone()),
        )
        .route(
            "/api/reports/{id}",
            get(handlers::get_report).merge(delete(handlers::delete_report).route_layer(strict)),
        )
        .route("/api/reports/{id}/messages", post(handlers::add_message))
        .with_state(state)
}

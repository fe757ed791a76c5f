//! Quotation and quotation line routes.

use crate::handlers::quotations::{
    create_detail, create_quotation, list_details, list_quotations, quotation_lines, recent_quotations,
    update_quotation_status,
};
use crate::state::AppState;
use axum::{
    routing::{get, put},
    Router,
};

pub fn quotation_routes(state: AppState) -> Router {
    Router::new()
        .route("/quotations", get(list_quotations).post(create_quotation))
        .route("/quotations/recent", get(recent_quotations))
        .route("/quotations/:id/details", get(quotation_lines))
        .route("/quotations/:id/status", put(update_quotation_status))
        .route("/quotation-details", get(list_details).post(create_detail))
        .with_state(state)
}

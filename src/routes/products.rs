//! Product catalog routes.

use crate::handlers::products::{
    create_product, delete_product, get_product, get_product_by_code, list_products, update_product,
};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn product_routes(state: AppState) -> Router {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/by-code/:code", get(get_product_by_code))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(state)
}

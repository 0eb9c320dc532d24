// src/handlers.rs

use axum::{routing::{get, post}, Router};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc};

pub mod customers;

// Monta o router principal com todas as rotas da API
pub fn router(app_state: AppState) -> Router {
    let customer_routes = Router::new()
        .route("/"
               ,post(customers::insert_customer)
               .get(customers::query_customers)
               .put(customers::update_customers)
               .delete(customers::delete_customers)
        )
        .route("/reconcile"
               ,post(customers::reconcile_customers)
        )
        .route("/{id}"
               ,get(customers::get_customer)
        );

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/customers", customer_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}

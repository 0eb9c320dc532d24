// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Clientes ---
        handlers::customers::insert_customer,
        handlers::customers::query_customers,
        handlers::customers::get_customer,
        handlers::customers::update_customers,
        handlers::customers::delete_customers,
        handlers::customers::reconcile_customers,
    ),
    components(
        schemas(
            models::customer::DocumentType,
            models::customer::CustomerFields,
            models::customer::CustomerRecord,
            models::customer::EditedRow,
            models::customer::CustomerPage,
            models::customer::ReconcileSummary,

            handlers::customers::CreatedResponse,
            handlers::customers::CountResponse,
            handlers::customers::DeleteCustomersPayload,
            handlers::customers::ReconcilePayload,
        )
    ),
    tags(
        (name = "Clientes", description = "Cadastro, consulta e reconciliação de clientes")
    )
)]
pub struct ApiDoc;

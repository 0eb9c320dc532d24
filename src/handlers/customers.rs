// src/handlers/customers.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::customer::{
        CustomerFields, CustomerFilter, CustomerPage, CustomerQuery, CustomerRecord, EditedRow,
        ReconcileSummary,
    },
};

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteCustomersPayload {
    #[schema(example = json!([3, 7]))]
    pub ids: Vec<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReconcilePayload {
    pub edited: Vec<EditedRow>,
    pub baseline: Vec<CustomerRecord>,
}

// POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Clientes",
    request_body = CustomerFields,
    responses(
        (status = 201, description = "Cliente criado", body = CreatedResponse),
        (status = 409, description = "CPF ou CNPJ já cadastrado"),
        (status = 422, description = "Dados inválidos")
    )
)]
pub async fn insert_customer(
    State(app_state): State<AppState>,
    Json(payload): Json<CustomerFields>,
) -> Result<impl IntoResponse, AppError> {
    let id = app_state.customer_service.insert(&payload).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Clientes",
    params(CustomerQuery),
    responses(
        (status = 200, description = "Página de clientes", body = CustomerPage),
        (status = 400, description = "Paginação inválida")
    )
)]
pub async fn query_customers(
    State(app_state): State<AppState>,
    Query(params): Query<CustomerQuery>,
) -> Result<impl IntoResponse, AppError> {
    params.validate()?;

    let filter = CustomerFilter::new(params.search.as_deref(), params.state.as_deref());
    let page = app_state
        .customer_service
        .query(&filter, params.page, params.page_size)
        .await?;

    Ok((StatusCode::OK, Json(page)))
}

// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Clientes",
    params(("id" = i64, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente", body = CustomerRecord),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state
        .customer_service
        .get_by_id(id)
        .await?
        .ok_or(AppError::NotFound(id))?;

    Ok((StatusCode::OK, Json(customer)))
}

// PUT /api/customers
#[utoipa::path(
    put,
    path = "/api/customers",
    tag = "Clientes",
    request_body = Vec<CustomerRecord>,
    responses(
        (status = 200, description = "Linhas atualizadas", body = CountResponse),
        (status = 404, description = "Algum id não existe; nada foi gravado"),
        (status = 409, description = "CPF ou CNPJ já cadastrado; nada foi gravado"),
        (status = 422, description = "Dados inválidos; nada foi gravado")
    )
)]
pub async fn update_customers(
    State(app_state): State<AppState>,
    Json(rows): Json<Vec<CustomerRecord>>,
) -> Result<impl IntoResponse, AppError> {
    let count = app_state.customer_service.update_many(&rows).await?;

    Ok((StatusCode::OK, Json(CountResponse { count })))
}

// DELETE /api/customers
#[utoipa::path(
    delete,
    path = "/api/customers",
    tag = "Clientes",
    request_body = DeleteCustomersPayload,
    responses(
        (status = 200, description = "Linhas excluídas", body = CountResponse)
    )
)]
pub async fn delete_customers(
    State(app_state): State<AppState>,
    Json(payload): Json<DeleteCustomersPayload>,
) -> Result<impl IntoResponse, AppError> {
    let count = app_state.customer_service.delete_many(&payload.ids).await?;

    Ok((StatusCode::OK, Json(CountResponse { count })))
}

// POST /api/customers/reconcile
#[utoipa::path(
    post,
    path = "/api/customers/reconcile",
    tag = "Clientes",
    request_body = ReconcilePayload,
    responses(
        (status = 200, description = "Alterações aplicadas", body = ReconcileSummary),
        (status = 409, description = "CPF ou CNPJ já cadastrado; nada foi gravado"),
        (status = 422, description = "Linhas inválidas; nada foi gravado")
    )
)]
pub async fn reconcile_customers(
    State(app_state): State<AppState>,
    Json(payload): Json<ReconcilePayload>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state
        .reconcile_service
        .reconcile(&payload.edited, &payload.baseline)
        .await?;

    Ok((StatusCode::OK, Json(summary)))
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{models::customer::DocumentType, validation::ValidationReport};

#[derive(Debug, Error)]
pub enum AppError {
    // Falhas de entrada: sempre recuperáveis, com o campo (e a linha) culpado
    #[error("Erro de validação: {0}")]
    Validation(ValidationReport),

    // Violação de UNIQUE em cpf/cnpj, com a coluna que colidiu
    #[error("{document_type} '{value}' já cadastrado")]
    DuplicateDocument {
        document_type: DocumentType,
        value: String,
    },

    #[error("Cliente {0} não encontrado")]
    NotFound(i64),

    #[error("Paginação inválida: página {page}, tamanho {page_size}")]
    InvalidPage { page: i64, page_size: i64 },

    #[error("Parâmetros inválidos")]
    InvalidParams(#[from] validator::ValidationErrors),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de migração: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl From<ValidationReport> for AppError {
    fn from(report: ValidationReport) -> Self {
        AppError::Validation(report)
    }
}

impl AppError {
    /// Falha de armazenamento (transação / banco), em oposição a erro do chamador.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            AppError::DatabaseError(_) | AppError::MigrationError(_) | AppError::InternalServerError(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo
            AppError::Validation(report) => {
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": report,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::InvalidParams(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Parâmetros inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::DuplicateDocument { document_type, value } => {
                let body = Json(json!({
                    "error": format!("O {} informado já existe no banco de dados.", document_type),
                    "field": document_type.column(),
                    "value": value,
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Cliente não encontrado."),
            AppError::InvalidPage { .. } => (StatusCode::BAD_REQUEST, "Página e tamanho de página devem ser maiores que zero."),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

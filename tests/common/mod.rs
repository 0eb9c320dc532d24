#![allow(dead_code)]

use cadastro::{
    config::AppState,
    db,
    models::customer::{CustomerFields, DocumentType},
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub const CPF_A: &str = "111.444.777-35";
pub const CPF_B: &str = "123.456.789-09";
pub const CPF_C: &str = "987.654.321-00";
pub const CPF_D: &str = "529.982.247-25";
pub const CNPJ_A: &str = "11.222.333/0001-81";
pub const CNPJ_B: &str = "11.222.333/0002-62";

// Banco em memória vive enquanto a única conexão da pool estiver aberta
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("pool em memória")
}

pub async fn test_state() -> AppState {
    let pool = memory_pool().await;
    db::prepare(&pool).await.expect("migrações");
    AppState::from_pool(pool)
}

pub fn person(name: &str, cpf: &str) -> CustomerFields {
    CustomerFields {
        full_name: Some(name.to_string()),
        document_type: Some(DocumentType::Cpf),
        cpf: Some(cpf.to_string()),
        ..Default::default()
    }
}

pub fn company(name: &str, cnpj: &str) -> CustomerFields {
    CustomerFields {
        full_name: Some(name.to_string()),
        document_type: Some(DocumentType::Cnpj),
        cnpj: Some(cnpj.to_string()),
        ..Default::default()
    }
}

pub async fn count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM customers")
        .fetch_one(pool)
        .await
        .expect("contagem")
}

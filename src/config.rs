// src/config.rs

use std::env;

use anyhow::Context;
use sqlx::SqlitePool;

use crate::{
    db::{self, CustomerRepository},
    services::{CustomerService, ReconcileService},
};

/// Configuração lida do ambiente (e do `.env`, quando existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://customers.db".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            max_connections: 5,
            busy_timeout_secs: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.max_connections)?,
            busy_timeout_secs: parse_var("DB_BUSY_TIMEOUT_SECS", defaults.busy_timeout_secs)?,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} deve ser um número válido", name)),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub customer_service: CustomerService,
    pub reconcile_service: ReconcileService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = db::connect(config)
            .await
            .context("Falha ao conectar ao banco de dados")?;
        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        db::prepare(&db_pool)
            .await
            .context("Falha ao preparar o esquema do banco de dados")?;

        Ok(Self::from_pool(db_pool))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: SqlitePool) -> Self {
        let customer_service = CustomerService::new(CustomerRepository::new(), db_pool.clone());
        let reconcile_service = ReconcileService::new(customer_service.clone());

        Self {
            db_pool,
            customer_service,
            reconcile_service,
        }
    }
}

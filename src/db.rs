pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod legacy;

use std::{str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

use crate::{common::error::AppError, config::Config};

/// Abre a pool do SQLite. O busy timeout faz um escritor esperar a transação
/// ativa terminar em vez de falhar na hora; o WAL deixa os leitores verem
/// sempre um estado já commitado.
pub async fn connect(config: &Config) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(config.busy_timeout_secs))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Deixa o banco pronto: separa a tabela legada, roda as migrações e importa
/// as linhas legadas para o esquema novo.
pub async fn prepare(pool: &SqlitePool) -> Result<(), AppError> {
    let detached = legacy::detach_legacy_table(pool).await?;

    sqlx::migrate!().run(pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    if detached || legacy::legacy_table_exists(pool).await? {
        legacy::import_legacy_rows(pool).await?;
    }
    Ok(())
}

// src/services/customer_service.rs

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::{
    common::error::AppError,
    db::CustomerRepository,
    models::customer::{CustomerFields, CustomerFilter, CustomerPage, CustomerRecord, ReconcileSummary},
    validation::{validate_customer, ValidatedCustomer, ValidationReport},
};

/// O "Record Store": dono da tabela de clientes. Toda operação de escrita roda
/// numa única transação; qualquer falha no meio do lote desfaz tudo.
#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository,
    pool: SqlitePool,
}

impl CustomerService {
    pub fn new(repo: CustomerRepository, pool: SqlitePool) -> Self {
        Self { repo, pool }
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    /// Valida e insere um cliente novo. O banco atribui `id` e `registered_at`.
    pub async fn insert(&self, fields: &CustomerFields) -> Result<i64, AppError> {
        // Validação antes de abrir a transação: entrada ruim nunca chega ao banco
        let customer = validate_customer(fields).inspect_err(|report| {
            tracing::warn!("Cadastro rejeitado na validação: {}", report);
        })?;

        let mut tx = self.pool.begin().await?;
        let outcome = self.repo.insert(&mut *tx, &customer).await;
        let id = finish(tx, outcome).await?;

        tracing::info!(
            "Cliente '{}' inserido com sucesso (id {}).",
            customer.fields().full_name.as_deref().unwrap_or_default(),
            id
        );
        Ok(id)
    }

    /// Substitui linhas inteiras pelo id. Todas as linhas são validadas antes;
    /// um id inexistente ou um documento repetido aborta o lote inteiro.
    pub async fn update_many(&self, rows: &[CustomerRecord]) -> Result<u64, AppError> {
        let mut report = ValidationReport::default();
        let mut updates = Vec::with_capacity(rows.len());

        for row in rows {
            match validate_customer(&row.fields) {
                Ok(customer) => updates.push((row.id, customer)),
                Err(row_report) => report.extend(row_report.for_row(row.id)),
            }
        }
        if !report.is_empty() {
            tracing::warn!("Atualização em lote rejeitada: {}", report);
            return Err(report.into());
        }

        let summary = self.apply_changes(&updates, &[]).await?;
        Ok(summary.updated)
    }

    /// Exclusão física por id. Ids que não existem são ignorados.
    pub async fn delete_many(&self, ids: &[i64]) -> Result<u64, AppError> {
        let summary = self.apply_changes(&[], ids).await?;
        Ok(summary.deleted)
    }

    /// Aplica atualizações (já validadas) e exclusões numa transação só.
    pub(crate) async fn apply_changes(
        &self,
        updates: &[(i64, ValidatedCustomer)],
        deletes: &[i64],
    ) -> Result<ReconcileSummary, AppError> {
        if updates.is_empty() && deletes.is_empty() {
            return Ok(ReconcileSummary::default());
        }

        let mut tx = self.pool.begin().await?;
        let outcome = self.apply_in(&mut tx, updates, deletes).await;
        let summary = finish(tx, outcome).await?;

        tracing::info!(
            "Alterações gravadas: {} atualizados, {} excluídos.",
            summary.updated,
            summary.deleted
        );
        Ok(summary)
    }

    async fn apply_in(
        &self,
        tx: &mut Transaction<'static, Sqlite>,
        updates: &[(i64, ValidatedCustomer)],
        deletes: &[i64],
    ) -> Result<ReconcileSummary, AppError> {
        let mut summary = ReconcileSummary::default();

        for (id, customer) in updates {
            let affected = self.repo.update(&mut **tx, *id, customer).await?;
            if affected == 0 {
                return Err(AppError::NotFound(*id));
            }
            summary.updated += affected;
        }

        for id in deletes {
            summary.deleted += self.repo.delete(&mut **tx, *id).await?;
        }

        Ok(summary)
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn get_by_id(&self, id: i64) -> Result<Option<CustomerRecord>, AppError> {
        self.repo.find_by_id(&self.pool, id).await
    }

    /// Página filtrada, do id mais alto para o mais baixo. `total` conta tudo o
    /// que atende ao filtro, não só a página.
    pub async fn query(
        &self,
        filter: &CustomerFilter,
        page: i64,
        page_size: i64,
    ) -> Result<CustomerPage, AppError> {
        if page < 1 || page_size < 1 {
            return Err(AppError::InvalidPage { page, page_size });
        }
        let offset = (page - 1).saturating_mul(page_size);

        // Contagem e página lidas do mesmo snapshot
        let mut tx = self.pool.begin().await?;
        let total = self.repo.count(&mut *tx, filter).await?;
        let rows = self.repo.list(&mut *tx, filter, page_size, offset).await?;
        tx.commit().await?;

        Ok(CustomerPage { rows, total })
    }
}

// Commit em caso de sucesso; rollback explícito antes de devolver o erro
async fn finish<T>(
    tx: Transaction<'static, Sqlite>,
    outcome: Result<T, AppError>,
) -> Result<T, AppError> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!("Falha no rollback após '{}': {}", e, rollback_err);
            }
            Err(e)
        }
    }
}

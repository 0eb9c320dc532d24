// src/db/customer_repo.rs

use chrono::NaiveDate;
use sqlx::{query::Query, sqlite::SqliteArguments, Executor, Sqlite};

use crate::{
    common::error::AppError,
    models::customer::{CustomerFilter, CustomerRecord, DocumentType},
    validation::ValidatedCustomer,
};

const COLUMNS: &str = "id, full_name, document_type, cpf, cnpj, contact1_name, phone1, \
    contact2_name, phone2, role_title, email, birth_or_founding_date, postal_code, street, \
    number, complement, district, city, state, notes, registered_at";

// ?1 = trecho com curingas, ?2 = UF, ?3 = trecho só com dígitos (documentos sem máscara)
const FILTER: &str = r#"
    WHERE (?1 IS NULL
           OR full_name LIKE ?1 ESCAPE '\'
           OR cpf LIKE ?1 ESCAPE '\'
           OR cnpj LIKE ?1 ESCAPE '\'
           OR (?3 IS NOT NULL AND replace(replace(replace(coalesce(cpf, cnpj), '.', ''), '-', ''), '/', '') LIKE ?3))
      AND (?2 IS NULL OR state = ?2)
"#;

// O repositório de clientes, responsável por todas as interações com a tabela 'customers'.
// Todas as funções recebem o executor para poderem rodar dentro da transação do serviço.
#[derive(Clone, Default)]
pub struct CustomerRepository;

impl CustomerRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    /// Insere o cliente e devolve o id gerado. `registered_at` fica com o default do banco.
    pub async fn insert<'e, E>(
        &self,
        executor: E,
        customer: &ValidatedCustomer,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = "INSERT INTO customers (
                full_name, document_type, cpf, cnpj, contact1_name, phone1, contact2_name,
                phone2, role_title, email, birth_or_founding_date, postal_code, street,
                number, complement, district, city, state, notes
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

        let result = bind_fields(sqlx::query(sql), customer)
            .execute(executor)
            .await
            .map_err(|e| map_write_error(e, customer))?;

        Ok(result.last_insert_rowid())
    }

    /// Insere preservando id e data de cadastro (usado na importação legada).
    pub async fn insert_with_identity<'e, E>(
        &self,
        executor: E,
        id: i64,
        registered_at: NaiveDate,
        customer: &ValidatedCustomer,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = "INSERT INTO customers (
                full_name, document_type, cpf, cnpj, contact1_name, phone1, contact2_name,
                phone2, role_title, email, birth_or_founding_date, postal_code, street,
                number, complement, district, city, state, notes, id, registered_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

        bind_fields(sqlx::query(sql), customer)
            .bind(id)
            .bind(registered_at)
            .execute(executor)
            .await
            .map_err(|e| map_write_error(e, customer))?;

        Ok(())
    }

    /// Substitui a linha inteira (menos id e registered_at). Retorna quantas linhas mudaram.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i64,
        customer: &ValidatedCustomer,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = "UPDATE customers SET
                full_name = ?, document_type = ?, cpf = ?, cnpj = ?, contact1_name = ?,
                phone1 = ?, contact2_name = ?, phone2 = ?, role_title = ?, email = ?,
                birth_or_founding_date = ?, postal_code = ?, street = ?, number = ?,
                complement = ?, district = ?, city = ?, state = ?, notes = ?
            WHERE id = ?";

        let result = bind_fields(sqlx::query(sql), customer)
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| map_write_error(e, customer))?;

        Ok(result.rows_affected())
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: i64,
    ) -> Result<Option<CustomerRecord>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {} FROM customers WHERE id = ?", COLUMNS);
        let customer = sqlx::query_as::<_, CustomerRecord>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(customer)
    }

    pub async fn count<'e, E>(&self, executor: E, filter: &CustomerFilter) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT COUNT(id) FROM customers {}", FILTER);
        let (pattern, state, digits) = filter_params(filter);

        let total = sqlx::query_scalar::<_, i64>(&sql)
            .bind(pattern)
            .bind(state)
            .bind(digits)
            .fetch_one(executor)
            .await?;

        Ok(total)
    }

    /// Página de clientes do mais novo para o mais antigo.
    pub async fn list<'e, E>(
        &self,
        executor: E,
        filter: &CustomerFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CustomerRecord>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "SELECT {} FROM customers {} ORDER BY id DESC LIMIT ?4 OFFSET ?5",
            COLUMNS, FILTER
        );
        let (pattern, state, digits) = filter_params(filter);

        let customers = sqlx::query_as::<_, CustomerRecord>(&sql)
            .bind(pattern)
            .bind(state)
            .bind(digits)
            .bind(limit)
            .bind(offset)
            .fetch_all(executor)
            .await?;

        Ok(customers)
    }
}

// Os 19 campos mutáveis, sempre na mesma ordem dos INSERT/UPDATE acima
fn bind_fields<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    customer: &'q ValidatedCustomer,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    let f = customer.fields();
    query
        .bind(f.full_name.as_deref())
        .bind(customer.document_type())
        .bind(f.cpf.as_deref())
        .bind(f.cnpj.as_deref())
        .bind(f.contact1_name.as_deref())
        .bind(f.phone1.as_deref())
        .bind(f.contact2_name.as_deref())
        .bind(f.phone2.as_deref())
        .bind(f.role_title.as_deref())
        .bind(f.email.as_deref())
        .bind(f.birth_or_founding_date)
        .bind(f.postal_code.as_deref())
        .bind(f.street.as_deref())
        .bind(f.number.as_deref())
        .bind(f.complement.as_deref())
        .bind(f.district.as_deref())
        .bind(f.city.as_deref())
        .bind(f.state.as_deref())
        .bind(f.notes.as_deref())
}

// Converte violação de UNIQUE em DuplicateDocument, apontando a coluna que colidiu.
// O SQLite informa a coluna na mensagem: "UNIQUE constraint failed: customers.cpf".
fn map_write_error(e: sqlx::Error, customer: &ValidatedCustomer) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            let document_type = if message.contains("customers.cnpj") {
                DocumentType::Cnpj
            } else if message.contains("customers.cpf") {
                DocumentType::Cpf
            } else {
                // Colisão de id (importação legada), não de documento
                return e.into();
            };
            let value = customer.document(document_type).unwrap_or_default().to_string();

            tracing::warn!("Tentativa de gravar {} duplicado: {}", document_type, value);
            return AppError::DuplicateDocument { document_type, value };
        }
    }
    e.into()
}

fn filter_params(filter: &CustomerFilter) -> (Option<String>, Option<String>, Option<String>) {
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let pattern = search.map(|s| format!("%{}%", escape_like(s)));

    // "111444" também deve achar "111.444.777-35"
    let digits = search.and_then(|s| {
        let digits: String = s.chars().filter(char::is_ascii_digit).collect();
        let punctuation_only = s.chars().all(|c| c.is_ascii_digit() || ".-/ ".contains(c));
        (!digits.is_empty() && punctuation_only).then(|| format!("%{}%", digits))
    });

    let state = filter
        .state
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_ascii_uppercase);

    (pattern, state, digits)
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn filter_params_normalize_input() {
        let filter = CustomerFilter::new(Some("  111.444 "), Some("sp"));
        let (pattern, state, digits) = filter_params(&filter);
        assert_eq!(pattern.as_deref(), Some("%111.444%"));
        assert_eq!(state.as_deref(), Some("SP"));
        assert_eq!(digits.as_deref(), Some("%111444%"));

        let (pattern, state, digits) = filter_params(&CustomerFilter::new(Some("Maria"), Some(" ")));
        assert_eq!(pattern.as_deref(), Some("%Maria%"));
        assert_eq!(state, None);
        assert_eq!(digits, None);

        assert_eq!(filter_params(&CustomerFilter::default()), (None, None, None));
    }
}

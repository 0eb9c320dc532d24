// src/db/legacy.rs

//! Migração única dos esquemas antigos (colunas em português e sem
//! `document_type`) para a tabela canônica `customers`.
//!
//! Existem duas gerações: a primeira só com TEXT, pessoa física e `whatsapp`; a
//! segunda já com `tipo_documento`, `cnpj`, dois contatos, `cargo` e `observacao`.
//! A tabela antiga é renomeada para `customers_legacy` antes das migrações, e
//! depois as linhas são validadas e copiadas numa transação só. Linhas que não
//! passam na validação ficam na tabela legada para correção manual.

use chrono::NaiveDate;
use sqlx::{FromRow, SqlitePool};

use crate::{
    common::error::AppError,
    db::CustomerRepository,
    models::customer::{CustomerFields, DocumentType},
    validation::validate_customer,
};

const LEGACY_TABLE: &str = "customers_legacy";

// Todas as colunas conhecidas das duas gerações; as ausentes viram NULL no SELECT
const LEGACY_COLUMNS: [&str; 21] = [
    "nome_completo",
    "tipo_documento",
    "cpf",
    "cnpj",
    "contato1",
    "telefone1",
    "contato2",
    "telefone2",
    "cargo",
    "whatsapp",
    "email",
    "data_nascimento",
    "cep",
    "endereco",
    "numero",
    "complemento",
    "bairro",
    "cidade",
    "estado",
    "observacao",
    "data_cadastro",
];

#[derive(Debug, Clone, Default, FromRow)]
struct LegacyCustomer {
    id: i64,
    nome_completo: Option<String>,
    tipo_documento: Option<String>,
    cpf: Option<String>,
    cnpj: Option<String>,
    contato1: Option<String>,
    telefone1: Option<String>,
    contato2: Option<String>,
    telefone2: Option<String>,
    cargo: Option<String>,
    whatsapp: Option<String>,
    email: Option<String>,
    data_nascimento: Option<String>,
    cep: Option<String>,
    endereco: Option<String>,
    numero: Option<String>,
    complemento: Option<String>,
    bairro: Option<String>,
    cidade: Option<String>,
    estado: Option<String>,
    observacao: Option<String>,
    data_cadastro: Option<String>,
}

impl LegacyCustomer {
    fn to_fields(&self) -> CustomerFields {
        CustomerFields {
            full_name: self.nome_completo.clone(),
            document_type: self.document_type(),
            cpf: self.cpf.clone(),
            cnpj: self.cnpj.clone(),
            contact1_name: self.contato1.clone(),
            // Na primeira geração o WhatsApp era o único telefone
            phone1: self.telefone1.clone().or_else(|| self.whatsapp.clone()),
            contact2_name: self.contato2.clone(),
            phone2: self.telefone2.clone(),
            role_title: self.cargo.clone(),
            email: self.email.clone(),
            birth_or_founding_date: self.data_nascimento.as_deref().and_then(parse_date),
            postal_code: self.cep.clone(),
            street: self.endereco.clone(),
            number: self.numero.clone(),
            complement: self.complemento.clone(),
            district: self.bairro.clone(),
            city: self.cidade.clone(),
            state: self.estado.clone(),
            notes: self.observacao.clone(),
        }
    }

    // Sem `tipo_documento` todo cliente era pessoa física. Valor desconhecido
    // fica sem tipo e a linha é barrada na validação.
    fn document_type(&self) -> Option<DocumentType> {
        match self.tipo_documento.as_deref().map(str::trim) {
            None | Some("") => Some(DocumentType::Cpf),
            Some(raw) if raw.eq_ignore_ascii_case("CPF") => Some(DocumentType::Cpf),
            Some(raw) if raw.eq_ignore_ascii_case("CNPJ") => Some(DocumentType::Cnpj),
            Some(_) => None,
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}

async fn table_columns(pool: &SqlitePool, table: &str) -> Result<Vec<String>, AppError> {
    let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info(?)")
        .bind(table)
        .fetch_all(pool)
        .await?;
    Ok(columns)
}

pub async fn legacy_table_exists(pool: &SqlitePool) -> Result<bool, AppError> {
    Ok(!table_columns(pool, LEGACY_TABLE).await?.is_empty())
}

/// Se `customers` ainda está no formato antigo, renomeia para `customers_legacy`.
/// Retorna `true` quando houve renomeação.
pub async fn detach_legacy_table(pool: &SqlitePool) -> Result<bool, AppError> {
    let columns = table_columns(pool, "customers").await?;
    if columns.is_empty() || columns.iter().any(|c| c == "document_type") {
        return Ok(false);
    }

    if legacy_table_exists(pool).await? {
        return Err(anyhow::anyhow!(
            "tabela 'customers' está no formato antigo mas '{}' já existe",
            LEGACY_TABLE
        )
        .into());
    }

    sqlx::query(&format!("ALTER TABLE customers RENAME TO {}", LEGACY_TABLE))
        .execute(pool)
        .await?;
    tracing::info!("Tabela 'customers' antiga encontrada e renomeada para '{}'.", LEGACY_TABLE);
    Ok(true)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacyImport {
    pub imported: u64,
    pub rejected: u64,
}

/// Copia as linhas válidas de `customers_legacy` para `customers` numa transação.
/// A tabela legada é removida quando fica vazia.
pub async fn import_legacy_rows(pool: &SqlitePool) -> Result<LegacyImport, AppError> {
    let present = table_columns(pool, LEGACY_TABLE).await?;
    if present.is_empty() {
        return Ok(LegacyImport::default());
    }

    // Colunas que não existem na versão antiga viram NULL
    let select_list: Vec<String> = LEGACY_COLUMNS
        .iter()
        .map(|col| {
            if present.iter().any(|p| p == col) {
                format!("CAST({col} AS TEXT) AS {col}")
            } else {
                format!("NULL AS {col}")
            }
        })
        .collect();
    let sql = format!("SELECT id, {} FROM {} ORDER BY id", select_list.join(", "), LEGACY_TABLE);

    let repo = CustomerRepository::new();
    let mut tx = pool.begin().await?;
    let rows = sqlx::query_as::<_, LegacyCustomer>(&sql)
        .fetch_all(&mut *tx)
        .await?;

    let mut outcome = LegacyImport::default();
    for row in &rows {
        let customer = match validate_customer(&row.to_fields()) {
            Ok(customer) => customer,
            Err(report) => {
                tracing::warn!("Linha legada {} mantida em {}: {}", row.id, LEGACY_TABLE, report);
                outcome.rejected += 1;
                continue;
            }
        };

        let registered_at = row
            .data_cadastro
            .as_deref()
            .and_then(parse_date)
            .unwrap_or_else(|| chrono::Local::now().date_naive());

        match repo.insert_with_identity(&mut *tx, row.id, registered_at, &customer).await {
            Ok(()) => {}
            Err(AppError::DuplicateDocument { document_type, value }) => {
                tracing::warn!("Linha legada {} mantida: {} '{}' repetido", row.id, document_type, value);
                outcome.rejected += 1;
                continue;
            }
            Err(e) => return Err(e),
        }

        sqlx::query(&format!("DELETE FROM {} WHERE id = ?", LEGACY_TABLE))
            .bind(row.id)
            .execute(&mut *tx)
            .await?;
        outcome.imported += 1;
    }

    if outcome.rejected == 0 {
        sqlx::query(&format!("DROP TABLE {}", LEGACY_TABLE))
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    tracing::info!(
        "Importação legada concluída: {} importados, {} pendentes.",
        outcome.imported,
        outcome.rejected
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_legacy_date_formats() {
        assert_eq!(parse_date("1990-05-20"), NaiveDate::from_ymd_opt(1990, 5, 20));
        assert_eq!(parse_date("20/05/1990"), NaiveDate::from_ymd_opt(1990, 5, 20));
        assert_eq!(parse_date("ontem"), None);
    }

    #[test]
    fn first_generation_rows_are_people_with_whatsapp() {
        let row = LegacyCustomer {
            id: 1,
            nome_completo: Some("João".into()),
            cpf: Some("111.444.777-35".into()),
            whatsapp: Some("11987654321".into()),
            data_nascimento: Some("2000-01-31".into()),
            estado: Some("SP".into()),
            ..Default::default()
        };
        let fields = row.to_fields();
        assert_eq!(fields.document_type, Some(DocumentType::Cpf));
        assert_eq!(fields.phone1.as_deref(), Some("11987654321"));
        assert_eq!(fields.birth_or_founding_date, NaiveDate::from_ymd_opt(2000, 1, 31));
    }

    #[test]
    fn typed_rows_keep_every_column() {
        let row = LegacyCustomer {
            id: 2,
            nome_completo: Some("Padaria Central".into()),
            tipo_documento: Some("cnpj".into()),
            cnpj: Some("11222333000181".into()),
            contato1: Some("Rita".into()),
            telefone1: Some("1133334444".into()),
            contato2: Some("Caio".into()),
            telefone2: Some("11987654321".into()),
            cargo: Some("Gerente".into()),
            whatsapp: Some("11999998888".into()),
            observacao: Some("Entrega às terças".into()),
            ..Default::default()
        };
        let fields = row.to_fields();
        assert_eq!(fields.document_type, Some(DocumentType::Cnpj));
        assert_eq!(fields.cnpj.as_deref(), Some("11222333000181"));
        assert_eq!(fields.contact1_name.as_deref(), Some("Rita"));
        assert_eq!(fields.phone1.as_deref(), Some("1133334444"));
        assert_eq!(fields.contact2_name.as_deref(), Some("Caio"));
        assert_eq!(fields.phone2.as_deref(), Some("11987654321"));
        assert_eq!(fields.role_title.as_deref(), Some("Gerente"));
        assert_eq!(fields.notes.as_deref(), Some("Entrega às terças"));
    }

    #[test]
    fn unknown_document_type_is_left_blank() {
        let row = LegacyCustomer {
            tipo_documento: Some("RG".into()),
            ..Default::default()
        };
        assert_eq!(row.to_fields().document_type, None);
    }
}

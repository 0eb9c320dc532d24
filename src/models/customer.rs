// src/models/customer.rs

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

// --- ENUMS ---

// Guardado como TEXT ('CPF' / 'CNPJ') na tabela customers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentType {
    Cpf,
    Cnpj,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Cpf => "CPF",
            DocumentType::Cnpj => "CNPJ",
        }
    }

    /// Nome da coluna que guarda este tipo de documento.
    pub fn column(&self) -> &'static str {
        match self {
            DocumentType::Cpf => "cpf",
            DocumentType::Cnpj => "cnpj",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- CLIENTE ---

/// Todos os campos mutáveis de um cliente.
///
/// Tudo é opcional no nível de tipo para que a entrada crua possa ser
/// representada (e os erros reportados campo a campo); a obrigatoriedade é
/// checada por `validation::validate_customer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFields {
    #[schema(example = "Maria da Silva")]
    pub full_name: Option<String>,
    pub document_type: Option<DocumentType>,
    #[schema(example = "111.444.777-35")]
    pub cpf: Option<String>,
    #[schema(example = "11.222.333/0001-81")]
    pub cnpj: Option<String>,

    pub contact1_name: Option<String>,
    #[schema(example = "(11) 98765-4321")]
    pub phone1: Option<String>,
    pub contact2_name: Option<String>,
    pub phone2: Option<String>,
    pub role_title: Option<String>,
    #[schema(example = "maria@email.com")]
    pub email: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "1990-05-20")]
    pub birth_or_founding_date: Option<NaiveDate>,

    #[schema(example = "01310-100")]
    pub postal_code: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    #[schema(example = "SP")]
    pub state: Option<String>,
    pub notes: Option<String>,
}

impl CustomerFields {
    /// Apara os textos e transforma strings vazias em `None`.
    pub fn normalized(&self) -> Self {
        Self {
            full_name: tidy(&self.full_name),
            document_type: self.document_type,
            cpf: tidy(&self.cpf),
            cnpj: tidy(&self.cnpj),
            contact1_name: tidy(&self.contact1_name),
            phone1: tidy(&self.phone1),
            contact2_name: tidy(&self.contact2_name),
            phone2: tidy(&self.phone2),
            role_title: tidy(&self.role_title),
            email: tidy(&self.email),
            birth_or_founding_date: self.birth_or_founding_date,
            postal_code: tidy(&self.postal_code),
            street: tidy(&self.street),
            number: tidy(&self.number),
            complement: tidy(&self.complement),
            district: tidy(&self.district),
            city: tidy(&self.city),
            state: tidy(&self.state),
            notes: tidy(&self.notes),
        }
    }

    /// Visão "tudo como texto" usada na comparação com o baseline:
    /// `None` e string vazia se equivalem, espaços nas pontas são ignorados.
    pub fn text_view(&self) -> [(&'static str, String); 19] {
        let text = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or_default().to_string();
        [
            ("fullName", text(&self.full_name)),
            ("documentType", self.document_type.map(|d| d.as_str()).unwrap_or_default().to_string()),
            ("cpf", text(&self.cpf)),
            ("cnpj", text(&self.cnpj)),
            ("contact1Name", text(&self.contact1_name)),
            ("phone1", text(&self.phone1)),
            ("contact2Name", text(&self.contact2_name)),
            ("phone2", text(&self.phone2)),
            ("roleTitle", text(&self.role_title)),
            ("email", text(&self.email)),
            (
                "birthOrFoundingDate",
                self.birth_or_founding_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
            ("postalCode", text(&self.postal_code)),
            ("street", text(&self.street)),
            ("number", text(&self.number)),
            ("complement", text(&self.complement)),
            ("district", text(&self.district)),
            ("city", text(&self.city)),
            ("state", text(&self.state)),
            ("notes", text(&self.notes)),
        ]
    }
}

fn tidy(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Uma linha da tabela customers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    pub id: i64,

    #[sqlx(flatten)]
    #[serde(flatten)]
    pub fields: CustomerFields,

    // Definido uma única vez, na criação
    #[schema(value_type = String, format = Date)]
    pub registered_at: NaiveDate,
}

/// Linha vinda da superfície de edição: o registro completo mais a marca de exclusão.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditedRow {
    #[serde(flatten)]
    pub record: CustomerRecord,

    #[serde(default)]
    pub delete: bool,
}

impl From<CustomerRecord> for EditedRow {
    fn from(record: CustomerRecord) -> Self {
        Self { record, delete: false }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReconcileSummary {
    pub updated: u64,
    pub deleted: u64,
}

// --- CONSULTA ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CustomerFilter {
    /// Trecho procurado no nome, CPF ou CNPJ.
    pub search: Option<String>,
    /// UF exata.
    pub state: Option<String>,
}

impl CustomerFilter {
    pub fn new(search: Option<&str>, state: Option<&str>) -> Self {
        Self {
            search: search.map(str::to_string),
            state: state.map(str::to_string),
        }
    }
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CustomerQuery {
    pub search: Option<String>,
    #[param(example = "SP")]
    pub state: Option<String>,

    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "invalid_page"))]
    pub page: i64,

    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 500, message = "invalid_page_size"))]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    50
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CustomerPage {
    pub rows: Vec<CustomerRecord>,
    /// Total de registros que atendem ao filtro, ignorando a paginação.
    pub total: i64,
}

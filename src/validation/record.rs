// src/validation/record.rs

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

use super::{
    validate_cnpj, validate_cpf, validate_email, validate_phone, validate_postal_code,
    validate_state, ValidationError,
};
use crate::models::customer::{CustomerFields, DocumentType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViolationKind {
    #[error("campo obrigatório")]
    Required,

    #[error("deve ficar vazio quando o documento é {0}")]
    NotAllowed(DocumentType),

    #[error("campo imutável")]
    Immutable,

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl ViolationKind {
    /// Código estável para o frontend.
    pub fn code(&self) -> &'static str {
        match self {
            ViolationKind::Required => "required",
            ViolationKind::NotAllowed(_) => "not_allowed",
            ViolationKind::Immutable => "immutable",
            ViolationKind::Invalid(ValidationError::InvalidDocument { .. }) => "invalid_document",
            ViolationKind::Invalid(ValidationError::InvalidPhone(_)) => "invalid_phone",
            ViolationKind::Invalid(ValidationError::InvalidEmail(_)) => "invalid_email",
            ViolationKind::Invalid(ValidationError::InvalidPostalCode(_)) => "invalid_postal_code",
            ViolationKind::Invalid(ValidationError::InvalidState(_)) => "invalid_state",
        }
    }
}

/// Uma falha endereçada: qual linha (quando há) e qual campo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_id: Option<i64>,
    pub field: &'static str,
    #[serde(rename = "code", serialize_with = "serialize_code")]
    pub kind: ViolationKind,
    pub message: String,
}

fn serialize_code<S: Serializer>(kind: &ViolationKind, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(kind.code())
}

impl Violation {
    pub fn new(field: &'static str, kind: ViolationKind) -> Self {
        Self {
            row_id: None,
            field,
            message: kind.to_string(),
            kind,
        }
    }

    pub fn for_row(row_id: i64, field: &'static str, kind: ViolationKind) -> Self {
        Self { row_id: Some(row_id), ..Self::new(field, kind) }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = self.row_id {
            write!(f, "linha {}, ", id)?;
        }
        write!(f, "campo '{}': {}", self.field, self.message)
    }
}

/// Todas as falhas de validação de uma operação (uma linha ou um lote).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport(Vec<Violation>);

impl ValidationReport {
    pub fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }

    pub fn extend(&mut self, other: ValidationReport) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    /// Carimba o id da linha em todas as falhas.
    pub fn for_row(mut self, row_id: i64) -> Self {
        for violation in &mut self.0 {
            violation.row_id = Some(row_id);
        }
        self
    }

    pub fn contains(&self, row_id: Option<i64>, field: &str) -> bool {
        self.0.iter().any(|v| v.row_id == row_id && v.field == field)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

/// Cliente que passou por todas as regras: textos aparados, documentos e
/// contatos canonizados, tipo de documento garantido.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCustomer {
    document_type: DocumentType,
    fields: CustomerFields,
}

impl ValidatedCustomer {
    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn fields(&self) -> &CustomerFields {
        &self.fields
    }

    pub fn into_fields(self) -> CustomerFields {
        self.fields
    }

    /// Valor canônico do documento do tipo pedido, se preenchido.
    pub fn document(&self, kind: DocumentType) -> Option<&str> {
        match kind {
            DocumentType::Cpf => self.fields.cpf.as_deref(),
            DocumentType::Cnpj => self.fields.cnpj.as_deref(),
        }
    }
}

/// Valida um cliente inteiro, acumulando todas as falhas em vez de parar na primeira.
pub fn validate_customer(fields: &CustomerFields) -> Result<ValidatedCustomer, ValidationReport> {
    let mut report = ValidationReport::default();
    let mut out = fields.normalized();

    if out.full_name.is_none() {
        report.push(Violation::new("fullName", ViolationKind::Required));
    }

    match out.document_type {
        None => report.push(Violation::new("documentType", ViolationKind::Required)),
        Some(DocumentType::Cpf) => {
            require(&out.cpf, "cpf", &mut report);
            canonicalize(&mut out.cpf, "cpf", validate_cpf, &mut report);
            forbid(&out.cnpj, "cnpj", DocumentType::Cpf, &mut report);
        }
        Some(DocumentType::Cnpj) => {
            require(&out.cnpj, "cnpj", &mut report);
            canonicalize(&mut out.cnpj, "cnpj", validate_cnpj, &mut report);
            forbid(&out.cpf, "cpf", DocumentType::Cnpj, &mut report);
        }
    }

    canonicalize(&mut out.phone1, "phone1", validate_phone, &mut report);
    canonicalize(&mut out.phone2, "phone2", validate_phone, &mut report);
    canonicalize(&mut out.email, "email", validate_email, &mut report);
    canonicalize(&mut out.postal_code, "postalCode", validate_postal_code, &mut report);
    canonicalize(&mut out.state, "state", validate_state, &mut report);

    match out.document_type {
        Some(document_type) if report.is_empty() => Ok(ValidatedCustomer { document_type, fields: out }),
        _ => Err(report),
    }
}

fn require(value: &Option<String>, field: &'static str, report: &mut ValidationReport) {
    if value.is_none() {
        report.push(Violation::new(field, ViolationKind::Required));
    }
}

fn forbid(value: &Option<String>, field: &'static str, document_type: DocumentType, report: &mut ValidationReport) {
    if value.is_some() {
        report.push(Violation::new(field, ViolationKind::NotAllowed(document_type)));
    }
}

// Substitui o valor pela forma canônica, ou registra a falha
fn canonicalize<T: Into<String>>(
    slot: &mut Option<String>,
    field: &'static str,
    validate: fn(&str) -> Result<T, ValidationError>,
    report: &mut ValidationReport,
) {
    if let Some(raw) = slot.as_deref() {
        match validate(raw) {
            Ok(canonical) => *slot = Some(canonical.into()),
            Err(e) => report.push(Violation::new(field, e.into())),
        }
    }
}

// src/services/lookup.rs

//! Colaboradores externos de consulta (CEP e CNPJ).
//!
//! O núcleo só define o contrato e sabe aplicar o resultado num formulário;
//! a implementação de rede fica fora do crate. Estas funções nunca tocam no
//! banco, então nunca rodam com uma transação aberta.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    models::customer::{CustomerFields, DocumentType},
    validation::{validate_cnpj, validate_postal_code, Cnpj, PostalCode, ValidationError},
};

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Chave de consulta inválida: {0}")]
    InvalidKey(#[from] ValidationError),

    #[error("Serviço de consulta indisponível: {0}")]
    Unavailable(String),

    #[error("Consulta excedeu {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl Address {
    /// Sobrescreve os campos de endereço do formulário com o que foi encontrado.
    pub fn apply_to(&self, fields: &mut CustomerFields) {
        fields.street = self.street.clone();
        fields.district = self.district.clone();
        fields.city = self.city.clone();
        fields.state = self.state.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub legal_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub founding_date: Option<chrono::NaiveDate>,
    pub postal_code: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl CompanyProfile {
    /// Preenche só o que ainda está em branco no formulário.
    pub fn apply_to(&self, fields: &mut CustomerFields) {
        fill(&mut fields.full_name, &self.legal_name);
        fill(&mut fields.email, &self.email);
        fill(&mut fields.phone1, &self.phone);
        fill(&mut fields.postal_code, &self.postal_code);
        fill(&mut fields.street, &self.street);
        fill(&mut fields.number, &self.number);
        fill(&mut fields.complement, &self.complement);
        fill(&mut fields.district, &self.district);
        fill(&mut fields.city, &self.city);
        fill(&mut fields.state, &self.state);
        if fields.birth_or_founding_date.is_none() {
            fields.birth_or_founding_date = self.founding_date;
        }
    }
}

fn fill(slot: &mut Option<String>, value: &Option<String>) {
    let blank = slot.as_deref().is_none_or(|s| s.trim().is_empty());
    if blank && value.is_some() {
        *slot = value.clone();
    }
}

/// Consulta de endereço por CEP (ex.: ViaCEP).
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn find_address(&self, postal_code: &PostalCode) -> Result<Option<Address>, LookupError>;
}

/// Consulta de dados cadastrais de empresa por CNPJ.
#[async_trait]
pub trait CompanyLookup: Send + Sync {
    async fn find_company(&self, cnpj: &Cnpj) -> Result<Option<CompanyProfile>, LookupError>;
}

/// Valida o CEP do formulário, consulta o colaborador e aplica o endereço.
/// Retorna `false` quando o CEP não existe (o usuário preenche à mão).
pub async fn prefill_address(
    lookup: &dyn AddressLookup,
    fields: &mut CustomerFields,
    timeout: Duration,
) -> Result<bool, LookupError> {
    let postal_code = validate_postal_code(fields.postal_code.as_deref().unwrap_or_default())?;

    let found = tokio::time::timeout(timeout, lookup.find_address(&postal_code))
        .await
        .map_err(|_| LookupError::TimedOut(timeout))??;

    fields.postal_code = Some(postal_code.into());
    match found {
        Some(address) => {
            address.apply_to(fields);
            Ok(true)
        }
        None => {
            tracing::info!("CEP não encontrado, endereço deve ser preenchido manualmente.");
            Ok(false)
        }
    }
}

/// Valida o CNPJ do formulário, consulta o colaborador e completa os campos vazios.
pub async fn prefill_company(
    lookup: &dyn CompanyLookup,
    fields: &mut CustomerFields,
    timeout: Duration,
) -> Result<bool, LookupError> {
    let cnpj = validate_cnpj(fields.cnpj.as_deref().unwrap_or_default())?;

    let found = tokio::time::timeout(timeout, lookup.find_company(&cnpj))
        .await
        .map_err(|_| LookupError::TimedOut(timeout))??;

    fields.document_type = Some(DocumentType::Cnpj);
    fields.cnpj = Some(cnpj.into());
    match found {
        Some(profile) => {
            profile.apply_to(fields);
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedAddress {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AddressLookup for FixedAddress {
        async fn find_address(&self, postal_code: &PostalCode) -> Result<Option<Address>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if postal_code.as_str() != "01310-100" {
                return Ok(None);
            }
            Ok(Some(Address {
                street: Some("Avenida Paulista".into()),
                district: Some("Bela Vista".into()),
                city: Some("São Paulo".into()),
                state: Some("SP".into()),
            }))
        }
    }

    struct SlowCompany;

    #[async_trait]
    impl CompanyLookup for SlowCompany {
        async fn find_company(&self, _cnpj: &Cnpj) -> Result<Option<CompanyProfile>, LookupError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }
    }

    struct KnownCompany;

    #[async_trait]
    impl CompanyLookup for KnownCompany {
        async fn find_company(&self, _cnpj: &Cnpj) -> Result<Option<CompanyProfile>, LookupError> {
            Ok(Some(CompanyProfile {
                legal_name: Some("Padaria Central LTDA".into()),
                email: Some("contato@padaria.com.br".into()),
                city: Some("Curitiba".into()),
                ..Default::default()
            }))
        }
    }

    #[tokio::test]
    async fn fills_address_from_postal_code() {
        let lookup = FixedAddress { calls: AtomicUsize::new(0) };
        let mut fields = CustomerFields {
            postal_code: Some("01310100".into()),
            street: Some("rua antiga".into()),
            ..Default::default()
        };

        let found = prefill_address(&lookup, &mut fields, Duration::from_secs(1)).await.unwrap();
        assert!(found);
        assert_eq!(fields.postal_code.as_deref(), Some("01310-100"));
        assert_eq!(fields.street.as_deref(), Some("Avenida Paulista"));
        assert_eq!(fields.state.as_deref(), Some("SP"));
    }

    #[tokio::test]
    async fn invalid_postal_code_never_reaches_collaborator() {
        let lookup = FixedAddress { calls: AtomicUsize::new(0) };
        let mut fields = CustomerFields { postal_code: Some("123".into()), ..Default::default() };

        let err = prefill_address(&lookup, &mut fields, Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, LookupError::InvalidKey(ValidationError::InvalidPostalCode(_))));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_postal_code_keeps_manual_address() {
        let lookup = FixedAddress { calls: AtomicUsize::new(0) };
        let mut fields = CustomerFields {
            postal_code: Some("80010-000".into()),
            city: Some("Curitiba".into()),
            ..Default::default()
        };

        assert!(!prefill_address(&lookup, &mut fields, Duration::from_secs(1)).await.unwrap());
        assert_eq!(fields.city.as_deref(), Some("Curitiba"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_company_lookup_times_out() {
        let mut fields = CustomerFields { cnpj: Some("11.222.333/0001-81".into()), ..Default::default() };

        let err = prefill_company(&SlowCompany, &mut fields, Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, LookupError::TimedOut(_)));
    }

    #[tokio::test]
    async fn company_profile_fills_only_blank_fields() {
        let mut fields = CustomerFields {
            cnpj: Some("11222333000181".into()),
            email: Some("financeiro@padaria.com.br".into()),
            ..Default::default()
        };

        assert!(prefill_company(&KnownCompany, &mut fields, Duration::from_secs(1)).await.unwrap());
        assert_eq!(fields.document_type, Some(DocumentType::Cnpj));
        assert_eq!(fields.cnpj.as_deref(), Some("11.222.333/0001-81"));
        assert_eq!(fields.full_name.as_deref(), Some("Padaria Central LTDA"));
        assert_eq!(fields.email.as_deref(), Some("financeiro@padaria.com.br"));
        assert_eq!(fields.city.as_deref(), Some("Curitiba"));
    }
}

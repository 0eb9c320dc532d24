// src/validation.rs

//! Motor de validação dos identificadores nacionais (CPF/CNPJ) e dos campos
//! auxiliares de contato e endereço.
//!
//! Todas as funções são puras e totais: entrada malformada nunca causa panic,
//! sempre vira um `ValidationError`, para que o chamador consiga validar um lote
//! inteiro e reportar todas as falhas de uma vez.

use thiserror::Error;

use crate::models::customer::DocumentType;

pub mod address;
pub mod contact;
pub mod document;
pub mod record;

pub use address::{validate_postal_code, validate_state, PostalCode, StateCode};
pub use contact::{validate_email, validate_phone, Email, Phone};
pub use document::{validate_cnpj, validate_cpf, Cnpj, Cpf};
pub use record::{validate_customer, ValidatedCustomer, ValidationReport, Violation, ViolationKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{kind} inválido: {reason}")]
    InvalidDocument {
        kind: DocumentType,
        reason: &'static str,
    },

    #[error("Telefone inválido: {0}")]
    InvalidPhone(&'static str),

    #[error("E-mail inválido: {0}")]
    InvalidEmail(&'static str),

    #[error("CEP inválido: {0}")]
    InvalidPostalCode(&'static str),

    #[error("UF inválida: {0}")]
    InvalidState(&'static str),
}

// Gera o newtype de um valor já canonizado. Só o próprio módulo de validação
// consegue construir um, então ter o tipo em mãos é prova de validade.
macro_rules! canonical_value {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Apenas os dígitos (ou o texto cru, para valores sem dígitos).
            pub fn digits(&self) -> String {
                self.0.chars().filter(char::is_ascii_digit).collect()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

pub(crate) use canonical_value;

/// Remove tudo que não for dígito ASCII.
pub(crate) fn digits_only(input: &str) -> Vec<u8> {
    input
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| d as u8)
        .collect()
}

pub(crate) fn join_digits(digits: &[u8]) -> String {
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

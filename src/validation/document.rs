// src/validation/document.rs

use super::{canonical_value, digits_only, join_digits, ValidationError};
use crate::models::customer::DocumentType;

const CPF_LEN: usize = 11;
const CNPJ_LEN: usize = 14;

// Pesos do primeiro dígito do CNPJ; o segundo usa a mesma sequência com um 6 na frente.
const CNPJ_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

canonical_value!(
    /// CPF válido no formato `XXX.XXX.XXX-XX`.
    Cpf
);

canonical_value!(
    /// CNPJ válido no formato `XX.XXX.XXX/XXXX-XX`.
    Cnpj
);

/// Valida e canoniza um CPF.
pub fn validate_cpf(input: &str) -> Result<Cpf, ValidationError> {
    let digits = checked_digits(input, CPF_LEN, DocumentType::Cpf)?;

    let first = check_digit(&digits[..9], (2..=10).rev());
    let second = check_digit(&digits[..10], (2..=11).rev());
    if digits[9] != first || digits[10] != second {
        return Err(invalid(DocumentType::Cpf, "dígitos verificadores não conferem"));
    }

    let d = join_digits(&digits);
    Ok(Cpf(format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])))
}

/// Valida e canoniza um CNPJ.
pub fn validate_cnpj(input: &str) -> Result<Cnpj, ValidationError> {
    let digits = checked_digits(input, CNPJ_LEN, DocumentType::Cnpj)?;

    let first = check_digit(&digits[..12], CNPJ_WEIGHTS[1..].iter().copied());
    let second = check_digit(&digits[..13], CNPJ_WEIGHTS.iter().copied());
    if digits[12] != first || digits[13] != second {
        return Err(invalid(DocumentType::Cnpj, "dígitos verificadores não conferem"));
    }

    let d = join_digits(&digits);
    Ok(Cnpj(format!(
        "{}.{}.{}/{}-{}",
        &d[0..2],
        &d[2..5],
        &d[5..8],
        &d[8..12],
        &d[12..14]
    )))
}

fn checked_digits(input: &str, len: usize, kind: DocumentType) -> Result<Vec<u8>, ValidationError> {
    let digits = digits_only(input);
    if digits.len() != len {
        let reason = match kind {
            DocumentType::Cpf => "deve conter 11 dígitos",
            DocumentType::Cnpj => "deve conter 14 dígitos",
        };
        return Err(invalid(kind, reason));
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return Err(invalid(kind, "sequência de dígitos repetidos"));
    }
    Ok(digits)
}

// Módulo 11: resto < 2 vira 0, senão 11 - resto.
fn check_digit(digits: &[u8], weights: impl Iterator<Item = u32>) -> u8 {
    let sum: u32 = digits
        .iter()
        .zip(weights)
        .map(|(digit, weight)| u32::from(*digit) * weight)
        .sum();
    match sum % 11 {
        rem if rem < 2 => 0,
        rem => (11 - rem) as u8,
    }
}

fn invalid(kind: DocumentType, reason: &'static str) -> ValidationError {
    ValidationError::InvalidDocument { kind, reason }
}

// src/validation/contact.rs

use validator::ValidateEmail;

use super::{canonical_value, digits_only, join_digits, ValidationError};

canonical_value!(
    /// Telefone nacional no formato `(XX) XXXXX-XXXX` (celular) ou `(XX) XXXX-XXXX` (fixo).
    Phone
);

canonical_value!(
    /// E-mail aparado, com o domínio em minúsculas.
    Email
);

/// Valida um telefone com DDD. Celulares (11 dígitos) precisam começar com 9.
pub fn validate_phone(input: &str) -> Result<Phone, ValidationError> {
    let digits = digits_only(input);
    if digits.len() != 10 && digits.len() != 11 {
        return Err(ValidationError::InvalidPhone("deve conter DDD mais 8 ou 9 dígitos"));
    }
    if digits[0] == 0 {
        return Err(ValidationError::InvalidPhone("DDD não pode começar com 0"));
    }
    if digits.len() == 11 && digits[2] != 9 {
        return Err(ValidationError::InvalidPhone("celular deve começar com 9 após o DDD"));
    }

    let d = join_digits(&digits);
    let split = d.len() - 4;
    Ok(Phone(format!("({}) {}-{}", &d[..2], &d[2..split], &d[split..])))
}

pub fn validate_email(input: &str) -> Result<Email, ValidationError> {
    let trimmed = input.trim();
    if trimmed.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail("não pode conter espaços"));
    }

    let mut parts = trimmed.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ValidationError::InvalidEmail("deve conter exatamente um @"));
    };
    if local.is_empty() || domain.is_empty() {
        return Err(ValidationError::InvalidEmail("usuário e domínio são obrigatórios"));
    }
    if !domain.contains('.') {
        return Err(ValidationError::InvalidEmail("domínio deve conter um ponto"));
    }
    if !trimmed.validate_email() {
        return Err(ValidationError::InvalidEmail("formato inválido"));
    }

    Ok(Email(format!("{}@{}", local, domain.to_ascii_lowercase())))
}

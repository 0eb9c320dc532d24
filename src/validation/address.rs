// src/validation/address.rs

use super::{canonical_value, digits_only, join_digits, ValidationError};

const UFS: [&str; 27] = [
    "AC", "AL", "AM", "AP", "BA", "CE", "DF", "ES", "GO", "MA", "MG", "MS", "MT", "PA",
    "PB", "PE", "PI", "PR", "RJ", "RN", "RO", "RR", "RS", "SC", "SE", "SP", "TO",
];

canonical_value!(
    /// CEP no formato `XXXXX-XXX`.
    PostalCode
);

canonical_value!(
    /// Sigla de UF em maiúsculas.
    StateCode
);

pub fn validate_postal_code(input: &str) -> Result<PostalCode, ValidationError> {
    let digits = digits_only(input);
    if digits.len() != 8 {
        return Err(ValidationError::InvalidPostalCode("deve conter 8 dígitos"));
    }
    let d = join_digits(&digits);
    Ok(PostalCode(format!("{}-{}", &d[..5], &d[5..])))
}

pub fn validate_state(input: &str) -> Result<StateCode, ValidationError> {
    let code = input.trim().to_ascii_uppercase();
    if code.len() != 2 {
        return Err(ValidationError::InvalidState("deve ter 2 letras"));
    }
    if !UFS.contains(&code.as_str()) {
        return Err(ValidationError::InvalidState("sigla desconhecida"));
    }
    Ok(StateCode(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postal_code_is_hyphenated() {
        assert_eq!(validate_postal_code("01310100").unwrap().as_str(), "01310-100");
        assert_eq!(validate_postal_code("01310-100").unwrap().digits(), "01310100");
        assert!(validate_postal_code("0131010").is_err());
    }

    #[test]
    fn canonical_values_display_their_text() {
        let cep = validate_postal_code("01310100").unwrap();
        assert_eq!(cep.to_string(), "01310-100");
        assert_eq!(format!("{} / {}", cep, validate_state("pr").unwrap()), "01310-100 / PR");
        assert_eq!(String::from(cep), "01310-100");
    }

    #[test]
    fn state_is_uppercased_and_checked() {
        assert_eq!(validate_state(" sp ").unwrap().as_str(), "SP");
        assert_eq!(validate_state("XX"), Err(ValidationError::InvalidState("sigla desconhecida")));
        assert_eq!(validate_state("São Paulo"), Err(ValidationError::InvalidState("deve ter 2 letras")));
    }
}

// src/common/validation.rs

use std::collections::HashSet;

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::models::client::normalize_phone;

// As mensagens são chaves do catálogo i18n, traduzidas em `to_api_error`.

// Limites das colunas NUMERIC(12, 2) e NUMERIC(12, 3)
pub const MAX_MONEY: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2); // 9_999_999_999.99
pub const MAX_STOCK_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 3); // 999_999_999.999

const MIN_PHONE_DIGITS: usize = 10;
const MAX_PHONE_DIGITS: usize = 13;

fn out_of_range(message: &'static str, max: Decimal) -> ValidationError {
    let mut err = ValidationError::new("range");
    err.add_param("min".into(), &0.0);
    err.add_param("max".into(), &max.to_string());
    err.message = Some(message.into());
    err
}

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("validation.not_negative".into());
        return Err(err);
    }
    Ok(())
}

/// Preços e valores: não negativos e dentro do que a coluna comporta.
pub fn validate_money(val: &Decimal) -> Result<(), ValidationError> {
    validate_not_negative(val)?;
    if *val > MAX_MONEY {
        return Err(out_of_range("validation.amount_range", MAX_MONEY));
    }
    Ok(())
}

pub fn validate_stock_amount(val: &Decimal) -> Result<(), ValidationError> {
    validate_not_negative(val)?;
    if *val > MAX_STOCK_AMOUNT {
        return Err(out_of_range("validation.amount_range", MAX_STOCK_AMOUNT));
    }
    Ok(())
}

// Ajuste pode ser negativo (consumo)
pub fn validate_stock_delta(val: &Decimal) -> Result<(), ValidationError> {
    if val.abs() > MAX_STOCK_AMOUNT {
        return Err(out_of_range("validation.amount_range", MAX_STOCK_AMOUNT));
    }
    Ok(())
}

/// DDD + número, com ou sem o 55. A pontuação é ignorada.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = normalize_phone(phone).len();
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
        let mut err = ValidationError::new("phone");
        err.message = Some("validation.phone".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_discount(val: &Decimal) -> Result<(), ValidationError> {
    if *val < Decimal::ZERO || *val > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("range");
        err.message = Some("validation.discount_range".into());
        return Err(err);
    }
    Ok(())
}

/// Nomes repetidos (sem diferenciar maiúsculas) deixam a escolha do cliente ambígua.
pub fn validate_unique_names<'a, I>(names: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.trim().to_lowercase()) {
            let mut err = ValidationError::new("unique");
            err.message = Some("validation.unique_names".into());
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn rejects_negative_values_but_accepts_zero() {
        assert!(validate_not_negative(&d("-0.01")).is_err());
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
        assert!(validate_not_negative(&d("12.50")).is_ok());
    }

    #[test]
    fn money_is_bounded_by_the_column_size() {
        assert_eq!(MAX_MONEY, d("9999999999.99"));
        assert!(validate_money(&d("9999999999.99")).is_ok());
        assert!(validate_money(&d("10000000000")).is_err());
        assert!(validate_money(&d("10000000000000000000000000000")).is_err());
        assert!(validate_money(&d("-1")).is_err());
    }

    #[test]
    fn stock_amounts_accept_three_decimals_up_to_the_limit() {
        assert_eq!(MAX_STOCK_AMOUNT, d("999999999.999"));
        assert!(validate_stock_amount(&d("2.125")).is_ok());
        assert!(validate_stock_amount(&d("1000000000")).is_err());
        assert!(validate_stock_delta(&d("-2.5")).is_ok());
        assert!(validate_stock_delta(&d("-1000000000")).is_err());
    }

    #[test]
    fn phone_needs_enough_digits() {
        assert!(validate_phone("(11) 97777-6666").is_ok());
        assert!(validate_phone("+55 11 97777-6666").is_ok());
        assert!(validate_phone("--------").is_err());
        assert!(validate_phone("9777-6666").is_err());
    }

    #[test]
    fn discount_must_be_a_percentage() {
        assert!(validate_discount(&d("0")).is_ok());
        assert!(validate_discount(&d("100")).is_ok());
        assert!(validate_discount(&d("100.01")).is_err());
        assert!(validate_discount(&d("-5")).is_err());
    }

    #[test]
    fn duplicate_names_ignore_case_and_spaces() {
        assert!(validate_unique_names(["P", "M", "G"]).is_ok());
        assert!(validate_unique_names(["Morango", " morango "]).is_err());
    }
}

//! Validation utilities for ledger requests

use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

/// Largest price or amount a single request may carry
pub const MAX_MONEY: i64 = 1_000_000_000;

/// Money is kept to cents in every store
pub const MONEY_SCALE: u32 = 2;

fn money_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Prices and amounts: non-negative, bounded, at most two decimal places
pub fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(money_error("non_negative", "Value cannot be negative"));
    }
    if *value > Decimal::from(MAX_MONEY) {
        return Err(money_error("max_money", "Value cannot exceed 1000000000"));
    }
    if value.normalize().scale() > MONEY_SCALE {
        return Err(money_error("money_scale", "Value cannot have more than 2 decimal places"));
    }
    Ok(())
}

/// First failing field and its message, in field-name order
pub fn first_violation(errors: &ValidationErrors) -> Option<(String, String)> {
    let fields = errors.field_errors();
    let mut names: Vec<_> = fields.keys().collect();
    names.sort();

    names.into_iter().find_map(|name| {
        fields.get(name).and_then(|errs| errs.first()).map(|err| {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value for {}", name));
            (name.to_string(), message)
        })
    })
}

use super::errors::DomainError;

/// Width of the short text columns: phone numbers, statuses, roles.
pub const SHORT_TEXT_MAX: usize = 50;

pub(crate) fn required(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, "is required"));
    }
    Ok(())
}

pub(crate) fn at_most(field: &'static str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.chars().count() > max {
        return Err(DomainError::validation(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

pub(crate) fn phone(field: &'static str, value: &str) -> Result<(), DomainError> {
    required(field, value)?;
    at_most(field, value, SHORT_TEXT_MAX)
}

pub(crate) fn email(field: &'static str, value: &str) -> Result<(), DomainError> {
    required(field, value)?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(DomainError::validation(field, "is not an email address")),
    }
}

pub(crate) fn price(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::validation(field, "must be greater than 0"));
    }
    Ok(())
}

pub(crate) fn stock(value: i32) -> Result<(), DomainError> {
    if value < 0 {
        return Err(DomainError::validation("stock", "must not be negative"));
    }
    Ok(())
}

/// Stock after putting `quantity` units back on the shelf.
pub(crate) fn restocked(stock: i32, quantity: i32) -> Result<i32, DomainError> {
    stock.checked_add(quantity).ok_or_else(|| {
        DomainError::validation(
            "stock",
            format!("cannot take back {quantity} more units on top of {stock}"),
        )
    })
}

use chrono::NaiveDate;

const MAX_NAME_LENGTH: usize = 100;
const MAX_TEXT_LENGTH: usize = 500;

/// Input rejected before anything is written to the store
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Member name cannot be empty")]
    EmptyName,
    #[error("Member name cannot exceed 100 characters")]
    NameTooLong,
    #[error("Item description cannot be empty")]
    EmptyItem,
    #[error("{0} is too long")]
    TextTooLong(&'static str),
    #[error("Date must be in YYYY-MM-DD format: {0}")]
    InvalidDate(String),
    #[error("Month must be in YYYY-MM format: {0}")]
    InvalidMonth(String),
    #[error("Amount must be a finite number")]
    AmountNotFinite,
    #[error("Amount cannot be negative")]
    NegativeAmount,
    #[error("Deposit amount must be greater than zero")]
    AmountNotPositive,
    #[error("Meal count must be zero or more, in steps of 0.5")]
    InvalidMealCount,
    #[error("PIN must be exactly 4 digits")]
    InvalidPin,
    #[error("A member must be selected")]
    MissingMember,
}

pub fn validate_member_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong);
    }
    Ok(trimmed.to_string())
}

pub fn validate_member_id(member_id: &str) -> Result<(), ValidationError> {
    if member_id.trim().is_empty() {
        return Err(ValidationError::MissingMember);
    }
    Ok(())
}

/// Free text such as a notice or a fine reason
pub fn validate_text(label: &'static str, text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.chars().count() > MAX_TEXT_LENGTH {
        return Err(ValidationError::TextTooLong(label));
    }
    Ok(trimmed.to_string())
}

/// Calendar date, YYYY-MM-DD
pub fn validate_date(date: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = date.trim();
    if trimmed.len() != 10 {
        return Err(ValidationError::InvalidDate(date.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(date.to_string()))
}

/// Accounting month, YYYY-MM
pub fn validate_month(month: &str) -> Result<String, ValidationError> {
    let trimmed = month.trim();
    let valid = trimmed.len() == 7
        && NaiveDate::parse_from_str(&format!("{}-01", trimmed), "%Y-%m-%d").is_ok();
    if !valid {
        return Err(ValidationError::InvalidMonth(month.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Amount that may be zero (bazar items, fixed bills)
pub fn validate_non_negative_amount(amount: f64) -> Result<f64, ValidationError> {
    if !amount.is_finite() {
        return Err(ValidationError::AmountNotFinite);
    }
    if amount < 0.0 {
        return Err(ValidationError::NegativeAmount);
    }
    Ok(amount)
}

pub fn validate_deposit_amount(amount: f64) -> Result<f64, ValidationError> {
    if !amount.is_finite() {
        return Err(ValidationError::AmountNotFinite);
    }
    if amount <= 0.0 {
        return Err(ValidationError::AmountNotPositive);
    }
    Ok(amount)
}

pub fn validate_meal_count(count: f64) -> Result<f64, ValidationError> {
    if !count.is_finite() || count < 0.0 || (count * 2.0).fract() != 0.0 {
        return Err(ValidationError::InvalidMealCount);
    }
    Ok(count)
}

pub fn validate_pin(pin: &str) -> Result<(), ValidationError> {
    if pin.len() != 4 || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidPin);
    }
    Ok(())
}

// Validation utilities module
// Custom validators for fields the validator derive cannot express

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

/// Phone numbers must carry at least an area code and an 8-digit subscriber
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digit_count = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if (10..=15).contains(&digit_count) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_phone"))
    }
}

/// Rejects strings made only of whitespace
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

/// Which amounts are acceptable for a money field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountRule {
    Positive,
    NonNegative,
}

/// Collects money-field violations into validator errors
///
/// Decimal fields are checked here instead of through derive attributes.
pub struct AmountChecks {
    errors: ValidationErrors,
}

impl AmountChecks {
    pub fn new() -> Self {
        Self {
            errors: ValidationErrors::new(),
        }
    }

    pub fn check(mut self, field: &'static str, value: Option<Decimal>, rule: AmountRule) -> Self {
        if let Some(amount) = value {
            let ok = match rule {
                AmountRule::Positive => amount > Decimal::ZERO,
                AmountRule::NonNegative => amount >= Decimal::ZERO,
            };
            if !ok {
                let code = match rule {
                    AmountRule::Positive => "must_be_positive",
                    AmountRule::NonNegative => "must_not_be_negative",
                };
                self.errors.add(field, ValidationError::new(code));
            }
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("(11) 99999-8888").is_ok());
        assert!(validate_phone("+55 11 99999 8888").is_ok());
        assert!(validate_phone("9999-8888").is_err());
        assert!(validate_phone("").is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Pizza").is_ok());
        assert!(validate_not_blank("   ").is_err());
    }

    #[test]
    fn test_amount_checks() {
        let result = AmountChecks::new()
            .check("price", Some(dec!(0)), AmountRule::Positive)
            .check("delivery_fee", Some(dec!(0)), AmountRule::NonNegative)
            .check("min_order_value", None, AmountRule::NonNegative)
            .finish();
        let errors = result.unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("price"));
        assert!(!fields.contains_key("delivery_fee"));
    }

    #[test]
    fn test_amount_checks_pass() {
        assert!(AmountChecks::new()
            .check("price", Some(dec!(12.90)), AmountRule::Positive)
            .finish()
            .is_ok());
    }
}

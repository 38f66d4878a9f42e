use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Order price arithmetic
pub struct PriceCalculator;

impl PriceCalculator {
    /// Line total for an order item
    ///
    /// # Arguments
    /// * `quantity` - Number of units ordered
    /// * `unit_price` - Product price at the time of the order
    pub fn calculate_line_total(quantity: i32, unit_price: Decimal) -> Decimal {
        Decimal::from(quantity) * unit_price
    }

    /// Sum of all line totals
    pub fn calculate_subtotal(line_totals: &[Decimal]) -> Decimal {
        line_totals.iter().sum()
    }

    /// Amount due: subtotal plus delivery fee minus discount, never below zero
    pub fn calculate_total(subtotal: Decimal, delivery_fee: Decimal, discount: Decimal) -> Decimal {
        (subtotal + delivery_fee - discount).max(Decimal::ZERO)
    }

    /// Brazilian currency display, e.g. `R$ 1234,50`
    pub fn format_brl(amount: Decimal) -> String {
        let rounded = amount.round_dp(2);
        format!("R$ {:.2}", rounded).replace('.', ",")
    }
}

/// `YYYYMMDD-NNNN` order number for the given day and sequence
pub fn format_order_number(date: NaiveDate, sequence: i64) -> String {
    format!("{}-{:04}", date.format("%Y%m%d"), sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_calculate_line_total() {
        assert_eq!(PriceCalculator::calculate_line_total(2, dec!(4.50)), dec!(9.00));
        assert_eq!(PriceCalculator::calculate_line_total(3, dec!(4.33)), dec!(12.99));
    }

    #[test]
    fn test_calculate_subtotal() {
        let lines = vec![dec!(10.00), dec!(5.50), dec!(3.25)];
        assert_eq!(PriceCalculator::calculate_subtotal(&lines), dec!(18.75));
        assert_eq!(PriceCalculator::calculate_subtotal(&[]), dec!(0.00));
    }

    #[test]
    fn test_calculate_total_with_fee_and_discount() {
        assert_eq!(
            PriceCalculator::calculate_total(dec!(50.00), dec!(7.00), dec!(5.00)),
            dec!(52.00)
        );
    }

    #[test]
    fn test_calculate_total_never_negative() {
        assert_eq!(
            PriceCalculator::calculate_total(dec!(10.00), dec!(0), dec!(25.00)),
            dec!(0)
        );
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(PriceCalculator::format_brl(dec!(12.5)), "R$ 12,50");
        assert_eq!(PriceCalculator::format_brl(dec!(0)), "R$ 0,00");
        assert_eq!(PriceCalculator::format_brl(dec!(1234.567)), "R$ 1234,57");
    }

    #[test]
    fn test_format_order_number() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(format_order_number(day, 7), "20240601-0007");
        assert_eq!(format_order_number(day, 12345), "20240601-12345");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Line total equals quantity times unit price
    #[test]
    fn prop_line_total_invariant() {
        proptest!(|(
            quantity in 1i32..=1000,
            price_cents in 1u32..=10000u32
        )| {
            let price = Decimal::from(price_cents) / Decimal::from(100);
            let line = PriceCalculator::calculate_line_total(quantity, price);
            prop_assert_eq!(line, Decimal::from(quantity) * price);
        });
    }

    /// Total is never negative and never exceeds subtotal plus fee
    #[test]
    fn prop_total_bounds() {
        proptest!(|(
            subtotal_cents in 0i64..1_000_000,
            fee_cents in 0i64..10_000,
            discount_cents in 0i64..2_000_000
        )| {
            let subtotal = Decimal::new(subtotal_cents, 2);
            let fee = Decimal::new(fee_cents, 2);
            let total = PriceCalculator::calculate_total(subtotal, fee, Decimal::new(discount_cents, 2));
            prop_assert!(total >= Decimal::ZERO);
            prop_assert!(total <= subtotal + fee);
        });
    }
}

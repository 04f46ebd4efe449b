//! Order Totals Calculator
//!
//! ```text
//! subtotal          = Σ price * qty
//! line discount     = Σ price * qty * line% / 100
//! eligible base     = Σ price * qty * (1 - line%/100)   over matching lines
//! storewide         = eligible base * storewide% / 100
//! taxable base      = subtotal - line discount - storewide
//! tax / service     = taxable base * rate
//! total             = taxable base + tax + service
//! ```
//!
//! Each output is rounded once, at the end; intermediate sums keep full
//! precision.

use rust_decimal::prelude::*;
use shared::models::Discount;
use shared::order::{MAX_PRICE, MAX_QUANTITY, OrderLine, OrderTotals};

use super::matcher::matches_line;

/// Rounding strategy for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Tax and service-charge rates, in percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingConfig {
    pub tax_rate: f64,
    pub service_charge_rate: f64,
}

impl PricingConfig {
    pub const DEFAULT_TAX_RATE: f64 = 10.0;
    pub const DEFAULT_SERVICE_CHARGE_RATE: f64 = 10.0;
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: Self::DEFAULT_TAX_RATE,
            service_charge_rate: Self::DEFAULT_SERVICE_CHARGE_RATE,
        }
    }
}

/// price * quantity
///
/// Inputs are clamped to the order limits so a malformed record from the
/// store cannot overflow the decimal arithmetic.
fn gross(line: &OrderLine) -> Decimal {
    let price = to_decimal(line.food.price.clamp(0.0, MAX_PRICE));
    let quantity = Decimal::from(line.quantity.min(MAX_QUANTITY));
    price * quantity
}

/// price * quantity * line% / 100 (zero without a line discount)
fn line_discount(line: &OrderLine) -> Decimal {
    match line.discount {
        Some(pct) if pct > 0.0 => gross(line) * to_decimal(pct.min(100.0)) / Decimal::ONE_HUNDRED,
        _ => Decimal::ZERO,
    }
}

/// Line total after its own discount
pub fn line_total(line: &OrderLine) -> f64 {
    to_f64(gross(line) - line_discount(line))
}

/// Compute the full totals view for an order
///
/// Deterministic and side-effect free; an empty order yields all zeros.
pub fn compute_totals(
    lines: &[OrderLine],
    storewide: Option<&Discount>,
    config: &PricingConfig,
) -> OrderTotals {
    let hundred = Decimal::ONE_HUNDRED;

    let subtotal: Decimal = lines.iter().map(gross).sum();
    let line_discount_total: Decimal = lines.iter().map(line_discount).sum();

    let storewide_discount_total = match storewide {
        Some(discount) => {
            let eligible_base: Decimal = lines
                .iter()
                .filter(|line| matches_line(discount, line))
                .map(|line| gross(line) - line_discount(line))
                .sum();
            eligible_base * to_decimal(discount.percent) / hundred
        }
        None => Decimal::ZERO,
    };

    let taxable_base = subtotal - line_discount_total - storewide_discount_total;
    let tax = taxable_base * to_decimal(config.tax_rate) / hundred;
    let service_charge = taxable_base * to_decimal(config.service_charge_rate) / hundred;
    let total = taxable_base + tax + service_charge;

    OrderTotals {
        subtotal: to_f64(subtotal),
        line_discount_total: to_f64(line_discount_total),
        storewide_discount_total: to_f64(storewide_discount_total),
        tax: to_f64(tax),
        service_charge: to_f64(service_charge),
        total: to_f64(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{DiscountType, FoodSnapshot};

    fn food(id: i64, price: f64, category_id: i64) -> FoodSnapshot {
        FoodSnapshot {
            id,
            name: format!("Food {}", id),
            price,
            description: String::new(),
            category_id,
        }
    }

    fn line(food: FoodSnapshot, quantity: u32, discount: Option<f64>) -> OrderLine {
        OrderLine {
            food,
            quantity,
            discount,
            note: None,
        }
    }

    fn storewide(discount_type: DiscountType, percent: f64) -> Discount {
        Discount {
            id: 1,
            name: "Promo".to_string(),
            discount_type,
            percent,
            start_date: 0,
            expiration_date: i64::MAX,
            category_ids: vec![2],
            food_ids: vec![],
        }
    }

    #[test]
    fn test_plain_order() {
        let lines = vec![line(food(1, 100.0, 1), 2, None)];
        let t = compute_totals(&lines, None, &PricingConfig::default());

        assert_eq!(t.subtotal, 200.0);
        assert_eq!(t.line_discount_total, 0.0);
        assert_eq!(t.storewide_discount_total, 0.0);
        assert_eq!(t.tax, 20.0);
        assert_eq!(t.service_charge, 20.0);
        assert_eq!(t.total, 240.0);
    }

    #[test]
    fn test_line_and_storewide_stack() {
        let lines = vec![line(food(1, 100.0, 1), 1, Some(10.0))];
        let d = storewide(DiscountType::EntireOrder, 10.0);
        let t = compute_totals(&lines, Some(&d), &PricingConfig::default());

        assert_eq!(t.line_discount_total, 10.0);
        assert_eq!(t.storewide_discount_total, 9.0);
        assert_eq!(t.total_discount(), 19.0);
        assert_eq!(t.taxable_base(), 81.0);
        assert_eq!(t.tax, 8.1);
        assert_eq!(t.service_charge, 8.1);
        assert_eq!(t.total, 97.2);
    }

    #[test]
    fn test_category_discount_only_reaches_matching_lines() {
        let lines = vec![
            line(food(1, 10.0, 1), 1, None),
            line(food(2, 20.0, 2), 2, None),
        ];
        let d = storewide(DiscountType::Category, 50.0);
        let t = compute_totals(&lines, Some(&d), &PricingConfig::default());

        assert_eq!(t.subtotal, 50.0);
        assert_eq!(t.storewide_discount_total, 20.0);
        assert_eq!(t.total, 36.0);
    }

    #[test]
    fn test_empty_order_is_all_zero() {
        let d = storewide(DiscountType::EntireOrder, 10.0);
        let t = compute_totals(&[], Some(&d), &PricingConfig::default());
        assert_eq!(t, OrderTotals::default());
    }

    #[test]
    fn test_deterministic() {
        let lines = vec![
            line(food(1, 3.33, 1), 3, Some(7.5)),
            line(food(2, 0.1, 2), 7, None),
        ];
        let d = storewide(DiscountType::Category, 12.5);
        let config = PricingConfig::default();
        let first = compute_totals(&lines, Some(&d), &config);
        for _ in 0..10 {
            assert_eq!(compute_totals(&lines, Some(&d), &config), first);
        }
    }

    #[test]
    fn test_configurable_rates() {
        let lines = vec![line(food(1, 100.0, 1), 1, None)];
        let config = PricingConfig {
            tax_rate: 21.0,
            service_charge_rate: 0.0,
        };
        let t = compute_totals(&lines, None, &config);
        assert_eq!(t.tax, 21.0);
        assert_eq!(t.service_charge, 0.0);
        assert_eq!(t.total, 121.0);
    }

    #[test]
    fn test_line_total_after_line_discount() {
        assert_eq!(line_total(&line(food(1, 12.5, 1), 2, Some(20.0))), 20.0);
        assert_eq!(line_total(&line(food(1, 12.5, 1), 2, None)), 25.0);
    }

    #[test]
    fn test_out_of_range_lines_are_clamped() {
        let lines = vec![line(food(1, 1e21, 1), 1_000_000_000, Some(1e30))];
        let t = compute_totals(&lines, None, &PricingConfig::default());

        let max_gross = MAX_PRICE * MAX_QUANTITY as f64;
        assert_eq!(t.subtotal, max_gross);
        assert_eq!(t.line_discount_total, max_gross);
        assert_eq!(t.total, 0.0);

        let lines = vec![line(food(1, 1e21, 1), 1_000_000_000, None)];
        let t = compute_totals(&lines, None, &PricingConfig::default());
        assert_eq!(t.subtotal, max_gross);
        assert_eq!(t.total, 11_998_800_000.0);
    }
}

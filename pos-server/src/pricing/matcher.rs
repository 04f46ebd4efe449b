//! Discount Matcher
//!
//! Which discounts are eligible right now, and which lines they reach.

use shared::models::{Discount, DiscountType};
use shared::order::OrderLine;

/// Validity window is inclusive on both ends; percent must be 0-100
pub fn is_time_valid(discount: &Discount, now: i64) -> bool {
    discount.start_date <= now && now <= discount.expiration_date
}

pub fn is_percent_valid(percent: f64) -> bool {
    (0.0..=100.0).contains(&percent)
}

/// Eligible for application as a storewide discount at `now`
pub fn is_eligible(discount: &Discount, now: i64) -> bool {
    is_time_valid(discount, now) && is_percent_valid(discount.percent)
}

/// Check if a storewide discount reaches this line based on its type
pub fn matches_line(discount: &Discount, line: &OrderLine) -> bool {
    match discount.discount_type {
        DiscountType::EntireOrder => true,
        DiscountType::Category => discount.category_ids.contains(&line.food.category_id),
        DiscountType::Food => discount.food_ids.contains(&line.food.id),
    }
}

/// Keep only the discounts eligible at `now`, in catalog order
pub fn filter_active(discounts: Vec<Discount>, now: i64) -> Vec<Discount> {
    discounts.into_iter().filter(|d| is_eligible(d, now)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::FoodSnapshot;

    fn discount(discount_type: DiscountType) -> Discount {
        Discount {
            id: 1,
            name: "Lunch".to_string(),
            discount_type,
            percent: 15.0,
            start_date: 1_000,
            expiration_date: 2_000,
            category_ids: vec![10],
            food_ids: vec![5],
        }
    }

    fn line(food_id: i64, category_id: i64) -> OrderLine {
        OrderLine::new(FoodSnapshot {
            id: food_id,
            name: "Item".to_string(),
            price: 1.0,
            description: String::new(),
            category_id,
        })
    }

    #[test]
    fn test_time_window_inclusive() {
        let d = discount(DiscountType::EntireOrder);
        assert!(!is_time_valid(&d, 999));
        assert!(is_time_valid(&d, 1_000));
        assert!(is_time_valid(&d, 2_000));
        assert!(!is_time_valid(&d, 2_001));
    }

    #[test]
    fn test_percent_bounds() {
        let mut d = discount(DiscountType::EntireOrder);
        d.percent = 120.0;
        assert!(!is_eligible(&d, 1_500));
        d.percent = 100.0;
        assert!(is_eligible(&d, 1_500));
    }

    #[test]
    fn test_matches_line_by_type() {
        assert!(matches_line(&discount(DiscountType::EntireOrder), &line(1, 1)));

        let by_category = discount(DiscountType::Category);
        assert!(matches_line(&by_category, &line(1, 10)));
        assert!(!matches_line(&by_category, &line(5, 11)));

        let by_food = discount(DiscountType::Food);
        assert!(matches_line(&by_food, &line(5, 11)));
        assert!(!matches_line(&by_food, &line(6, 10)));
    }

    #[test]
    fn test_filter_active() {
        let mut expired = discount(DiscountType::Food);
        expired.id = 2;
        expired.expiration_date = 1_200;
        let active = filter_active(vec![discount(DiscountType::Food), expired], 1_500);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, 1);
    }
}

use rust_decimal::{Decimal, prelude::ToPrimitive};

use super::time::in_rush_window;
use crate::{
    config::Pricing,
    models::{delivery_fee::DeliveryFee, delivery_request::DeliveryRequest},
};

type FeeRule = fn(&Pricing, &DeliveryRequest, Decimal) -> Decimal;

/// Order matters: the cart-value rule can zero the running fee and the rush
/// multiplier scales whatever precedes it.
const FEE_RULES: [FeeRule; 5] = [
    add_distance_fee,
    add_number_of_items_fee,
    add_cart_value_fee,
    add_time_fee,
    apply_max_delivery_fee,
];

impl Pricing {
    /// Runs the fee pipeline for a validated request. Fractional cents left by
    /// the rush multiplier are truncated once, after the cap.
    pub fn calculate(&self, request: &DeliveryRequest) -> DeliveryFee {
        let fee = FEE_RULES
            .iter()
            .fold(Decimal::ZERO, |fee, rule| rule(self, request, fee));

        DeliveryFee::new(fee.trunc().to_u64().unwrap_or(0))
    }
}

pub fn calculate(request: &DeliveryRequest) -> DeliveryFee {
    Pricing::default().calculate(request)
}

/// Start fee, plus one block fee for every started block beyond the base distance.
pub fn add_distance_fee(pricing: &Pricing, request: &DeliveryRequest, fee: Decimal) -> Decimal {
    let extra_distance = request
        .delivery_distance
        .saturating_sub(pricing.base_distance);
    let blocks = match pricing.additional_distance_block {
        0 => 0,
        block => extra_distance.div_ceil(block),
    };

    fee.saturating_add(Decimal::from(pricing.start_fee))
        .saturating_add(
            Decimal::from(blocks).saturating_mul(Decimal::from(pricing.additional_distance_fee)),
        )
}

pub fn add_number_of_items_fee(
    pricing: &Pricing,
    request: &DeliveryRequest,
    fee: Decimal,
) -> Decimal {
    let count = request.number_of_items;
    let mut fee = fee;

    if count > pricing.item_surcharge_threshold {
        let surcharged_items = count - pricing.item_surcharge_threshold;
        fee = fee.saturating_add(
            Decimal::from(surcharged_items).saturating_mul(Decimal::from(pricing.item_surcharge)),
        );
    }
    if count > pricing.bulk_item_threshold {
        fee = fee.saturating_add(Decimal::from(pricing.bulk_surcharge));
    }

    fee
}

/// Small carts pay the gap to the surcharge threshold; large carts reset the
/// whole running fee to zero.
pub fn add_cart_value_fee(pricing: &Pricing, request: &DeliveryRequest, fee: Decimal) -> Decimal {
    let cart_value = request.cart_value;

    if cart_value < pricing.cart_value_surcharge_threshold {
        fee.saturating_add(Decimal::from(
            pricing.cart_value_surcharge_threshold - cart_value,
        ))
    } else if cart_value >= pricing.free_delivery_cart_value {
        Decimal::ZERO
    } else {
        fee
    }
}

pub fn add_time_fee(pricing: &Pricing, request: &DeliveryRequest, fee: Decimal) -> Decimal {
    if in_rush_window(
        &request.time,
        pricing.rush_weekday,
        pricing.rush_start,
        pricing.rush_end,
    ) {
        fee.saturating_mul(pricing.rush_multiplier)
    } else {
        fee
    }
}

pub fn apply_max_delivery_fee(
    pricing: &Pricing,
    _request: &DeliveryRequest,
    fee: Decimal,
) -> Decimal {
    fee.min(Decimal::from(pricing.max_fee))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::time::parse_utc_timestamp;
    use rust_decimal_macros::dec;

    const MONDAY_NOON: &str = "2024-01-15T13:00:00Z";
    const FRIDAY_RUSH: &str = "2024-01-19T15:10:00Z";

    fn request(cart_value: u64, distance: u64, items: u64, time: &str) -> DeliveryRequest {
        DeliveryRequest {
            cart_value,
            delivery_distance: distance,
            number_of_items: items,
            time: parse_utc_timestamp(time).unwrap(),
        }
    }

    fn fee(cart_value: u64, distance: u64, items: u64, time: &str) -> u64 {
        calculate(&request(cart_value, distance, items, time)).cents()
    }

    #[test]
    fn distance_blocks() {
        let pricing = Pricing::default();
        let at = |distance| {
            add_distance_fee(
                &pricing,
                &request(1000, distance, 1, MONDAY_NOON),
                Decimal::ZERO,
            )
        };

        assert_eq!(at(1), dec!(200));
        assert_eq!(at(999), dec!(200));
        assert_eq!(at(1000), dec!(200));
        assert_eq!(at(1001), dec!(300));
        assert_eq!(at(1499), dec!(300));
        assert_eq!(at(1500), dec!(300));
        assert_eq!(at(1501), dec!(400));
        assert_eq!(at(2235), dec!(500));
    }

    #[test]
    fn item_thresholds_are_exclusive() {
        let pricing = Pricing::default();
        let at = |items| {
            add_number_of_items_fee(
                &pricing,
                &request(1000, 1000, items, MONDAY_NOON),
                Decimal::ZERO,
            )
        };

        assert_eq!(at(1), dec!(0));
        assert_eq!(at(4), dec!(0));
        assert_eq!(at(5), dec!(50));
        assert_eq!(at(10), dec!(300));
        assert_eq!(at(12), dec!(400));
        assert_eq!(at(13), dec!(570));
        assert_eq!(at(14), dec!(620));
    }

    #[test]
    fn cart_value_surcharge_and_reset() {
        let pricing = Pricing::default();
        let at = |cart_value| {
            add_cart_value_fee(
                &pricing,
                &request(cart_value, 1000, 1, MONDAY_NOON),
                dec!(700),
            )
        };

        assert_eq!(at(1), dec!(1699));
        assert_eq!(at(790), dec!(910));
        assert_eq!(at(1000), dec!(700));
        assert_eq!(at(19999), dec!(700));
        assert_eq!(at(20000), dec!(0));
        assert_eq!(at(50000), dec!(0));
    }

    #[test]
    fn rush_multiplier_is_exact() {
        let pricing = Pricing::default();
        let rush = request(1000, 1000, 1, FRIDAY_RUSH);
        let calm = request(1000, 1000, 1, MONDAY_NOON);

        assert_eq!(add_time_fee(&pricing, &rush, dec!(1170)), dec!(1404));
        assert_eq!(add_time_fee(&pricing, &rush, dec!(0)), dec!(0));
        assert_eq!(add_time_fee(&pricing, &calm, dec!(1170)), dec!(1170));
    }

    #[test]
    fn cap_clamps_only_above() {
        let pricing = Pricing::default();
        let any = request(1000, 1000, 1, MONDAY_NOON);

        assert_eq!(apply_max_delivery_fee(&pricing, &any, dec!(2004)), dec!(1500));
        assert_eq!(apply_max_delivery_fee(&pricing, &any, dec!(1500)), dec!(1500));
        assert_eq!(apply_max_delivery_fee(&pricing, &any, dec!(1404)), dec!(1404));
    }

    #[test]
    fn published_scenarios() {
        assert_eq!(fee(790, 2235, 4, MONDAY_NOON), 710);
        assert_eq!(fee(1000, 230, 4, MONDAY_NOON), 200);
        assert_eq!(fee(1000, 1499, 4, MONDAY_NOON), 300);
        assert_eq!(fee(1000, 1500, 4, MONDAY_NOON), 300);
        assert_eq!(fee(1000, 1501, 4, MONDAY_NOON), 400);
        assert_eq!(fee(1000, 1000, 6, MONDAY_NOON), 300);
        assert_eq!(fee(1000, 1000, 13, MONDAY_NOON), 770);
        assert_eq!(fee(1000, 1000, 4, FRIDAY_RUSH), 240);
        assert_eq!(fee(1000, 1000, 13, FRIDAY_RUSH), 924);
        assert_eq!(fee(500, 3000, 13, FRIDAY_RUSH), 1500);
        assert_eq!(fee(19999, 3000, 13, FRIDAY_RUSH), 1404);
        assert_eq!(fee(20000, 3000, 13, FRIDAY_RUSH), 0);
        // 1199 * 1.2 = 1438.8, truncated rather than rounded
        assert_eq!(fee(1, 1, 1, FRIDAY_RUSH), 1438);
    }

    #[test]
    fn fractional_cents_are_truncated() {
        // 1 * 1.2 = 1.2
        let pricing = Pricing {
            start_fee: 1,
            ..Default::default()
        };
        let fee = pricing.calculate(&request(1000, 1, 1, FRIDAY_RUSH));
        assert_eq!(fee.cents(), 1);

        let pricing = Pricing {
            start_fee: 209,
            ..Default::default()
        };
        // 209 * 1.2 = 250.8
        let fee = pricing.calculate(&request(1000, 1, 1, FRIDAY_RUSH));
        assert_eq!(fee.cents(), 250);
    }

    #[test]
    fn rush_window_edges_are_charged() {
        assert_eq!(fee(1000, 1000, 4, "2024-01-19T15:00:00Z"), 240);
        assert_eq!(fee(1000, 1000, 4, "2024-01-19T19:00:00Z"), 240);
        assert_eq!(fee(1000, 1000, 4, "2024-01-19T14:59:59Z"), 200);
        assert_eq!(fee(1000, 1000, 4, "2024-01-19T19:00:01Z"), 200);
    }

    #[test]
    fn fee_never_exceeds_cap() {
        for cart_value in [1, 500, 999, 1000, 19999] {
            for distance in [1, 1000, 5000, 100_000] {
                for items in [1, 5, 13, 100] {
                    for time in [MONDAY_NOON, FRIDAY_RUSH] {
                        assert!(fee(cart_value, distance, items, time) <= 1500);
                    }
                }
            }
        }
        assert_eq!(fee(1, u64::MAX, u64::MAX, FRIDAY_RUSH), 1500);
    }

    #[test]
    fn distance_is_monotonic() {
        let mut previous = 0;
        for distance in (1..=6000).step_by(7) {
            let current = fee(1000, distance, 1, MONDAY_NOON);
            assert!(current >= previous, "distance {distance}");
            previous = current;
        }
    }

    #[test]
    fn free_delivery_dominates() {
        for cart_value in [20000, 20001, 1_000_000] {
            for distance in [1, 1501, 50_000] {
                for items in [1, 13, 500] {
                    for time in [MONDAY_NOON, FRIDAY_RUSH] {
                        assert_eq!(fee(cart_value, distance, items, time), 0);
                    }
                }
            }
        }
    }

    #[test]
    fn calculation_is_idempotent() {
        let pricing = Pricing::default();
        let request = request(790, 2235, 13, FRIDAY_RUSH);
        assert_eq!(pricing.calculate(&request), pricing.calculate(&request));
    }

    #[test]
    fn injected_pricing_is_used() {
        let pricing = Pricing {
            max_fee: 800,
            rush_multiplier: dec!(2),
            ..Default::default()
        };
        // 770 * 2 = 1540, capped at 800
        let fee = pricing.calculate(&request(1000, 1000, 13, FRIDAY_RUSH));
        assert_eq!(fee.cents(), 800);
    }
}

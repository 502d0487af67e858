//! Lead pricing rules.
//!
//! Pricing is a pure function of the lead's age, whether another dealer
//! currently contests it with a live temporary lock, and the administrator
//! settings. The same inputs must always produce the same charge: the
//! client-displayed price is reconciled against the server-confirmed amount
//! at checkout, so any nondeterminism here becomes a billing dispute.
//!
//! All amounts are integer cents.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// The pricing-relevant slice of the system settings singleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Price of an uncontested lead, in cents.
    pub standard_price_cents: i64,
    /// Price of a contested lead (live lock held by another dealer), in cents.
    pub discounted_price_cents: i64,
    pub age_discount_enabled: bool,
    /// Lead age, in whole days, at which the age discount starts applying.
    pub age_discount_threshold_days: i64,
    /// Percentage knocked off the standard price, 0..=100.
    pub age_discount_percentage: i64,
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// Compute the charge for a lead. First matching rule wins:
///
/// 1. Age discount: lead age (days) at or past the threshold, and the
///    discount enabled, prices at `standard × (100 − pct) / 100`
///    (integer division, rounds down).
/// 2. Contested: another dealer holds a live non-permanent lock, so
///    exclusivity is uncertain and the lead prices at the discounted rate.
/// 3. Standard price.
///
/// A lead purchased by another dealer is *not* contested: purchases expire
/// competing locks, and visibility past that point is governed by purchase
/// state, so the lead falls back to rules 1/3.
pub fn price_cents(age_days: i64, contested: bool, settings: &PricingSettings) -> i64 {
    if settings.age_discount_enabled && age_days >= settings.age_discount_threshold_days {
        let pct = settings.age_discount_percentage.clamp(0, 100);
        return settings.standard_price_cents * (100 - pct) / 100;
    }
    if contested {
        return settings.discounted_price_cents;
    }
    settings.standard_price_cents
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PricingSettings {
        PricingSettings {
            standard_price_cents: 5000,
            discounted_price_cents: 2500,
            age_discount_enabled: true,
            age_discount_threshold_days: 30,
            age_discount_percentage: 25,
        }
    }

    // -- Rule 3: standard --

    #[test]
    fn fresh_uncontested_lead_prices_standard() {
        assert_eq!(price_cents(10, false, &settings()), 5000);
    }

    // -- Rule 2: contested --

    #[test]
    fn contested_lead_prices_discounted() {
        assert_eq!(price_cents(10, true, &settings()), 2500);
    }

    // -- Rule 1: age discount --

    #[test]
    fn age_discount_at_threshold() {
        // 30 days, 25% off 5000 -> 3750.
        assert_eq!(price_cents(30, false, &settings()), 3750);
    }

    #[test]
    fn age_discount_beats_contested_discount() {
        // Rule order: age discount wins even while the lead is contested.
        assert_eq!(price_cents(45, true, &settings()), 3750);
    }

    #[test]
    fn age_discount_disabled_falls_through() {
        let mut s = settings();
        s.age_discount_enabled = false;
        assert_eq!(price_cents(90, false, &s), 5000);
        assert_eq!(price_cents(90, true, &s), 2500);
    }

    #[test]
    fn age_below_threshold_not_discounted() {
        assert_eq!(price_cents(29, false, &settings()), 5000);
    }

    #[test]
    fn age_discount_rounds_down() {
        let s = PricingSettings {
            standard_price_cents: 4999,
            discounted_price_cents: 2500,
            age_discount_enabled: true,
            age_discount_threshold_days: 30,
            age_discount_percentage: 33,
        };
        // 4999 * 67 / 100 = 3349.33 -> 3349.
        assert_eq!(price_cents(30, false, &s), 3349);
    }

    #[test]
    fn full_discount_prices_zero() {
        let mut s = settings();
        s.age_discount_percentage = 100;
        assert_eq!(price_cents(60, false, &s), 0);
    }

    #[test]
    fn out_of_range_percentage_clamped() {
        let mut s = settings();
        s.age_discount_percentage = 150;
        assert_eq!(price_cents(60, false, &s), 0);
        s.age_discount_percentage = -10;
        assert_eq!(price_cents(60, false, &s), 5000);
    }

    // -- Determinism --

    #[test]
    fn identical_inputs_identical_output() {
        let s = settings();
        for (age, contested) in [(0, false), (10, true), (30, false), (400, true)] {
            assert_eq!(
                price_cents(age, contested, &s),
                price_cents(age, contested, &s)
            );
        }
    }
}

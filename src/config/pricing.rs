//! Accessory rate table
//!
//! Which accessories each vehicle category offers and what they cost per
//! day. Defaults can be overridden per accessory through
//! `ACCESSORY_RATE_<NAME>` environment variables.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use super::environment::{parse_var, ConfigError};
use crate::models::{Accessory, VehicleCategory};

#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    offerings: BTreeMap<VehicleCategory, BTreeMap<Accessory, Decimal>>,
}

impl Default for RateTable {
    fn default() -> Self {
        Self::new()
            .offer(VehicleCategory::TwoWheeler, Accessory::Helmet, dec!(100))
            .offer(VehicleCategory::TwoWheeler, Accessory::RidingGear, dec!(300))
            .offer(VehicleCategory::FourWheeler, Accessory::ChildSeat, dec!(200))
            .offer(VehicleCategory::FourWheeler, Accessory::Gps, dec!(150))
            .offer(VehicleCategory::Heavy, Accessory::Gps, dec!(150))
    }
}

impl RateTable {
    /// Empty table: no accessories offered anywhere
    pub fn new() -> Self {
        Self {
            offerings: BTreeMap::new(),
        }
    }

    pub fn offer(mut self, category: VehicleCategory, accessory: Accessory, daily_rate: Decimal) -> Self {
        self.offerings
            .entry(category)
            .or_default()
            .insert(accessory, daily_rate);
        self
    }

    /// Daily rate of `accessory` for `category`, `None` when not offered
    pub fn rate(&self, category: VehicleCategory, accessory: Accessory) -> Option<Decimal> {
        self.offerings
            .get(&category)
            .and_then(|rates| rates.get(&accessory))
            .copied()
    }

    pub fn offered(&self, category: VehicleCategory) -> Vec<(Accessory, Decimal)> {
        self.offerings
            .get(&category)
            .map(|rates| rates.iter().map(|(a, r)| (*a, *r)).collect())
            .unwrap_or_default()
    }

    /// Change the rate of an accessory everywhere it is offered
    pub fn with_rate(mut self, accessory: Accessory, daily_rate: Decimal) -> Self {
        for rates in self.offerings.values_mut() {
            if let Some(rate) = rates.get_mut(&accessory) {
                *rate = daily_rate;
            }
        }
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let mut table = Self::default();
        for (accessory, var) in [
            (Accessory::Helmet, "ACCESSORY_RATE_HELMET"),
            (Accessory::RidingGear, "ACCESSORY_RATE_RIDING_GEAR"),
            (Accessory::ChildSeat, "ACCESSORY_RATE_CHILD_SEAT"),
            (Accessory::Gps, "ACCESSORY_RATE_GPS"),
        ] {
            if std::env::var(var).is_ok() {
                let rate: Decimal = parse_var(var, Decimal::ZERO)?;
                if rate.is_sign_negative() {
                    return Err(ConfigError::Invalid {
                        name: var,
                        value: rate.to_string(),
                    });
                }
                table = table.with_rate(accessory, rate);
            }
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_offerings_per_category() {
        let table = RateTable::default();
        assert_eq!(table.rate(VehicleCategory::TwoWheeler, Accessory::Helmet), Some(dec!(100)));
        assert_eq!(table.rate(VehicleCategory::TwoWheeler, Accessory::Gps), None);
        assert_eq!(table.rate(VehicleCategory::FourWheeler, Accessory::ChildSeat), Some(dec!(200)));
        assert_eq!(
            table.offered(VehicleCategory::Heavy),
            vec![(Accessory::Gps, dec!(150))]
        );
    }

    #[test]
    fn test_with_rate_updates_every_category() {
        let table = RateTable::default().with_rate(Accessory::Gps, dec!(175.50));
        assert_eq!(table.rate(VehicleCategory::FourWheeler, Accessory::Gps), Some(dec!(175.50)));
        assert_eq!(table.rate(VehicleCategory::Heavy, Accessory::Gps), Some(dec!(175.50)));
        assert_eq!(table.rate(VehicleCategory::TwoWheeler, Accessory::Gps), None);
    }
}

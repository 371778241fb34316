//! Pricing calculator
//!
//! Pure function of the vehicle's daily rate, the rental range and the
//! selected accessories. Every amount is a `Decimal` rounded to paise.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::RateTable;
use crate::models::{Accessories, DateRange, VehicleCategory};
use crate::utils::errors::BookingError;

/// One row of the price breakdown shown to customers
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LineItem {
    pub label: String,
    pub unit_rate: Decimal,
    pub days: i64,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceQuote {
    pub duration_days: i64,
    pub line_items: Vec<LineItem>,
    pub total: Decimal,
}

#[derive(Debug, Clone)]
pub struct PricingCalculator {
    rates: RateTable,
}

impl Default for PricingCalculator {
    fn default() -> Self {
        Self::new(RateTable::default())
    }
}

impl PricingCalculator {
    pub fn new(rates: RateTable) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Price a rental. The first line item is always the base rent; selected
    /// accessories follow in display order, unselected ones are omitted.
    pub fn quote(
        &self,
        category: VehicleCategory,
        daily_rate: Decimal,
        range: &DateRange,
        accessories: &Accessories,
    ) -> Result<PriceQuote, BookingError> {
        let days = range.days();
        if days < 1 {
            return Err(BookingError::InvalidDateRange(format!(
                "rental must span at least one day, got {}",
                days
            )));
        }
        let multiplier = Decimal::from(days);

        let mut line_items = Vec::with_capacity(1 + accessories.selected().len());
        line_items.push(LineItem {
            label: "Vehicle rent".to_string(),
            unit_rate: daily_rate,
            days,
            amount: (daily_rate * multiplier).round_dp(2),
        });

        for accessory in accessories.selected() {
            let rate = self
                .rates
                .rate(category, accessory)
                .ok_or(BookingError::UnsupportedAccessory { accessory, category })?;
            line_items.push(LineItem {
                label: accessory.label().to_string(),
                unit_rate: rate,
                days,
                amount: (rate * multiplier).round_dp(2),
            });
        }

        let total = line_items.iter().map(|item| item.amount).sum::<Decimal>().round_dp(2);

        Ok(PriceQuote {
            duration_days: days,
            line_items,
            total,
        })
    }
}

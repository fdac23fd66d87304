// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Pricing calculator.
//!
//! Converts final lane totals into billable pallet places and a price:
//!
//! ```text
//! places = round2((sum / lanes) / place_length)      (0 when sum is 0)
//! price  = round2(places * price_per_place)
//! price  = full_truck_price if price >= full_truck_price
//! ```
//!
//! The calculation is pure and total once the price list is validated.

use stowage_model::{decimal::round_to, lane::LaneTotals, terms::OrderTerms};
use thiserror::Error;

/// The default length of one pallet place in meters.
pub const PLACE_LENGTH: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PricingError {
    #[error("invalid price list value `{field}`: {value}")]
    InvalidPrice { field: &'static str, value: f64 },
    #[error("invalid lane capacity: {0}")]
    InvalidCapacity(f64),
}

/// A billable quote for an order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    /// Billable pallet places, rounded to two decimals.
    pub places: f64,
    /// Price, rounded to two decimals and capped at the full truck price.
    pub price: f64,
    /// Whether the full truck price applies.
    pub is_full: bool,
}

impl std::fmt::Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Quote(places: {:.2}, price: {:.2}", self.places, self.price)?;
        if self.is_full {
            write!(f, ", full truck")?;
        }
        write!(f, ")")
    }
}

/// Validated prices of an order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceList {
    price_per_place: f64,
    full_truck_price: f64,
    place_length: f64,
}

impl PriceList {
    /// # Errors
    ///
    /// Returns `PricingError::InvalidPrice` if a price is negative or not finite.
    pub fn new(price_per_place: f64, full_truck_price: f64) -> Result<Self, PricingError> {
        Self::with_place_length(price_per_place, full_truck_price, PLACE_LENGTH)
    }

    /// Creates a price list for places of `place_length` meters.
    pub fn with_place_length(
        price_per_place: f64,
        full_truck_price: f64,
        place_length: f64,
    ) -> Result<Self, PricingError> {
        if !(price_per_place.is_finite() && price_per_place >= 0.0) {
            return Err(PricingError::InvalidPrice {
                field: "price_per_place",
                value: price_per_place,
            });
        }
        if !(full_truck_price.is_finite() && full_truck_price >= 0.0) {
            return Err(PricingError::InvalidPrice {
                field: "full_truck_price",
                value: full_truck_price,
            });
        }
        if !(place_length.is_finite() && place_length > 0.0) {
            return Err(PricingError::InvalidPrice {
                field: "place_length",
                value: place_length,
            });
        }
        Ok(Self {
            price_per_place,
            full_truck_price,
            place_length,
        })
    }

    /// The price list of an order.
    pub fn from_terms(terms: &OrderTerms, place_length: f64) -> Result<Self, PricingError> {
        Self::with_place_length(terms.price_per_place, terms.full_truck_price, place_length)
    }

    #[inline]
    pub fn price_per_place(&self) -> f64 {
        self.price_per_place
    }

    #[inline]
    pub fn full_truck_price(&self) -> f64 {
        self.full_truck_price
    }

    pub fn quote(&self, totals: &LaneTotals) -> Quote {
        let sum = totals.sum();
        let lanes = totals.num_lanes();
        let places = if sum > 0.0 && lanes > 0 {
            round2(sum / lanes as f64 / self.place_length)
        } else {
            0.0
        };

        let price = round2(places * self.price_per_place);
        if price >= self.full_truck_price {
            Quote {
                places,
                price: self.full_truck_price,
                is_full: true,
            }
        } else {
            Quote {
                places,
                price,
                is_full: false,
            }
        }
    }
}

/// Prices `totals` for lanes of `capacity` meters.
///
/// # Errors
///
/// Returns a `PricingError` for a non-positive capacity or an invalid price.
pub fn price(
    totals: &LaneTotals,
    capacity: f64,
    price_per_place: f64,
    full_truck_price: f64,
) -> Result<Quote, PricingError> {
    if !(capacity.is_finite() && capacity > 0.0) {
        return Err(PricingError::InvalidCapacity(capacity));
    }
    Ok(PriceList::new(price_per_place, full_truck_price)?.quote(totals))
}

/// Rounds to two decimals, deciding on the exact value of `value`.
#[inline]
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn totals(values: &[f64]) -> LaneTotals {
        LaneTotals::from_slice(values)
    }

    #[test]
    fn test_full_truck() {
        let quote = price(&totals(&[13.6, 13.6, 13.6]), 13.6, 1160.0, 25600.0).unwrap();
        assert_eq!(quote.places, 34.0);
        assert_eq!(quote.price, 25600.0);
        assert!(quote.is_full);
    }

    #[test]
    fn test_partial_truck() {
        let quote = price(&totals(&[5.0, 5.0, 5.0]), 13.6, 1160.0, 25600.0).unwrap();
        assert_eq!(quote.places, 12.5);
        assert_eq!(quote.price, 14500.0);
        assert!(!quote.is_full);
    }

    #[test]
    fn test_places_are_rounded() {
        // 1.0 / 3 / 0.4 = 0.8333...
        let quote = price(&totals(&[1.0, 0.0, 0.0]), 13.6, 100.0, 25600.0).unwrap();
        assert_eq!(quote.places, 0.83);
        assert_eq!(quote.price, 83.0);
    }

    #[test]
    fn test_places_round_on_the_exact_value() {
        // (1.29 / 3) / 0.4 is stored just below 1.075, (1.35 / 3) / 0.4 just below 1.125.
        let quote = price(&totals(&[1.29, 0.0, 0.0]), 13.6, 1160.0, 25600.0).unwrap();
        assert_eq!(quote.places, 1.07);
        assert_eq!(quote.price, 1241.2);

        let quote = price(&totals(&[1.35, 0.0, 0.0]), 13.6, 1160.0, 25600.0).unwrap();
        assert_eq!(quote.places, 1.12);
        assert_eq!(quote.price, 1299.2);
    }

    #[test]
    fn test_round2_is_not_fooled_by_the_scaled_product() {
        // 1.0749999.. * 100.0 evaluates to exactly 107.5.
        let places = 1.29 / 3.0 / 0.4;
        assert_eq!(places * 100.0, 107.5);
        assert_eq!(round2(places), 1.07);
    }

    #[test]
    fn test_empty_vehicle_is_free() {
        let quote = price(&totals(&[0.0, 0.0, 0.0]), 13.6, 1160.0, 25600.0).unwrap();
        assert_eq!(quote.places, 0.0);
        assert_eq!(quote.price, 0.0);
        assert!(!quote.is_full);
    }

    #[test]
    fn test_zero_full_truck_price_is_always_full() {
        let quote = price(&totals(&[0.0, 0.0, 0.0]), 13.6, 1160.0, 0.0).unwrap();
        assert!(quote.is_full);
        assert_eq!(quote.price, 0.0);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert_eq!(
            price(&totals(&[1.0]), 0.0, 1.0, 1.0),
            Err(PricingError::InvalidCapacity(0.0))
        );
        assert_eq!(
            PriceList::new(-1.0, 1.0),
            Err(PricingError::InvalidPrice {
                field: "price_per_place",
                value: -1.0
            })
        );
        assert!(PriceList::new(1.0, f64::INFINITY).is_err());
        assert!(PriceList::with_place_length(1.0, 1.0, 0.0).is_err());
    }

    #[test]
    fn test_from_terms() {
        let list = PriceList::from_terms(&OrderTerms::default(), PLACE_LENGTH).unwrap();
        assert_eq!(list.price_per_place(), 1160.0);
        assert_eq!(list.full_truck_price(), 25600.0);
    }

    proptest! {
        #[test]
        fn quote_is_pure_and_capped(
            values in prop::collection::vec(0.0f64..20.0, 3),
            price_per_place in 0.0f64..5000.0,
            full in 0.0f64..50000.0,
        ) {
            let t = totals(&values);
            let a = price(&t, 13.6, price_per_place, full).unwrap();
            let b = price(&t, 13.6, price_per_place, full).unwrap();
            prop_assert_eq!(a, b);
            prop_assert!(a.price <= full);
            prop_assert_eq!(a.is_full, a.price == full && round2(a.places * price_per_place) >= full);
        }
    }
}

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

//! Engine configuration and order terms.
//!
//! `EngineConfig` is the process-wide configuration, read once from JSON and
//! then passed around explicitly. `OrderTerms` are the commercial and physical
//! parameters of a single order, seeded from the configuration when the order
//! is created.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_CAPACITY: f64 = 13.6;
const ALTERNATIVE_CAPACITY: f64 = 15.4;
const PRICE_PER_PLACE: f64 = 1160.0;
const FULL_TRUCK_PRICE: f64 = 25600.0;
const NUM_LANES: usize = 3;
const PLACE_LENGTH: f64 = 0.4;
const RENUMBER_STEP: i64 = 1024;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Lane capacity in meters for a standard trailer.
    pub default_capacity: f64,
    /// Lane capacity in meters for the long trailer.
    pub alternative_capacity: f64,
    pub price_per_place: f64,
    /// Price ceiling; a quote at or above it is billed as a full truck.
    pub full_truck_price: f64,
    pub num_lanes: usize,
    /// Length in meters of one billable pallet place.
    pub place_length: f64,
    /// Gap between neighbouring keys after an order is renumbered.
    pub renumber_step: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_capacity: DEFAULT_CAPACITY,
            alternative_capacity: ALTERNATIVE_CAPACITY,
            price_per_place: PRICE_PER_PLACE,
            full_truck_price: FULL_TRUCK_PRICE,
            num_lanes: NUM_LANES,
            place_length: PLACE_LENGTH,
            renumber_step: RENUMBER_STEP,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON configuration. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` on malformed input and `ConfigError::Invalid`
    /// if a value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks every value for physical and commercial plausibility.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("default_capacity", self.default_capacity)?;
        positive("alternative_capacity", self.alternative_capacity)?;
        non_negative("price_per_place", self.price_per_place)?;
        non_negative("full_truck_price", self.full_truck_price)?;
        positive("place_length", self.place_length)?;

        if self.num_lanes == 0 || self.num_lanes > u8::MAX as usize {
            return Err(ConfigError::Invalid {
                field: "num_lanes",
                reason: "must be between 1 and 255",
            });
        }
        if self.renumber_step < 2 {
            return Err(ConfigError::Invalid {
                field: "renumber_step",
                reason: "must leave room between neighbouring keys (at least 2)",
            });
        }
        Ok(())
    }

    /// Terms for a new order on a standard trailer.
    #[inline]
    pub fn default_terms(&self) -> OrderTerms {
        OrderTerms {
            capacity: self.default_capacity,
            price_per_place: self.price_per_place,
            full_truck_price: self.full_truck_price,
        }
    }

    /// Terms for a new order on the long trailer.
    #[inline]
    pub fn alternative_terms(&self) -> OrderTerms {
        OrderTerms {
            capacity: self.alternative_capacity,
            ..self.default_terms()
        }
    }
}

/// Per-order lane capacity and prices.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderTerms {
    /// Maximum summed pallet length per lane, in meters.
    pub capacity: f64,
    pub price_per_place: f64,
    pub full_truck_price: f64,
}

impl Default for OrderTerms {
    fn default() -> Self {
        EngineConfig::default().default_terms()
    }
}

impl OrderTerms {
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for a non-positive capacity or a negative price.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("capacity", self.capacity)?;
        non_negative("price_per_place", self.price_per_place)?;
        non_negative("full_truck_price", self.full_truck_price)
    }
}

impl std::fmt::Display for OrderTerms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OrderTerms(capacity: {:.2} m, price per place: {:.2}, full truck: {:.2})",
            self.capacity, self.price_per_place, self.full_truck_price
        )
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be positive and finite",
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be non-negative and finite",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_capacity, 13.6);
        assert_eq!(config.alternative_capacity, 15.4);
        assert_eq!(config.num_lanes, 3);
        assert!(config.validate().is_ok());

        let terms = OrderTerms::default();
        assert_eq!(terms.price_per_place, 1160.0);
        assert_eq!(terms.full_truck_price, 25600.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "price_per_place": 1200.0 }"#).unwrap();
        assert_eq!(config.price_per_place, 1200.0);
        assert_eq!(config.default_capacity, 13.6);
        assert_eq!(config.alternative_terms().capacity, 15.4);
        assert_eq!(config.alternative_terms().price_per_place, 1200.0);
    }

    #[test]
    fn test_rejects_unknown_field() {
        let err = EngineConfig::from_json_str(r#"{ "lanes": 3 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = EngineConfig::from_json_str(r#"{ "default_capacity": 0.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "default_capacity",
                ..
            }
        ));

        let err = EngineConfig::from_json_str(r#"{ "num_lanes": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "num_lanes", .. }));

        let err = EngineConfig::from_json_str(r#"{ "renumber_step": 1 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "renumber_step",
                ..
            }
        ));
    }

    #[test]
    fn test_from_path_reports_io_error() {
        let err = EngineConfig::from_path("/nonexistent/stowage.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_order_terms_validation() {
        let terms = OrderTerms {
            capacity: 13.6,
            price_per_place: -1.0,
            full_truck_price: 0.0,
        };
        assert!(terms.validate().is_err());
        assert!(OrderTerms::default().validate().is_ok());
    }
}

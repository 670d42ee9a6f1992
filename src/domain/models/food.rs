//! Food record model.

use serde::{Deserialize, Serialize};

/// A food row from the external relational store, read-only here.
///
/// `fdc_id` is the USDA FoodData Central identifier and doubles as the
/// key of the record's embedding slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodRecord {
    pub fdc_id: i64,
    pub description: String,
}

impl FoodRecord {
    pub fn new(fdc_id: i64, description: impl Into<String>) -> Self {
        Self {
            fdc_id,
            description: description.into(),
        }
    }
}

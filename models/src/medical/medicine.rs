// models/src/medical/medicine.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::inputs::NumericInput;

/// A catalog entry in the pharmacy inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub stock_quantity: u32,
    pub price_per_unit: f64,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Medicine {
    /// Catalog names are unique regardless of case.
    pub fn name_key(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

/// Validated stock and price changes. Absent fields leave the stored value alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MedicinePatch {
    pub stock_quantity: Option<u32>,
    pub price_per_unit: Option<f64>,
}

impl MedicinePatch {
    pub fn apply(&self, medicine: &mut Medicine) {
        if let Some(stock) = self.stock_quantity {
            medicine.stock_quantity = stock;
        }
        if let Some(price) = self.price_per_unit {
            medicine.price_per_unit = price;
        }
        medicine.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMedicine {
    pub name: Option<String>,
    pub category: Option<String>,
    pub stock_quantity: Option<NumericInput>,
    pub price_per_unit: Option<NumericInput>,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
}

/// Only stock and price are editable after creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicineUpdate {
    pub id: Option<String>,
    pub stock_quantity: Option<NumericInput>,
    pub price_per_unit: Option<NumericInput>,
}

/// Medicine as nested inside a prescription listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineSummary {
    pub name: String,
    pub category: String,
}

impl From<&Medicine> for MedicineSummary {
    fn from(medicine: &Medicine) -> Self {
        MedicineSummary {
            name: medicine.name.clone(),
            category: medicine.category.clone(),
        }
    }
}

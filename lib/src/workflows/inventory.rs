// lib/src/workflows/inventory.rs

use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use models::errors::HospitalResult;
use models::inputs::{
    optional_amount, optional_count, optional_text, required_amount, required_count, required_text,
    required_uuid,
};
use models::medical::{Medicine, MedicinePatch, MedicineUpdate, NewMedicine};

use crate::storage_engine::HospitalStore;

/// The pharmacy catalog.
pub struct InventoryWorkflow {
    store: Arc<dyn HospitalStore>,
}

impl InventoryWorkflow {
    pub fn new(store: Arc<dyn HospitalStore>) -> Self {
        InventoryWorkflow { store }
    }

    pub async fn create(&self, request: &NewMedicine) -> HospitalResult<Medicine> {
        let now = Utc::now();
        let medicine = Medicine {
            id: Uuid::new_v4(),
            name: required_text(&request.name, "name")?,
            category: required_text(&request.category, "category")?,
            stock_quantity: required_count(&request.stock_quantity, "stock_quantity")?,
            price_per_unit: required_amount(&request.price_per_unit, "price_per_unit")?,
            description: optional_text(&request.description),
            manufacturer: optional_text(&request.manufacturer),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_medicine(&medicine).await?;
        info!(medicine_id = %medicine.id, name = %medicine.name, "added medicine");
        Ok(medicine)
    }

    /// Stock and price are the only editable fields; absent ones are kept.
    pub async fn update(&self, request: &MedicineUpdate) -> HospitalResult<Medicine> {
        let id = required_uuid(&request.id, "id")?;
        let stock = optional_count(&request.stock_quantity, "stock_quantity")?;
        let price = optional_amount(&request.price_per_unit, "price_per_unit")?;

        let patch = MedicinePatch { stock_quantity: stock, price_per_unit: price };
        let medicine = self.store.patch_medicine(id, patch).await?;
        info!(medicine_id = %id, stock = medicine.stock_quantity, "updated medicine");
        Ok(medicine)
    }

    /// Hard delete; removing an absent id succeeds.
    pub async fn delete(&self, id: &str) -> HospitalResult<()> {
        let id = required_uuid(&Some(id.to_string()), "id")?;
        self.store.delete_medicine(id).await?;
        info!(medicine_id = %id, "deleted medicine");
        Ok(())
    }

    pub async fn list(&self) -> HospitalResult<Vec<Medicine>> {
        let mut medicines = self.store.list_medicines().await?;
        medicines.sort_by_cached_key(|m| Medicine::name_key(&m.name));
        Ok(medicines)
    }
}

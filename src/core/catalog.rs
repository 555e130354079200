//! Public catalog seeding
//!
//! Inserts the materials and work items configured in `config.toml` the first
//! time the server starts against a database. Completion is recorded in the
//! `system_state` table so later starts leave the catalog alone, even if
//! admins have since edited or deleted the seeded rows.

use crate::{
    config::CatalogConfig,
    entities::{SystemState, item, item_material, material, system_state},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*};
use std::collections::{HashMap, HashSet};

const CATALOG_SEEDED_KEY: &str = "catalog_seeded";

/// Counts of rows inserted by [`seed_catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedResult {
    /// Public materials inserted
    pub materials: usize,
    /// Work items inserted
    pub items: usize,
}

/// Returns true once the catalog has been seeded.
pub async fn is_catalog_seeded(db: &DatabaseConnection) -> Result<bool> {
    let state = SystemState::find()
        .filter(system_state::Column::Key.eq(CATALOG_SEEDED_KEY))
        .one(db)
        .await?;
    Ok(state.is_some())
}

fn config_error(message: String) -> Error {
    Error::Config { message }
}

/// Checks the seed before anything is written: names are unique, prices and
/// rates are non-negative, and every item component names a configured
/// material with a positive quantity.
fn validate_catalog(catalog: &CatalogConfig) -> Result<()> {
    let mut material_names = HashSet::new();
    for seed in &catalog.materials {
        if seed.name.trim().is_empty() || seed.unit.trim().is_empty() {
            return Err(config_error(
                "catalog materials need a name and a unit".to_string(),
            ));
        }
        if let Some(price) = seed.base_price.filter(|p| !p.is_finite() || *p < 0.0) {
            return Err(config_error(format!(
                "catalog material '{}' has an invalid base price {price}",
                seed.name
            )));
        }
        if !material_names.insert(seed.name.as_str()) {
            return Err(config_error(format!(
                "catalog material '{}' is listed twice",
                seed.name
            )));
        }
    }

    for seed in &catalog.items {
        if seed.name.trim().is_empty() || seed.unit.trim().is_empty() {
            return Err(config_error("catalog items need a name and a unit".to_string()));
        }
        if !seed.labor_rate.is_finite() || seed.labor_rate < 0.0 {
            return Err(config_error(format!(
                "catalog item '{}' has an invalid labor rate {}",
                seed.name, seed.labor_rate
            )));
        }
        for component in &seed.materials {
            if !material_names.contains(component.name.as_str()) {
                return Err(config_error(format!(
                    "catalog item '{}' uses unknown material '{}'",
                    seed.name, component.name
                )));
            }
            if !component.quantity_per_unit.is_finite() || component.quantity_per_unit <= 0.0 {
                return Err(config_error(format!(
                    "catalog item '{}' needs a positive quantity of '{}'",
                    seed.name, component.name
                )));
            }
        }
    }

    Ok(())
}

/// Seeds the public catalog once.
///
/// # Returns
/// * `Ok(Some(result))` - The catalog was inserted
/// * `Ok(None)` - A previous start already seeded it
pub async fn seed_catalog(
    db: &DatabaseConnection,
    catalog: &CatalogConfig,
) -> Result<Option<SeedResult>> {
    if is_catalog_seeded(db).await? {
        tracing::debug!("Catalog already seeded, skipping");
        return Ok(None);
    }
    validate_catalog(catalog)?;

    // All rows and the marker land together or not at all
    let txn = db.begin().await?;
    let now = Utc::now();

    let mut material_ids = HashMap::new();
    for seed in &catalog.materials {
        let material = material::ActiveModel {
            name: Set(seed.name.trim().to_string()),
            unit: Set(seed.unit.trim().to_string()),
            base_price: Set(seed.base_price),
            custom_price: Set(None),
            owner_id: Set(None),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        material_ids.insert(seed.name.as_str(), material.id);
    }

    for seed in &catalog.items {
        let item = item::ActiveModel {
            name: Set(seed.name.trim().to_string()),
            description: Set(seed.description.clone()),
            unit: Set(seed.unit.trim().to_string()),
            labor_rate: Set(seed.labor_rate),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for component in &seed.materials {
            let Some(&material_id) = material_ids.get(component.name.as_str()) else {
                continue;
            };
            item_material::ActiveModel {
                item_id: Set(item.id),
                material_id: Set(material_id),
                quantity_per_unit: Set(component.quantity_per_unit),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }

    system_state::ActiveModel {
        key: Set(CATALOG_SEEDED_KEY.to_string()),
        value: Set(now.format("%Y-%m-%d").to_string()),
        updated_at: Set(now.naive_utc()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    let result = SeedResult {
        materials: catalog.materials.len(),
        items: catalog.items.len(),
    };
    tracing::info!(
        materials = result.materials,
        items = result.items,
        "Seeded public catalog"
    );
    Ok(Some(result))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{cost, item as item_core};
    use crate::test_utils::*;

    fn sample_catalog() -> CatalogConfig {
        toml::from_str(
            r#"
            [[materials]]
            name = "Cemento"
            unit = "bolsa"
            base_price = 10.0

            [[materials]]
            name = "Arena"
            unit = "m3"
            base_price = 40.0

            [[items]]
            name = "Contrapiso"
            unit = "m2"
            labor_rate = 5.0
            materials = [
                { name = "Cemento", quantity_per_unit = 0.5 },
                { name = "Arena", quantity_per_unit = 0.1 },
            ]
            "#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_seed_catalog_once() -> Result<()> {
        let db = setup_test_db().await?;
        let catalog = sample_catalog();

        assert!(!is_catalog_seeded(&db).await?);
        let result = seed_catalog(&db, &catalog).await?.unwrap();
        assert_eq!(result, SeedResult { materials: 2, items: 1 });
        assert!(is_catalog_seeded(&db).await?);

        // A second start does nothing
        assert!(seed_catalog(&db, &catalog).await?.is_none());
        let items = item_core::list_items(&db).await?;
        assert_eq!(items.len(), 1);

        // 0.5 * 10 + 0.1 * 40 + 5 labor = 14 per m2
        let estimate = cost::estimate_item_cost(&db, items[0].id, 2.0).await?;
        assert_eq!(estimate.total, 28.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_rejects_unknown_material() -> Result<()> {
        let db = setup_test_db().await?;
        let mut catalog = sample_catalog();
        catalog.items[0].materials[0].name = "Ladrillo".to_string();

        let result = seed_catalog(&db, &catalog).await;
        assert!(matches!(result.unwrap_err(), Error::Config { .. }));
        assert!(!is_catalog_seeded(&db).await?);
        assert!(item_core::list_items(&db).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_empty_catalog_marks_seeded() -> Result<()> {
        let db = setup_test_db().await?;
        let result = seed_catalog(&db, &CatalogConfig::default()).await?.unwrap();
        assert_eq!(result, SeedResult { materials: 0, items: 0 });
        assert!(is_catalog_seeded(&db).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_shipped_config_seeds() -> Result<()> {
        let db = setup_test_db().await?;
        let config = crate::config::load_config(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml"))?;

        let result = seed_catalog(&db, &config.catalog).await?.unwrap();
        assert_eq!(result.materials, config.catalog.materials.len());
        assert_eq!(item_core::list_items(&db).await?.len(), config.catalog.items.len());
        Ok(())
    }
}

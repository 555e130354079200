//! Work item business logic - items and their material composition.

use crate::{
    entities::{Item, ItemMaterial, Material, item, item_material, material},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Fields accepted when creating an item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewItem {
    /// Item name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Unit the item is measured in
    pub unit: String,
    /// Labor cost per unit
    pub labor_rate: f64,
}

/// Fields accepted when updating an item; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemChanges {
    /// New name
    #[serde(default)]
    pub name: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New unit
    #[serde(default)]
    pub unit: Option<String>,
    /// New labor rate
    #[serde(default)]
    pub labor_rate: Option<f64>,
}

/// One material in an item's composition, with the material's name and unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemComponent {
    /// Material row id
    pub material_id: i64,
    /// Material name
    pub name: String,
    /// Material unit of measure
    pub unit: String,
    /// Material units per item unit
    pub quantity_per_unit: f64,
}

/// An item together with its composition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemDetail {
    /// The item row
    #[serde(flatten)]
    pub item: item::Model,
    /// Active materials the item consumes
    pub materials: Vec<ItemComponent>,
}

fn validate_labor_rate(labor_rate: f64) -> Result<f64> {
    if !labor_rate.is_finite() || labor_rate < 0.0 {
        return Err(Error::InvalidAmount { amount: labor_rate });
    }
    Ok(labor_rate)
}

/// Lists active items ordered by name.
pub async fn list_items(db: &DatabaseConnection) -> Result<Vec<item::Model>> {
    Item::find()
        .filter(item::Column::IsDeleted.eq(false))
        .order_by_asc(item::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fetches an active item by id.
pub async fn get_item<C>(db: &C, item_id: i64) -> Result<item::Model>
where
    C: ConnectionTrait,
{
    Item::find_by_id(item_id)
        .one(db)
        .await?
        .filter(|i| !i.is_deleted)
        .ok_or_else(|| Error::not_found("item", item_id))
}

/// Fetches an active item with its material composition.
pub async fn get_item_detail(db: &DatabaseConnection, item_id: i64) -> Result<ItemDetail> {
    let item = get_item(db, item_id).await?;

    let links = ItemMaterial::find()
        .filter(item_material::Column::ItemId.eq(item_id))
        .order_by_asc(item_material::Column::Id)
        .all(db)
        .await?;

    let materials: HashMap<i64, material::Model> = Material::find()
        .filter(material::Column::Id.is_in(links.iter().map(|l| l.material_id)))
        .filter(material::Column::IsDeleted.eq(false))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    let materials = links
        .into_iter()
        .filter_map(|link| {
            materials.get(&link.material_id).map(|m| ItemComponent {
                material_id: m.id,
                name: m.name.clone(),
                unit: m.unit.clone(),
                quantity_per_unit: link.quantity_per_unit,
            })
        })
        .collect();

    Ok(ItemDetail { item, materials })
}

/// Creates an item with no materials.
pub async fn create_item(db: &DatabaseConnection, input: NewItem) -> Result<item::Model> {
    if input.name.trim().is_empty() {
        return Err(Error::validation("Item name cannot be empty"));
    }
    if input.unit.trim().is_empty() {
        return Err(Error::validation("Item unit cannot be empty"));
    }
    let labor_rate = validate_labor_rate(input.labor_rate)?;

    let now = chrono::Utc::now();
    let item = item::ActiveModel {
        name: Set(input.name.trim().to_string()),
        description: Set(input.description),
        unit: Set(input.unit.trim().to_string()),
        labor_rate: Set(labor_rate),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    item.insert(db).await.map_err(Into::into)
}

/// Applies [`ItemChanges`] to an active item.
pub async fn update_item(
    db: &DatabaseConnection,
    item_id: i64,
    changes: ItemChanges,
) -> Result<item::Model> {
    let mut item: item::ActiveModel = get_item(db, item_id).await?.into();

    if let Some(name) = changes.name {
        if name.trim().is_empty() {
            return Err(Error::validation("Item name cannot be empty"));
        }
        item.name = Set(name.trim().to_string());
    }
    if let Some(description) = changes.description {
        item.description = Set(Some(description));
    }
    if let Some(unit) = changes.unit {
        if unit.trim().is_empty() {
            return Err(Error::validation("Item unit cannot be empty"));
        }
        item.unit = Set(unit.trim().to_string());
    }
    if let Some(labor_rate) = changes.labor_rate {
        item.labor_rate = Set(validate_labor_rate(labor_rate)?);
    }

    item.updated_at = Set(chrono::Utc::now());
    item.update(db).await.map_err(Into::into)
}

/// Soft deletes an item. Budget lines that already use it keep their snapshot.
pub async fn delete_item(db: &DatabaseConnection, item_id: i64) -> Result<item::Model> {
    let mut item: item::ActiveModel = get_item(db, item_id).await?.into();
    item.is_deleted = Set(true);
    item.updated_at = Set(chrono::Utc::now());
    item.update(db).await.map_err(Into::into)
}

/// Replaces an item's composition with `components` (`(material_id, quantity_per_unit)`).
///
/// Runs in a transaction: either every link is replaced or nothing changes.
/// Each material may appear once and must be active; quantities must be
/// finite and strictly positive.
pub async fn set_item_materials(
    db: &DatabaseConnection,
    item_id: i64,
    components: Vec<(i64, f64)>,
) -> Result<Vec<item_material::Model>> {
    let mut seen = HashSet::new();
    for &(material_id, quantity_per_unit) in &components {
        if !quantity_per_unit.is_finite() || quantity_per_unit <= 0.0 {
            return Err(Error::InvalidAmount {
                amount: quantity_per_unit,
            });
        }
        if !seen.insert(material_id) {
            return Err(Error::validation(format!(
                "material {material_id} listed more than once"
            )));
        }
    }

    let txn = db.begin().await?;

    get_item(&txn, item_id).await?;

    let active = Material::find()
        .filter(material::Column::Id.is_in(seen.iter().copied()))
        .filter(material::Column::IsDeleted.eq(false))
        .count(&txn)
        .await?;
    if usize::try_from(active).unwrap_or(usize::MAX) != seen.len() {
        return Err(Error::validation("every component must be an active material"));
    }

    ItemMaterial::delete_many()
        .filter(item_material::Column::ItemId.eq(item_id))
        .exec(&txn)
        .await?;

    let mut links = Vec::with_capacity(components.len());
    for (material_id, quantity_per_unit) in components {
        let link = item_material::ActiveModel {
            item_id: Set(item_id),
            material_id: Set(material_id),
            quantity_per_unit: Set(quantity_per_unit),
            ..Default::default()
        };
        links.push(link.insert(&txn).await?);
    }

    txn.commit().await?;
    tracing::debug!(item_id, components = links.len(), "replaced item composition");
    Ok(links)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_item_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_item(
            &db,
            NewItem {
                name: "Muro".to_string(),
                unit: String::new(),
                labor_rate: 1.0,
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = create_item(
            &db,
            NewItem {
                name: "Muro".to_string(),
                unit: "m2".to_string(),
                labor_rate: -5.0,
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: -5.0 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_item_materials_replaces_composition() -> Result<()> {
        let db = setup_test_db().await?;
        let item = create_test_item(&db, "Losa", 20.0).await?;
        let cement = create_test_material(&db, "Cemento", Some(9.0)).await?;
        let gravel = create_test_material(&db, "Ripio", Some(30.0)).await?;

        set_item_materials(&db, item.id, vec![(cement.id, 1.0)]).await?;
        set_item_materials(&db, item.id, vec![(cement.id, 0.35), (gravel.id, 0.1)]).await?;

        let detail = get_item_detail(&db, item.id).await?;
        assert_eq!(detail.materials.len(), 2);
        assert_eq!(detail.materials[0].name, "Cemento");
        assert_eq!(detail.materials[0].quantity_per_unit, 0.35);
        assert_eq!(detail.materials[1].unit, "u");

        Ok(())
    }

    #[tokio::test]
    async fn test_set_item_materials_rejects_bad_components() -> Result<()> {
        let db = setup_test_db().await?;
        let item = create_test_item(&db, "Losa", 20.0).await?;
        let cement = create_test_material(&db, "Cemento", Some(9.0)).await?;

        let result = set_item_materials(&db, item.id, vec![(cement.id, 1.0), (cement.id, 2.0)]).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = set_item_materials(&db, item.id, vec![(cement.id, 0.0)]).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        let result = set_item_materials(&db, item.id, vec![(777, 1.0)]).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Failed replacements leave the composition untouched
        set_item_materials(&db, item.id, vec![(cement.id, 1.0)]).await?;
        let _ = set_item_materials(&db, item.id, vec![(cement.id, 1.0), (777, 1.0)]).await;
        assert_eq!(get_item_detail(&db, item.id).await?.materials.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_item() -> Result<()> {
        let db = setup_test_db().await?;
        let item = create_test_item(&db, "Pintura", 3.0).await?;

        let updated = update_item(
            &db,
            item.id,
            ItemChanges {
                labor_rate: Some(4.5),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.labor_rate, 4.5);
        assert_eq!(updated.name, "Pintura");

        delete_item(&db, item.id).await?;
        assert!(list_items(&db).await?.is_empty());
        assert!(matches!(
            get_item(&db, item.id).await.unwrap_err(),
            Error::NotFound { .. }
        ));

        Ok(())
    }
}

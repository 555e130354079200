//! Material catalog business logic.
//!
//! The catalog mixes public entries (`owner_id = None`, maintained by admins)
//! with supplier-owned entries. Suppliers see the public catalog plus their
//! own materials; everyone else sees the public catalog only.

use crate::{
    core::access::Actor,
    entities::{Material, material},
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use serde::Deserialize;

/// Fields accepted when creating a material.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewMaterial {
    /// Material name
    pub name: String,
    /// Unit of measure
    pub unit: String,
    /// Reference price per unit
    #[serde(default)]
    pub base_price: Option<f64>,
    /// Manually set price per unit
    #[serde(default)]
    pub custom_price: Option<f64>,
}

/// Fields accepted when updating a material; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialChanges {
    /// New name
    #[serde(default)]
    pub name: Option<String>,
    /// New unit of measure
    #[serde(default)]
    pub unit: Option<String>,
    /// New reference price
    #[serde(default)]
    pub base_price: Option<f64>,
    /// New custom price
    #[serde(default)]
    pub custom_price: Option<f64>,
}

fn validate_price(price: Option<f64>) -> Result<()> {
    match price {
        Some(amount) if !amount.is_finite() || amount < 0.0 => {
            Err(Error::InvalidAmount { amount })
        }
        _ => Ok(()),
    }
}

/// Lists the active materials `actor` can see, ordered by name.
pub async fn list_visible_materials(
    db: &DatabaseConnection,
    actor: &Actor,
) -> Result<Vec<material::Model>> {
    let mut query = Material::find().filter(material::Column::IsDeleted.eq(false));

    if !actor.is_admin() {
        let mut visibility = Condition::any().add(material::Column::OwnerId.is_null());
        if actor.role.is_supplier() {
            visibility = visibility.add(material::Column::OwnerId.eq(actor.user_id));
        }
        query = query.filter(visibility);
    }

    query
        .order_by_asc(material::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fetches an active material by id.
pub async fn get_material(db: &DatabaseConnection, material_id: i64) -> Result<material::Model> {
    Material::find_by_id(material_id)
        .one(db)
        .await?
        .filter(|m| !m.is_deleted)
        .ok_or_else(|| Error::not_found("material", material_id))
}

/// Creates a material. `owner_id = None` puts it in the public catalog.
pub async fn create_material(
    db: &DatabaseConnection,
    input: NewMaterial,
    owner_id: Option<i64>,
) -> Result<material::Model> {
    if input.name.trim().is_empty() {
        return Err(Error::validation("Material name cannot be empty"));
    }
    if input.unit.trim().is_empty() {
        return Err(Error::validation("Material unit cannot be empty"));
    }
    validate_price(input.base_price)?;
    validate_price(input.custom_price)?;

    let now = chrono::Utc::now();
    let material = material::ActiveModel {
        name: Set(input.name.trim().to_string()),
        unit: Set(input.unit.trim().to_string()),
        base_price: Set(input.base_price),
        custom_price: Set(input.custom_price),
        owner_id: Set(owner_id),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let material = material.insert(db).await?;
    tracing::debug!(material_id = material.id, ?owner_id, "created material");
    Ok(material)
}

/// Applies [`MaterialChanges`] to an active material.
pub async fn update_material(
    db: &DatabaseConnection,
    material_id: i64,
    changes: MaterialChanges,
) -> Result<material::Model> {
    let mut material: material::ActiveModel = get_material(db, material_id).await?.into();

    if let Some(name) = changes.name {
        if name.trim().is_empty() {
            return Err(Error::validation("Material name cannot be empty"));
        }
        material.name = Set(name.trim().to_string());
    }
    if let Some(unit) = changes.unit {
        if unit.trim().is_empty() {
            return Err(Error::validation("Material unit cannot be empty"));
        }
        material.unit = Set(unit.trim().to_string());
    }
    if changes.base_price.is_some() {
        validate_price(changes.base_price)?;
        material.base_price = Set(changes.base_price);
    }
    if changes.custom_price.is_some() {
        validate_price(changes.custom_price)?;
        material.custom_price = Set(changes.custom_price);
    }

    material.updated_at = Set(chrono::Utc::now());
    material.update(db).await.map_err(Into::into)
}

/// Soft deletes a material; cost estimates stop including it.
pub async fn delete_material(db: &DatabaseConnection, material_id: i64) -> Result<material::Model> {
    let mut material: material::ActiveModel = get_material(db, material_id).await?.into();
    material.is_deleted = Set(true);
    material.updated_at = Set(chrono::Utc::now());
    material.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::Role;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_material_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_material(
            &db,
            NewMaterial {
                name: " ".to_string(),
                unit: "kg".to_string(),
                ..Default::default()
            },
            None,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = create_material(
            &db,
            NewMaterial {
                name: "Hierro".to_string(),
                unit: "kg".to_string(),
                custom_price: Some(f64::INFINITY),
                ..Default::default()
            },
            None,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_catalog_visibility() -> Result<()> {
        let db = setup_test_db().await?;
        let supplier = create_test_user(&db, "p1@example.com", Role::ProveedorMateriales).await?;
        let rival = create_test_user(&db, "p2@example.com", Role::ProveedorMateriales).await?;

        create_test_material(&db, "Cemento", Some(9.0)).await?;
        let own = create_material(
            &db,
            NewMaterial {
                name: "Arena fina".to_string(),
                unit: "m3".to_string(),
                ..Default::default()
            },
            Some(supplier.id),
        )
        .await?;
        create_material(
            &db,
            NewMaterial {
                name: "Arena gruesa".to_string(),
                unit: "m3".to_string(),
                ..Default::default()
            },
            Some(rival.id),
        )
        .await?;

        let supplier_view =
            list_visible_materials(&db, &Actor::new(supplier.id, supplier.role)).await?;
        assert_eq!(supplier_view.len(), 2);
        assert!(supplier_view.iter().any(|m| m.id == own.id));

        let client_view = list_visible_materials(&db, &Actor::new(42, Role::Cliente)).await?;
        assert_eq!(client_view.len(), 1);
        assert!(client_view[0].owner_id.is_none());

        let admin_view = list_visible_materials(&db, &Actor::new(0, Role::Admin)).await?;
        assert_eq!(admin_view.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_material() -> Result<()> {
        let db = setup_test_db().await?;
        let material = create_test_material(&db, "Cal", Some(3.0)).await?;

        let updated = update_material(
            &db,
            material.id,
            MaterialChanges {
                custom_price: Some(4.5),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.base_price, Some(3.0));
        assert_eq!(updated.custom_price, Some(4.5));

        delete_material(&db, material.id).await?;
        assert!(matches!(
            get_material(&db, material.id).await.unwrap_err(),
            Error::NotFound { .. }
        ));

        Ok(())
    }
}

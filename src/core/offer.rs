//! Supplier offers on catalog materials.

use crate::{
    entities::{Offer, offer},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

fn validate_offer_price(price: f64) -> Result<f64> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidAmount { amount: price });
    }
    Ok(price)
}

/// Lists offers for a material, cheapest first.
pub async fn list_offers_for_material(
    db: &DatabaseConnection,
    material_id: i64,
) -> Result<Vec<offer::Model>> {
    Offer::find()
        .filter(offer::Column::MaterialId.eq(material_id))
        .order_by_asc(offer::Column::Price)
        .order_by_asc(offer::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fetches an offer by id.
pub async fn get_offer(db: &DatabaseConnection, offer_id: i64) -> Result<offer::Model> {
    Offer::find_by_id(offer_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("offer", offer_id))
}

/// Publishes an offer for an active material.
pub async fn create_offer(
    db: &DatabaseConnection,
    supplier_id: i64,
    material_id: i64,
    price: f64,
    in_stock: bool,
) -> Result<offer::Model> {
    let price = validate_offer_price(price)?;
    crate::core::material::get_material(db, material_id).await?;

    let now = chrono::Utc::now();
    let offer = offer::ActiveModel {
        material_id: Set(material_id),
        supplier_id: Set(supplier_id),
        price: Set(price),
        in_stock: Set(in_stock),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let offer = offer.insert(db).await?;
    tracing::debug!(offer_id = offer.id, material_id, supplier_id, "published offer");
    Ok(offer)
}

/// Updates the price and/or stock flag of an offer.
pub async fn update_offer(
    db: &DatabaseConnection,
    offer_id: i64,
    price: Option<f64>,
    in_stock: Option<bool>,
) -> Result<offer::Model> {
    let mut offer: offer::ActiveModel = get_offer(db, offer_id).await?.into();

    if let Some(price) = price {
        offer.price = Set(validate_offer_price(price)?);
    }
    if let Some(in_stock) = in_stock {
        offer.in_stock = Set(in_stock);
    }

    offer.updated_at = Set(chrono::Utc::now());
    offer.update(db).await.map_err(Into::into)
}

/// Removes an offer.
pub async fn delete_offer(db: &DatabaseConnection, offer_id: i64) -> Result<()> {
    let result = Offer::delete_by_id(offer_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("offer", offer_id));
    }
    Ok(())
}

//! Cost aggregation for work items.
//!
//! Every cost shown or stored by the API comes from [`compute_cost`]: the item
//! cost-estimate endpoint, adding an item to a project budget, refreshing a
//! budget line and the live budget line detail all go through
//! [`estimate_item_cost`].
//!
//! Unit price resolution per material, first match wins:
//! 1. the cheapest offer that is in stock
//! 2. the material's base price
//! 3. the material's manually set (custom) price
//! 4. otherwise the material is unpriced and contributes 0
//!
//! ```text
//! total = Σ(unit_price × quantity_per_unit) × quantity + labor_rate × quantity
//! ```

use crate::{
    entities::{Item, ItemMaterial, Material, Offer, item, item_material, material, offer},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, prelude::*};
use serde::Serialize;
use std::collections::HashMap;

/// A supplier offer as seen by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OfferQuote {
    /// Offer row id
    pub offer_id: i64,
    /// Price per material unit
    pub price: f64,
    /// Whether the supplier currently has stock
    pub in_stock: bool,
}

/// Everything needed to price one material of an item.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialPricing {
    /// Material row id
    pub material_id: i64,
    /// Material name, carried into the breakdown
    pub name: String,
    /// Material units consumed per item unit
    pub quantity_per_unit: f64,
    /// Reference price per unit
    pub base_price: Option<f64>,
    /// Manually set price per unit
    pub custom_price: Option<f64>,
    /// Offers for this material, in any stock state
    pub offers: Vec<OfferQuote>,
}

/// Where a material's unit price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// Cheapest in-stock offer
    Offer,
    /// Material base price
    BasePrice,
    /// Material custom price
    CustomPrice,
    /// No usable price
    Unpriced,
}

/// Result of resolving a single material's unit price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedPrice {
    /// Price per material unit (0 when unpriced)
    pub unit_price: f64,
    /// Which fallback produced the price
    pub source: PriceSource,
    /// Selected offer when `source` is [`PriceSource::Offer`]
    pub offer_id: Option<i64>,
}

/// Cost contribution of one material.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialCostLine {
    /// Material row id
    pub material_id: i64,
    /// Material name
    pub name: String,
    /// Material units per item unit
    pub quantity_per_unit: f64,
    /// Resolved price per material unit
    pub unit_price: f64,
    /// Which fallback produced the price
    pub source: PriceSource,
    /// Selected offer, if any
    pub offer_id: Option<i64>,
    /// `unit_price × quantity_per_unit`
    pub cost_per_unit: f64,
    /// `cost_per_unit × quantity`
    pub subtotal: f64,
}

/// Full cost of `quantity` units of an item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    /// Item units priced
    pub quantity: f64,
    /// Labor cost per item unit
    pub labor_rate: f64,
    /// One line per material
    pub lines: Vec<MaterialCostLine>,
    /// Materials cost of a single item unit
    pub materials_unit_cost: f64,
    /// `materials_unit_cost × quantity`
    pub materials_cost: f64,
    /// `labor_rate × quantity`
    pub labor_cost: f64,
    /// `materials_cost + labor_cost`
    pub total: f64,
    /// Number of materials that had no usable price
    pub unpriced_materials: usize,
}

/// Picks the unit price for a material using the offer → base → custom fallback.
///
/// Offers that are out of stock or carry a non-finite price are ignored.
/// On equal prices the first offer wins.
#[must_use]
pub fn resolve_unit_price(pricing: &MaterialPricing) -> ResolvedPrice {
    let cheapest = pricing
        .offers
        .iter()
        .filter(|quote| quote.in_stock && quote.price.is_finite() && quote.price >= 0.0)
        .fold(None::<&OfferQuote>, |best, quote| match best {
            Some(current) if current.price <= quote.price => Some(current),
            _ => Some(quote),
        });

    if let Some(quote) = cheapest {
        return ResolvedPrice {
            unit_price: quote.price,
            source: PriceSource::Offer,
            offer_id: Some(quote.offer_id),
        };
    }

    let usable = |price: Option<f64>| price.filter(|p| p.is_finite() && *p >= 0.0);

    if let Some(price) = usable(pricing.base_price) {
        return ResolvedPrice {
            unit_price: price,
            source: PriceSource::BasePrice,
            offer_id: None,
        };
    }

    if let Some(price) = usable(pricing.custom_price) {
        return ResolvedPrice {
            unit_price: price,
            source: PriceSource::CustomPrice,
            offer_id: None,
        };
    }

    ResolvedPrice {
        unit_price: 0.0,
        source: PriceSource::Unpriced,
        offer_id: None,
    }
}

/// Validates that a line quantity is a finite, strictly positive number.
pub fn validate_quantity(quantity: f64) -> Result<f64> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(Error::InvalidAmount { amount: quantity });
    }
    Ok(quantity)
}

/// Aggregates materials and labor into a [`CostBreakdown`].
///
/// # Errors
/// Returns [`Error::InvalidAmount`] if `quantity` is not strictly positive, or if
/// `labor_rate` or any `quantity_per_unit` is negative or not finite.
pub fn compute_cost(
    materials: &[MaterialPricing],
    labor_rate: f64,
    quantity: f64,
) -> Result<CostBreakdown> {
    let quantity = validate_quantity(quantity)?;

    if !labor_rate.is_finite() || labor_rate < 0.0 {
        return Err(Error::InvalidAmount { amount: labor_rate });
    }

    let mut lines = Vec::with_capacity(materials.len());
    let mut materials_unit_cost = 0.0;
    let mut unpriced_materials = 0;

    for pricing in materials {
        if !pricing.quantity_per_unit.is_finite() || pricing.quantity_per_unit < 0.0 {
            return Err(Error::InvalidAmount {
                amount: pricing.quantity_per_unit,
            });
        }

        let resolved = resolve_unit_price(pricing);
        if resolved.source == PriceSource::Unpriced {
            unpriced_materials += 1;
        }

        let cost_per_unit = resolved.unit_price * pricing.quantity_per_unit;
        materials_unit_cost += cost_per_unit;

        lines.push(MaterialCostLine {
            material_id: pricing.material_id,
            name: pricing.name.clone(),
            quantity_per_unit: pricing.quantity_per_unit,
            unit_price: resolved.unit_price,
            source: resolved.source,
            offer_id: resolved.offer_id,
            cost_per_unit,
            subtotal: cost_per_unit * quantity,
        });
    }

    let materials_cost = materials_unit_cost * quantity;
    let labor_cost = labor_rate * quantity;

    Ok(CostBreakdown {
        quantity,
        labor_rate,
        lines,
        materials_unit_cost,
        materials_cost,
        labor_cost,
        total: materials_cost + labor_cost,
        unpriced_materials,
    })
}

/// Loads an active item together with the pricing inputs of its materials.
///
/// Soft-deleted materials are left out of the composition.
pub async fn load_item_pricing<C>(
    db: &C,
    item_id: i64,
) -> Result<(item::Model, Vec<MaterialPricing>)>
where
    C: ConnectionTrait,
{
    let item = Item::find_by_id(item_id)
        .one(db)
        .await?
        .filter(|item| !item.is_deleted)
        .ok_or_else(|| Error::not_found("item", item_id))?;

    let links = ItemMaterial::find()
        .filter(item_material::Column::ItemId.eq(item_id))
        .order_by_asc(item_material::Column::Id)
        .all(db)
        .await?;

    if links.is_empty() {
        return Ok((item, Vec::new()));
    }

    let material_ids: Vec<i64> = links.iter().map(|link| link.material_id).collect();

    let materials: HashMap<i64, material::Model> = Material::find()
        .filter(material::Column::Id.is_in(material_ids.clone()))
        .filter(material::Column::IsDeleted.eq(false))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    let mut offers_by_material: HashMap<i64, Vec<OfferQuote>> = HashMap::new();
    for o in Offer::find()
        .filter(offer::Column::MaterialId.is_in(material_ids))
        .order_by_asc(offer::Column::Id)
        .all(db)
        .await?
    {
        offers_by_material
            .entry(o.material_id)
            .or_default()
            .push(OfferQuote {
                offer_id: o.id,
                price: o.price,
                in_stock: o.in_stock,
            });
    }

    let pricing = links
        .into_iter()
        .filter_map(|link| {
            let m = materials.get(&link.material_id)?;
            Some(MaterialPricing {
                material_id: m.id,
                name: m.name.clone(),
                quantity_per_unit: link.quantity_per_unit,
                base_price: m.base_price,
                custom_price: m.custom_price,
                offers: offers_by_material.get(&m.id).cloned().unwrap_or_default(),
            })
        })
        .collect();

    Ok((item, pricing))
}

/// Estimates the cost of `quantity` units of an item from current prices.
pub async fn estimate_item_cost<C>(db: &C, item_id: i64, quantity: f64) -> Result<CostBreakdown>
where
    C: ConnectionTrait,
{
    let quantity = validate_quantity(quantity)?;
    let (item, pricing) = load_item_pricing(db, item_id).await?;
    compute_cost(&pricing, item.labor_rate, quantity)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{item as item_core, offer as offer_core};
    use crate::entities::Role;
    use crate::test_utils::*;

    fn quote(offer_id: i64, price: f64, in_stock: bool) -> OfferQuote {
        OfferQuote {
            offer_id,
            price,
            in_stock,
        }
    }

    fn pricing(quantity_per_unit: f64) -> MaterialPricing {
        MaterialPricing {
            material_id: 1,
            name: "Cemento".to_string(),
            quantity_per_unit,
            base_price: None,
            custom_price: None,
            offers: Vec::new(),
        }
    }

    #[test]
    fn test_cheapest_in_stock_offer_wins() {
        let mut p = pricing(1.0);
        p.base_price = Some(5.0);
        p.offers = vec![quote(1, 12.0, true), quote(2, 3.0, false), quote(3, 8.0, true)];

        let resolved = resolve_unit_price(&p);
        assert_eq!(resolved.unit_price, 8.0);
        assert_eq!(resolved.source, PriceSource::Offer);
        assert_eq!(resolved.offer_id, Some(3));
    }

    #[test]
    fn test_tied_offers_pick_first() {
        let mut p = pricing(1.0);
        p.offers = vec![quote(7, 4.0, true), quote(8, 4.0, true)];
        assert_eq!(resolve_unit_price(&p).offer_id, Some(7));
    }

    #[test]
    fn test_fallback_to_base_then_custom() {
        let mut p = pricing(1.0);
        p.offers = vec![quote(1, 2.0, false)];
        p.base_price = Some(6.0);
        p.custom_price = Some(9.0);
        let resolved = resolve_unit_price(&p);
        assert_eq!(resolved.source, PriceSource::BasePrice);
        assert_eq!(resolved.unit_price, 6.0);

        p.base_price = None;
        let resolved = resolve_unit_price(&p);
        assert_eq!(resolved.source, PriceSource::CustomPrice);
        assert_eq!(resolved.unit_price, 9.0);

        p.custom_price = None;
        let resolved = resolve_unit_price(&p);
        assert_eq!(resolved.source, PriceSource::Unpriced);
        assert_eq!(resolved.unit_price, 0.0);
    }

    #[test]
    fn test_compute_cost_formula() {
        let mut cement = pricing(0.5);
        cement.base_price = Some(10.0);
        let mut sand = pricing(2.0);
        sand.material_id = 2;
        sand.name = "Arena".to_string();
        sand.offers = vec![quote(4, 1.5, true)];

        let breakdown = compute_cost(&[cement, sand], 7.0, 4.0).unwrap();

        // (0.5 × 10 + 2 × 1.5) × 4 = 32, labor 7 × 4 = 28
        assert_eq!(breakdown.materials_unit_cost, 8.0);
        assert_eq!(breakdown.materials_cost, 32.0);
        assert_eq!(breakdown.labor_cost, 28.0);
        assert_eq!(breakdown.total, 60.0);
        assert_eq!(breakdown.lines[0].subtotal, 20.0);
        assert_eq!(breakdown.lines[1].subtotal, 12.0);
        assert_eq!(breakdown.unpriced_materials, 0);
    }

    #[test]
    fn test_compute_cost_labor_only_and_unpriced() {
        let breakdown = compute_cost(&[pricing(3.0)], 2.5, 2.0).unwrap();
        assert_eq!(breakdown.materials_cost, 0.0);
        assert_eq!(breakdown.total, 5.0);
        assert_eq!(breakdown.unpriced_materials, 1);

        let breakdown = compute_cost(&[], 2.5, 2.0).unwrap();
        assert!(breakdown.lines.is_empty());
        assert_eq!(breakdown.total, 5.0);
    }

    #[test]
    fn test_compute_cost_validation() {
        assert!(matches!(
            compute_cost(&[], 1.0, 0.0),
            Err(Error::InvalidAmount { amount: 0.0 })
        ));
        assert!(matches!(
            compute_cost(&[], 1.0, f64::NAN),
            Err(Error::InvalidAmount { .. })
        ));
        assert!(matches!(
            compute_cost(&[], -1.0, 1.0),
            Err(Error::InvalidAmount { amount: -1.0 })
        ));
        assert!(matches!(
            compute_cost(&[pricing(-2.0)], 1.0, 1.0),
            Err(Error::InvalidAmount { amount: -2.0 })
        ));
    }

    #[tokio::test]
    async fn test_estimate_item_cost_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let supplier =
            create_test_user(&db, "prov@example.com", Role::ProveedorMateriales).await?;

        let brick = create_test_material(&db, "Ladrillo", Some(0.5)).await?;
        let mortar = create_test_material(&db, "Mortero", None).await?;
        let item = create_test_item(&db, "Muro", 10.0).await?;
        item_core::set_item_materials(&db, item.id, vec![(brick.id, 60.0), (mortar.id, 0.02)])
            .await?;

        offer_core::create_offer(&db, supplier.id, brick.id, 0.4, true).await?;
        offer_core::create_offer(&db, supplier.id, mortar.id, 50.0, true).await?;
        offer_core::create_offer(&db, supplier.id, mortar.id, 40.0, false).await?;

        let breakdown = estimate_item_cost(&db, item.id, 3.0).await?;

        // brick 0.4 × 60 = 24, mortar 50 × 0.02 = 1 → 25 per m2
        assert!((breakdown.materials_unit_cost - 25.0).abs() < 1e-9);
        assert!((breakdown.materials_cost - 75.0).abs() < 1e-9);
        assert_eq!(breakdown.labor_cost, 30.0);
        assert!((breakdown.total - 105.0).abs() < 1e-9);
        assert_eq!(breakdown.lines[0].source, PriceSource::Offer);

        Ok(())
    }

    #[tokio::test]
    async fn test_estimate_skips_deleted_materials() -> Result<()> {
        let db = setup_test_db().await?;
        let kept = create_test_material(&db, "Arena", Some(2.0)).await?;
        let dropped = create_test_material(&db, "Cal", Some(100.0)).await?;
        let item = create_test_item(&db, "Revoque", 1.0).await?;
        item_core::set_item_materials(&db, item.id, vec![(kept.id, 1.0), (dropped.id, 1.0)])
            .await?;

        crate::core::material::delete_material(&db, dropped.id).await?;

        let breakdown = estimate_item_cost(&db, item.id, 1.0).await?;
        assert_eq!(breakdown.lines.len(), 1);
        assert_eq!(breakdown.total, 3.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_estimate_missing_item() -> Result<()> {
        let db = setup_test_db().await?;
        let result = estimate_item_cost(&db, 404, 1.0).await;
        assert!(matches!(result, Err(Error::NotFound { entity: "item", .. })));
        Ok(())
    }
}

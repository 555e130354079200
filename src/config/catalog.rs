//! Public catalog configuration loaded from config.toml
//!
//! The `[[catalog.materials]]` and `[[catalog.items]]` tables describe the
//! public materials and work items inserted on first start. Items reference
//! materials by name.

use serde::Deserialize;

/// The `[catalog]` section of config.toml
#[derive(Debug, Default, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Public materials to seed
    #[serde(default)]
    pub materials: Vec<MaterialSeed>,
    /// Work items to seed
    #[serde(default)]
    pub items: Vec<ItemSeed>,
}

/// Configuration for a single public material
#[derive(Debug, Deserialize, Clone)]
pub struct MaterialSeed {
    /// Name of the material, also used by item seeds to reference it
    pub name: String,
    /// Unit of measure
    pub unit: String,
    /// Reference price per unit
    #[serde(default)]
    pub base_price: Option<f64>,
}

/// Configuration for a single work item
#[derive(Debug, Deserialize, Clone)]
pub struct ItemSeed {
    /// Name of the item
    pub name: String,
    /// Unit the item is measured in
    pub unit: String,
    /// Labor cost per item unit
    pub labor_rate: f64,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Material composition
    #[serde(default)]
    pub materials: Vec<ItemMaterialSeed>,
}

/// One material in an item seed's composition
#[derive(Debug, Deserialize, Clone)]
pub struct ItemMaterialSeed {
    /// Name of a material from `catalog.materials`
    pub name: String,
    /// Material units per item unit
    pub quantity_per_unit: f64,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_catalog_config() {
        let toml_str = r#"
            [[materials]]
            name = "Cemento"
            unit = "bolsa"
            base_price = 9.5

            [[materials]]
            name = "Arena"
            unit = "m3"

            [[items]]
            name = "Contrapiso"
            unit = "m2"
            labor_rate = 4.0
            materials = [
                { name = "Cemento", quantity_per_unit = 0.3 },
                { name = "Arena", quantity_per_unit = 0.05 },
            ]
        "#;

        let catalog: CatalogConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(catalog.materials.len(), 2);
        assert_eq!(catalog.materials[0].base_price, Some(9.5));
        assert!(catalog.materials[1].base_price.is_none());

        assert_eq!(catalog.items.len(), 1);
        assert_eq!(catalog.items[0].labor_rate, 4.0);
        assert_eq!(catalog.items[0].materials[1].name, "Arena");
        assert!(catalog.items[0].description.is_none());
    }
}

//! String-backed enums shared by several entities.
//!
//! Stored as their wire value so the database, the JSON API and JWT claims all
//! use the same spelling (`"PROVEEDOR_MATERIALES"`, `"EN_PROGRESO"`, ...).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role carried by every user and by their access token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full access to every resource
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    /// Project owner; records payments on their projects
    #[sea_orm(string_value = "CLIENTE")]
    Cliente,
    /// Builds projects; manages budgets and stages of assigned projects
    #[sea_orm(string_value = "CONSTRUCTOR")]
    Constructor,
    /// Supplier of materials; owns catalog entries and offers
    #[sea_orm(string_value = "PROVEEDOR_MATERIALES")]
    ProveedorMateriales,
    /// Supplier of services; owns catalog entries and offers
    #[sea_orm(string_value = "PROVEEDOR_SERVICIOS")]
    ProveedorServicios,
}

impl Role {
    /// Whether this role belongs to the `PROVEEDOR_*` family.
    #[must_use]
    pub const fn is_supplier(self) -> bool {
        matches!(self, Self::ProveedorMateriales | Self::ProveedorServicios)
    }
}

/// Lifecycle of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    /// Being planned and budgeted
    #[sea_orm(string_value = "PLANIFICACION")]
    Planificacion,
    /// Under construction
    #[sea_orm(string_value = "EN_PROGRESO")]
    EnProgreso,
    /// Construction finished; eligible for a listing
    #[sea_orm(string_value = "FINALIZADO")]
    Finalizado,
    /// Abandoned
    #[sea_orm(string_value = "CANCELADO")]
    Cancelado,
}

/// Review status of a single payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Recorded, not yet reviewed
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Confirmed in full
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    /// Confirmed as a partial payment
    #[sea_orm(string_value = "PARTIAL")]
    Partial,
    /// Refused; never counts towards any total
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

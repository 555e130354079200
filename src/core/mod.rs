//! Core business logic, independent of the HTTP layer.
//!
//! Every operation takes a SeaORM connection and returns [`crate::errors::Result`].
//! Role checks live in [`access`] and are applied by the callers.

pub mod access;
pub mod budget;
pub mod catalog;
pub mod cost;
pub mod item;
pub mod listing;
pub mod material;
pub mod offer;
pub mod payment;
pub mod project;
pub mod stage;
pub mod user;

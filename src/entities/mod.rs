//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod budget_line;
pub mod enums;
pub mod item;
pub mod item_material;
pub mod listing;
pub mod material;
pub mod offer;
pub mod payment;
pub mod project;
pub mod stage;
pub mod system_state;
pub mod user;

// Re-export specific types to avoid conflicts
pub use budget_line::{Entity as BudgetLine, Model as BudgetLineModel};
pub use enums::{PaymentStatus, ProjectStatus, Role};
pub use item::{Entity as Item, Model as ItemModel};
pub use item_material::{Entity as ItemMaterial, Model as ItemMaterialModel};
pub use listing::{Entity as Listing, Model as ListingModel};
pub use material::{Entity as Material, Model as MaterialModel};
pub use offer::{Entity as Offer, Model as OfferModel};
pub use payment::{Entity as Payment, Model as PaymentModel};
pub use project::{Entity as Project, Model as ProjectModel};
pub use stage::{Entity as Stage, Model as StageModel};
pub use system_state::{Entity as SystemState, Model as SystemStateModel};
pub use user::{Entity as User, Model as UserModel};

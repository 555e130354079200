//! Role and ownership checks.
//!
//! Every HTTP handler turns the authenticated token into an [`Actor`] and asks
//! it before touching a resource. Admins pass every check; other roles are
//! limited to the projects and catalog entries they are attached to.

use crate::{
    core::project::ProjectChanges,
    entities::{Role, material, project},
    errors::{Error, Result},
};
use serde::Serialize;

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Actor {
    /// User id from the token subject
    pub user_id: i64,
    /// Role as currently stored for the user
    pub role: Role,
}

impl Actor {
    /// Creates an actor for a user id and role.
    #[must_use]
    pub const fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Whether the actor is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails unless the actor holds one of `allowed`.
    pub fn require_role(&self, allowed: &[Role]) -> Result<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(Error::forbidden(format!(
                "role {:?} is not allowed to perform this action",
                self.role
            )))
        }
    }

    /// Fails unless the actor is an administrator.
    pub fn require_admin(&self) -> Result<()> {
        self.require_role(&[Role::Admin])
    }

    fn is_client_of(&self, project: &project::Model) -> bool {
        project.client_id == Some(self.user_id)
    }

    fn is_constructor_of(&self, project: &project::Model) -> bool {
        project.constructor_id == Some(self.user_id)
    }

    /// Admins see everything; clients and constructors see projects they are attached to.
    #[must_use]
    pub fn can_view_project(&self, project: &project::Model) -> bool {
        self.is_admin() || self.is_client_of(project) || self.is_constructor_of(project)
    }

    /// Fails unless [`Actor::can_view_project`].
    pub fn ensure_can_view_project(&self, project: &project::Model) -> Result<()> {
        if self.can_view_project(project) {
            Ok(())
        } else {
            Err(Error::forbidden("not a participant of this project"))
        }
    }

    /// Budget, stages and listing are managed by admins and the assigned constructor.
    pub fn ensure_can_manage_project(&self, project: &project::Model) -> Result<()> {
        if self.is_admin() || self.is_constructor_of(project) {
            Ok(())
        } else {
            Err(Error::forbidden("only the project constructor can manage it"))
        }
    }

    /// Name, description and address may also be edited by the project's
    /// client. The contract total and the constructor are left to managers.
    pub fn ensure_can_edit_project(
        &self,
        project: &project::Model,
        changes: &ProjectChanges,
    ) -> Result<()> {
        if changes.touches_contract() {
            return self.ensure_can_manage_project(project);
        }
        if self.is_admin() || self.is_client_of(project) || self.is_constructor_of(project) {
            Ok(())
        } else {
            Err(Error::forbidden("not a participant of this project"))
        }
    }

    /// Payments are recorded by admins and the project's client.
    pub fn ensure_can_record_payment(&self, project: &project::Model) -> Result<()> {
        if self.is_admin() || self.is_client_of(project) {
            Ok(())
        } else {
            Err(Error::forbidden("only the project client can record payments"))
        }
    }

    /// Payments are reviewed by admins and the project's constructor.
    pub fn ensure_can_review_payment(&self, project: &project::Model) -> Result<()> {
        if self.is_admin() || self.is_constructor_of(project) {
            Ok(())
        } else {
            Err(Error::forbidden("only the project constructor can review payments"))
        }
    }

    /// Public materials are managed by admins; owned materials by their supplier.
    pub fn ensure_can_manage_material(&self, material: &material::Model) -> Result<()> {
        if self.is_admin() || material.owner_id == Some(self.user_id) {
            Ok(())
        } else {
            Err(Error::forbidden("material belongs to another owner"))
        }
    }

    /// Work items are maintained by admins and constructors.
    pub fn ensure_can_manage_items(&self) -> Result<()> {
        self.require_role(&[Role::Admin, Role::Constructor])
    }

    /// Offers are published by suppliers (and admins on their behalf).
    pub fn ensure_can_publish_offers(&self) -> Result<()> {
        if self.is_admin() || self.role.is_supplier() {
            Ok(())
        } else {
            Err(Error::forbidden("only suppliers can publish offers"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ProjectStatus;

    fn project(client_id: Option<i64>, constructor_id: Option<i64>) -> project::Model {
        let now = chrono::Utc::now();
        project::Model {
            id: 1,
            name: "Casa".to_string(),
            description: None,
            address: None,
            client_id,
            constructor_id,
            status: ProjectStatus::Planificacion,
            total_budget: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_admin_passes_everything() {
        let admin = Actor::new(99, Role::Admin);
        let p = project(Some(1), Some(2));
        assert!(admin.can_view_project(&p));
        assert!(admin.ensure_can_manage_project(&p).is_ok());
        assert!(admin.ensure_can_record_payment(&p).is_ok());
        assert!(admin.ensure_can_review_payment(&p).is_ok());
        assert!(admin.ensure_can_manage_items().is_ok());
    }

    #[test]
    fn test_client_and_constructor_split() {
        let p = project(Some(1), Some(2));
        let client = Actor::new(1, Role::Cliente);
        let constructor = Actor::new(2, Role::Constructor);
        let stranger = Actor::new(3, Role::Constructor);

        assert!(client.can_view_project(&p));
        assert!(client.ensure_can_record_payment(&p).is_ok());
        assert!(matches!(
            client.ensure_can_manage_project(&p),
            Err(Error::Forbidden { .. })
        ));
        assert!(client.ensure_can_review_payment(&p).is_err());

        assert!(constructor.ensure_can_manage_project(&p).is_ok());
        assert!(constructor.ensure_can_review_payment(&p).is_ok());
        assert!(constructor.ensure_can_record_payment(&p).is_err());

        assert!(!stranger.can_view_project(&p));
        assert!(
            stranger
                .ensure_can_edit_project(&p, &ProjectChanges::default())
                .is_err()
        );
    }

    #[test]
    fn test_client_cannot_change_contract_terms() {
        let p = project(Some(1), Some(2));
        let client = Actor::new(1, Role::Cliente);
        let constructor = Actor::new(2, Role::Constructor);

        let rename = ProjectChanges {
            name: Some("Casa nueva".to_string()),
            ..Default::default()
        };
        let lower_total = ProjectChanges {
            total_budget: Some(10.0),
            ..Default::default()
        };
        let swap_constructor = ProjectChanges {
            constructor_id: Some(7),
            ..Default::default()
        };

        assert!(client.ensure_can_edit_project(&p, &rename).is_ok());
        assert!(matches!(
            client.ensure_can_edit_project(&p, &lower_total),
            Err(Error::Forbidden { .. })
        ));
        assert!(client.ensure_can_edit_project(&p, &swap_constructor).is_err());

        assert!(constructor.ensure_can_edit_project(&p, &lower_total).is_ok());
        assert!(
            Actor::new(9, Role::Admin)
                .ensure_can_edit_project(&p, &swap_constructor)
                .is_ok()
        );
    }

    #[test]
    fn test_supplier_roles() {
        let supplier = Actor::new(5, Role::ProveedorServicios);
        assert!(supplier.ensure_can_publish_offers().is_ok());
        assert!(supplier.ensure_can_manage_items().is_err());
        assert!(Actor::new(6, Role::Cliente).ensure_can_publish_offers().is_err());
    }
}

//! Project business logic - creation, lookup, updates and lifecycle.

use crate::{
    core::access::Actor,
    entities::{Project, ProjectStatus, Role, User, project},
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use serde::Deserialize;

/// Fields accepted when creating a project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProject {
    /// Project name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Site address
    #[serde(default)]
    pub address: Option<String>,
    /// Client user id
    #[serde(default)]
    pub client_id: Option<i64>,
    /// Constructor user id
    #[serde(default)]
    pub constructor_id: Option<i64>,
    /// Agreed contract total
    #[serde(default)]
    pub total_budget: Option<f64>,
}

/// Fields accepted when updating a project; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectChanges {
    /// New name
    #[serde(default)]
    pub name: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New address
    #[serde(default)]
    pub address: Option<String>,
    /// New constructor user id
    #[serde(default)]
    pub constructor_id: Option<i64>,
    /// New agreed contract total
    #[serde(default)]
    pub total_budget: Option<f64>,
}

impl ProjectChanges {
    /// Whether the changes touch the contract terms (total or constructor).
    #[must_use]
    pub const fn touches_contract(&self) -> bool {
        self.constructor_id.is_some() || self.total_budget.is_some()
    }
}

fn validate_total_budget(total_budget: Option<f64>) -> Result<()> {
    match total_budget {
        Some(amount) if !amount.is_finite() || amount < 0.0 => {
            Err(Error::InvalidAmount { amount })
        }
        _ => Ok(()),
    }
}

/// Checks that `user_id` is an active user holding `role`.
async fn ensure_participant(db: &DatabaseConnection, user_id: i64, role: Role) -> Result<()> {
    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| Error::not_found("user", user_id))?;

    if user.role != role {
        return Err(Error::validation(format!(
            "user {user_id} has role {:?}, expected {role:?}",
            user.role
        )));
    }
    Ok(())
}

/// Creates a project in `PLANIFICACION` status.
///
/// The client and constructor, when given, must be active users with the
/// matching role.
pub async fn create_project(db: &DatabaseConnection, input: NewProject) -> Result<project::Model> {
    if input.name.trim().is_empty() {
        return Err(Error::validation("Project name cannot be empty"));
    }
    validate_total_budget(input.total_budget)?;

    if let Some(client_id) = input.client_id {
        ensure_participant(db, client_id, Role::Cliente).await?;
    }
    if let Some(constructor_id) = input.constructor_id {
        ensure_participant(db, constructor_id, Role::Constructor).await?;
    }

    let now = chrono::Utc::now();
    let project = project::ActiveModel {
        name: Set(input.name.trim().to_string()),
        description: Set(input.description),
        address: Set(input.address),
        client_id: Set(input.client_id),
        constructor_id: Set(input.constructor_id),
        status: Set(ProjectStatus::Planificacion),
        total_budget: Set(input.total_budget),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let project = project.insert(db).await?;
    tracing::info!(project_id = project.id, "created project");
    Ok(project)
}

/// Fetches a project by id.
pub async fn get_project(db: &DatabaseConnection, project_id: i64) -> Result<project::Model> {
    Project::find_by_id(project_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("project", project_id))
}

/// Lists the projects visible to `actor`, newest first.
pub async fn list_projects_for(
    db: &DatabaseConnection,
    actor: &Actor,
) -> Result<Vec<project::Model>> {
    let mut query = Project::find().order_by_desc(project::Column::Id);

    if !actor.is_admin() {
        query = query.filter(
            Condition::any()
                .add(project::Column::ClientId.eq(actor.user_id))
                .add(project::Column::ConstructorId.eq(actor.user_id)),
        );
    }

    query.all(db).await.map_err(Into::into)
}

/// Applies [`ProjectChanges`] to a project.
pub async fn update_project(
    db: &DatabaseConnection,
    project_id: i64,
    changes: ProjectChanges,
) -> Result<project::Model> {
    let mut project: project::ActiveModel = get_project(db, project_id).await?.into();

    if let Some(name) = changes.name {
        if name.trim().is_empty() {
            return Err(Error::validation("Project name cannot be empty"));
        }
        project.name = Set(name.trim().to_string());
    }
    if let Some(description) = changes.description {
        project.description = Set(Some(description));
    }
    if let Some(address) = changes.address {
        project.address = Set(Some(address));
    }
    if let Some(constructor_id) = changes.constructor_id {
        ensure_participant(db, constructor_id, Role::Constructor).await?;
        project.constructor_id = Set(Some(constructor_id));
    }
    if changes.total_budget.is_some() {
        validate_total_budget(changes.total_budget)?;
        project.total_budget = Set(changes.total_budget);
    }

    project.updated_at = Set(chrono::Utc::now());
    project.update(db).await.map_err(Into::into)
}

/// Moves a project to a new status.
///
/// A cancelled project is frozen, and a finished project cannot return to
/// planning.
pub async fn set_project_status(
    db: &DatabaseConnection,
    project_id: i64,
    status: ProjectStatus,
) -> Result<project::Model> {
    let current = get_project(db, project_id).await?;

    match (current.status, status) {
        (ProjectStatus::Cancelado, next) if next != ProjectStatus::Cancelado => {
            return Err(Error::Conflict {
                message: format!("project {project_id} is cancelled"),
            });
        }
        (ProjectStatus::Finalizado, ProjectStatus::Planificacion) => {
            return Err(Error::Conflict {
                message: format!("project {project_id} is finished and cannot return to planning"),
            });
        }
        _ => {}
    }

    let mut project: project::ActiveModel = current.into();
    project.status = Set(status);
    project.updated_at = Set(chrono::Utc::now());
    let project = project.update(db).await?;
    tracing::info!(project_id, status = ?project.status, "project status changed");
    Ok(project)
}

/// Deletes a project with its budget lines, stages, payments and listing.
pub async fn delete_project(db: &DatabaseConnection, project_id: i64) -> Result<()> {
    let result = Project::delete_by_id(project_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("project", project_id));
    }
    tracing::info!(project_id, "deleted project");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_project_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_project(
            &db,
            NewProject {
                name: String::new(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = create_project(
            &db,
            NewProject {
                name: "Casa".to_string(),
                total_budget: Some(-1.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: -1.0 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_project_checks_participant_roles() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_user(&db, "cliente@example.com", Role::Cliente).await?;

        let result = create_project(
            &db,
            NewProject {
                name: "Casa".to_string(),
                constructor_id: Some(client.id),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let project = create_project(
            &db,
            NewProject {
                name: "  Casa  ".to_string(),
                client_id: Some(client.id),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(project.name, "Casa");
        assert_eq!(project.status, ProjectStatus::Planificacion);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_projects_scoped_by_participant() -> Result<()> {
        let db = setup_test_db().await?;
        let (client, constructor) = create_participants(&db).await?;
        let other = create_test_user(&db, "otro@example.com", Role::Cliente).await?;

        create_test_project(&db, Some(client.id), Some(constructor.id)).await?;
        create_test_project(&db, Some(other.id), None).await?;

        let admin = Actor::new(0, Role::Admin);
        assert_eq!(list_projects_for(&db, &admin).await?.len(), 2);
        assert_eq!(
            list_projects_for(&db, &Actor::new(client.id, Role::Cliente))
                .await?
                .len(),
            1
        );
        assert_eq!(
            list_projects_for(&db, &Actor::new(constructor.id, Role::Constructor))
                .await?
                .len(),
            1
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_update_project() -> Result<()> {
        let db = setup_test_db().await?;
        let (client, constructor) = create_participants(&db).await?;
        let project = create_test_project(&db, Some(client.id), None).await?;

        let updated = update_project(
            &db,
            project.id,
            ProjectChanges {
                address: Some("Calle 1".to_string()),
                constructor_id: Some(constructor.id),
                total_budget: Some(5000.0),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.address.as_deref(), Some("Calle 1"));
        assert_eq!(updated.constructor_id, Some(constructor.id));
        assert_eq!(updated.total_budget, Some(5000.0));
        assert_eq!(updated.name, project.name);

        Ok(())
    }

    #[tokio::test]
    async fn test_status_transitions() -> Result<()> {
        let db = setup_test_db().await?;
        let project = create_test_project(&db, None, None).await?;

        let project = set_project_status(&db, project.id, ProjectStatus::Finalizado).await?;
        assert_eq!(project.status, ProjectStatus::Finalizado);

        let result = set_project_status(&db, project.id, ProjectStatus::Planificacion).await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));

        set_project_status(&db, project.id, ProjectStatus::Cancelado).await?;
        let result = set_project_status(&db, project.id, ProjectStatus::EnProgreso).await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_project() -> Result<()> {
        let db = setup_test_db().await?;
        let project = create_test_project(&db, None, None).await?;

        delete_project(&db, project.id).await?;
        assert!(matches!(
            get_project(&db, project.id).await.unwrap_err(),
            Error::NotFound { .. }
        ));
        assert!(matches!(
            delete_project(&db, project.id).await.unwrap_err(),
            Error::NotFound { .. }
        ));

        Ok(())
    }
}

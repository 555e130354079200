//! Project budget business logic.
//!
//! A budget line stores a cost snapshot computed by [`crate::core::cost`]
//! when the line is added, its quantity changes or the budget is refreshed.
//! The line detail view prices the line again from current offers so callers
//! can see how far the snapshot has drifted.

use crate::{
    core::cost::{self, CostBreakdown},
    entities::{BudgetLine, Item, Project, ProjectStatus, budget_line, item, project},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::HashMap;

/// A budget line with the name and unit of its item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetLineView {
    /// The stored line and its snapshot
    #[serde(flatten)]
    pub line: budget_line::Model,
    /// Item name
    pub item_name: String,
    /// Item unit
    pub item_unit: String,
}

/// All lines of a project budget with their totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectBudget {
    /// Project the budget belongs to
    pub project_id: i64,
    /// Lines in insertion order
    pub lines: Vec<BudgetLineView>,
    /// Σ line materials cost
    pub materials_cost: f64,
    /// Σ line labor cost
    pub labor_cost: f64,
    /// Σ line total
    pub total: f64,
}

/// A stored line next to a fresh estimate from current prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetLineDetail {
    /// The stored line and its item
    #[serde(flatten)]
    pub line: BudgetLineView,
    /// Current cost, `None` when the item has since been deleted
    pub current: Option<CostBreakdown>,
    /// `current.total - line.total`
    pub drift: Option<f64>,
}

fn ensure_budget_open(project: &project::Model) -> Result<()> {
    match project.status {
        ProjectStatus::Finalizado | ProjectStatus::Cancelado => Err(Error::Conflict {
            message: format!("the budget of project {} is closed", project.id),
        }),
        ProjectStatus::Planificacion | ProjectStatus::EnProgreso => Ok(()),
    }
}

async fn find_project<C>(db: &C, project_id: i64) -> Result<project::Model>
where
    C: ConnectionTrait,
{
    Project::find_by_id(project_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("project", project_id))
}

async fn find_line<C>(db: &C, project_id: i64, line_id: i64) -> Result<budget_line::Model>
where
    C: ConnectionTrait,
{
    BudgetLine::find_by_id(line_id)
        .one(db)
        .await?
        .filter(|line| line.project_id == project_id)
        .ok_or_else(|| Error::not_found("budget line", line_id))
}

async fn view_line<C>(db: &C, line: budget_line::Model) -> Result<(BudgetLineView, item::Model)>
where
    C: ConnectionTrait,
{
    // Soft-deleted items still name their existing lines
    let item = Item::find_by_id(line.item_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("item", line.item_id))?;

    Ok((
        BudgetLineView {
            item_name: item.name.clone(),
            item_unit: item.unit.clone(),
            line,
        },
        item,
    ))
}

/// Prices `quantity` units of an item and appends it to a project's budget.
pub async fn add_budget_line(
    db: &DatabaseConnection,
    project_id: i64,
    item_id: i64,
    quantity: f64,
) -> Result<BudgetLineView> {
    let quantity = cost::validate_quantity(quantity)?;
    let project = find_project(db, project_id).await?;
    ensure_budget_open(&project)?;

    let breakdown = cost::estimate_item_cost(db, item_id, quantity).await?;

    let now = chrono::Utc::now();
    let line = budget_line::ActiveModel {
        project_id: Set(project_id),
        item_id: Set(item_id),
        quantity: Set(quantity),
        materials_cost: Set(breakdown.materials_cost),
        labor_cost: Set(breakdown.labor_cost),
        total: Set(breakdown.total),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let line = line.insert(db).await?;
    tracing::info!(
        project_id,
        item_id,
        line_id = line.id,
        total = line.total,
        "added budget line"
    );

    Ok(view_line(db, line).await?.0)
}

/// Lists a project's budget lines with their totals.
pub async fn get_project_budget(db: &DatabaseConnection, project_id: i64) -> Result<ProjectBudget> {
    find_project(db, project_id).await?;

    let lines = BudgetLine::find()
        .filter(budget_line::Column::ProjectId.eq(project_id))
        .order_by_asc(budget_line::Column::Id)
        .all(db)
        .await?;

    let items: HashMap<i64, item::Model> = Item::find()
        .filter(item::Column::Id.is_in(lines.iter().map(|l| l.item_id)))
        .all(db)
        .await?
        .into_iter()
        .map(|i| (i.id, i))
        .collect();

    let mut budget = ProjectBudget {
        project_id,
        lines: Vec::with_capacity(lines.len()),
        materials_cost: 0.0,
        labor_cost: 0.0,
        total: 0.0,
    };

    for line in lines {
        budget.materials_cost += line.materials_cost;
        budget.labor_cost += line.labor_cost;
        budget.total += line.total;

        let (item_name, item_unit) = items
            .get(&line.item_id)
            .map(|i| (i.name.clone(), i.unit.clone()))
            .unwrap_or_default();
        budget.lines.push(BudgetLineView {
            line,
            item_name,
            item_unit,
        });
    }

    Ok(budget)
}

/// Sum of the stored line totals of a project.
pub async fn budget_total<C>(db: &C, project_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    let lines = BudgetLine::find()
        .filter(budget_line::Column::ProjectId.eq(project_id))
        .all(db)
        .await?;
    Ok(lines.iter().map(|line| line.total).sum())
}

/// Returns a stored line together with a fresh estimate from current prices.
pub async fn get_budget_line_detail(
    db: &DatabaseConnection,
    project_id: i64,
    line_id: i64,
) -> Result<BudgetLineDetail> {
    let line = find_line(db, project_id, line_id).await?;
    let (view, item) = view_line(db, line).await?;

    let current = if item.is_deleted {
        None
    } else {
        Some(cost::estimate_item_cost(db, item.id, view.line.quantity).await?)
    };
    let drift = current.as_ref().map(|c| c.total - view.line.total);

    Ok(BudgetLineDetail {
        line: view,
        current,
        drift,
    })
}

async fn reprice_line<C>(
    db: &C,
    line: budget_line::Model,
    quantity: f64,
) -> Result<budget_line::Model>
where
    C: ConnectionTrait,
{
    let breakdown = cost::estimate_item_cost(db, line.item_id, quantity).await?;

    let mut line: budget_line::ActiveModel = line.into();
    line.quantity = Set(quantity);
    line.materials_cost = Set(breakdown.materials_cost);
    line.labor_cost = Set(breakdown.labor_cost);
    line.total = Set(breakdown.total);
    line.updated_at = Set(chrono::Utc::now());
    line.update(db).await.map_err(Into::into)
}

/// Changes a line's quantity and takes a new snapshot at current prices.
pub async fn update_budget_line_quantity(
    db: &DatabaseConnection,
    project_id: i64,
    line_id: i64,
    quantity: f64,
) -> Result<BudgetLineView> {
    let quantity = cost::validate_quantity(quantity)?;
    ensure_budget_open(&find_project(db, project_id).await?)?;

    let line = find_line(db, project_id, line_id).await?;
    let (view, item) = view_line(db, line).await?;
    if item.is_deleted {
        return Err(Error::Conflict {
            message: format!("item {} was deleted, line {line_id} quantity is frozen", item.id),
        });
    }

    let line = reprice_line(db, view.line, quantity).await?;
    Ok(BudgetLineView { line, ..view })
}

/// Re-prices every line whose item is still active, in one transaction.
///
/// Lines of deleted items keep their old snapshot.
pub async fn refresh_project_budget(
    db: &DatabaseConnection,
    project_id: i64,
) -> Result<ProjectBudget> {
    let txn = db.begin().await?;
    ensure_budget_open(&find_project(&txn, project_id).await?)?;

    let lines = BudgetLine::find()
        .filter(budget_line::Column::ProjectId.eq(project_id))
        .all(&txn)
        .await?;

    let mut refreshed = 0usize;
    for line in lines {
        let active = Item::find_by_id(line.item_id)
            .one(&txn)
            .await?
            .is_some_and(|i| !i.is_deleted);
        if active {
            let quantity = line.quantity;
            reprice_line(&txn, line, quantity).await?;
            refreshed += 1;
        }
    }

    txn.commit().await?;
    tracing::info!(project_id, refreshed, "refreshed project budget");

    get_project_budget(db, project_id).await
}

/// Removes a line from a project budget.
pub async fn remove_budget_line(
    db: &DatabaseConnection,
    project_id: i64,
    line_id: i64,
) -> Result<()> {
    ensure_budget_open(&find_project(db, project_id).await?)?;
    let line = find_line(db, project_id, line_id).await?;
    line.delete(db).await?;
    tracing::info!(project_id, line_id, "removed budget line");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{item as item_core, material as material_core, project as project_core};
    use crate::test_utils::*;

    /// Project with one item "Muro": 10 bricks at 2.0 each plus 5.0 labor per unit.
    async fn setup_budget() -> Result<(DatabaseConnection, project::Model, item::Model)> {
        let db = setup_test_db().await?;
        let project = create_test_project(&db, None, None).await?;
        let brick = create_test_material(&db, "Ladrillo", Some(2.0)).await?;
        let item = create_test_item(&db, "Muro", 5.0).await?;
        item_core::set_item_materials(&db, item.id, vec![(brick.id, 10.0)]).await?;
        Ok((db, project, item))
    }

    #[tokio::test]
    async fn test_add_budget_line_snapshots_cost() -> Result<()> {
        let (db, project, item) = setup_budget().await?;

        let view = add_budget_line(&db, project.id, item.id, 3.0).await?;
        assert_eq!(view.item_name, "Muro");
        assert_eq!(view.line.materials_cost, 60.0);
        assert_eq!(view.line.labor_cost, 15.0);
        assert_eq!(view.line.total, 75.0);

        add_budget_line(&db, project.id, item.id, 1.0).await?;

        let budget = get_project_budget(&db, project.id).await?;
        assert_eq!(budget.lines.len(), 2);
        assert_eq!(budget.total, 100.0);
        assert_eq!(budget.materials_cost, 80.0);
        assert_eq!(budget_total(&db, project.id).await?, 100.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_budget_line_validation() -> Result<()> {
        let (db, project, item) = setup_budget().await?;

        let result = add_budget_line(&db, project.id, item.id, 0.0).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        let result = add_budget_line(&db, 999, item.id, 1.0).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                entity: "project",
                ..
            }
        ));

        project_core::set_project_status(&db, project.id, ProjectStatus::Finalizado).await?;
        let result = add_budget_line(&db, project.id, item.id, 1.0).await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_line_detail_reports_drift() -> Result<()> {
        let (db, project, item) = setup_budget().await?;
        let view = add_budget_line(&db, project.id, item.id, 2.0).await?;

        let brick = item_core::get_item_detail(&db, item.id).await?.materials[0].material_id;
        material_core::update_material(
            &db,
            brick,
            material_core::MaterialChanges {
                base_price: Some(3.0),
                ..Default::default()
            },
        )
        .await?;

        let detail = get_budget_line_detail(&db, project.id, view.line.id).await?;
        assert_eq!(detail.line.line.total, 50.0);
        assert_eq!(detail.current.as_ref().unwrap().total, 70.0);
        assert_eq!(detail.drift, Some(20.0));

        // Snapshot follows on refresh
        let budget = refresh_project_budget(&db, project.id).await?;
        assert_eq!(budget.total, 70.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_line_detail_of_deleted_item() -> Result<()> {
        let (db, project, item) = setup_budget().await?;
        let view = add_budget_line(&db, project.id, item.id, 1.0).await?;

        item_core::delete_item(&db, item.id).await?;

        let detail = get_budget_line_detail(&db, project.id, view.line.id).await?;
        assert!(detail.current.is_none());
        assert!(detail.drift.is_none());
        assert_eq!(detail.line.item_name, "Muro");

        let result = update_budget_line_quantity(&db, project.id, view.line.id, 2.0).await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));
        let detail = get_budget_line_detail(&db, project.id, view.line.id).await?;
        assert_eq!(detail.line.line.quantity, 1.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_quantity_and_remove() -> Result<()> {
        let (db, project, item) = setup_budget().await?;
        let view = add_budget_line(&db, project.id, item.id, 1.0).await?;

        let updated = update_budget_line_quantity(&db, project.id, view.line.id, 4.0).await?;
        assert_eq!(updated.line.quantity, 4.0);
        assert_eq!(updated.line.total, 100.0);

        // Lines are scoped to their project
        let other = create_test_project(&db, None, None).await?;
        let result = remove_budget_line(&db, other.id, view.line.id).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        remove_budget_line(&db, project.id, view.line.id).await?;
        assert!(get_project_budget(&db, project.id).await?.lines.is_empty());

        Ok(())
    }
}

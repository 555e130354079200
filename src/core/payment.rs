//! Payments and their reconciliation against project and stage totals.
//!
//! Paid amount = Σ APPROVED + Σ PARTIAL. PENDING payments are reported but do
//! not count as paid; REJECTED payments are ignored entirely.
//!
//! | paid            | state       |
//! |-----------------|-------------|
//! | paid ≥ total    | `COMPLETO`  |
//! | 0 < paid < total| `PARCIAL`   |
//! | otherwise       | `PENDIENTE` |
//!
//! A total of 0 or less with nothing paid stays `PENDIENTE`.

use crate::{
    core::budget,
    entities::{Payment, PaymentStatus, Project, Stage, payment, stage},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};

/// Ternary payment state of a project or stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    /// Nothing paid yet
    Pendiente,
    /// Some, but not all, paid
    Parcial,
    /// Fully paid
    Completo,
}

/// Reconciliation of a set of payments against a total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentSummary {
    /// Amount owed
    pub total: f64,
    /// Σ APPROVED
    pub approved: f64,
    /// Σ PARTIAL
    pub partial: f64,
    /// Σ PENDING
    pub pending: f64,
    /// `approved + partial`
    pub paid: f64,
    /// `max(total - paid, 0)`
    pub outstanding: f64,
    /// Derived state
    pub state: PaymentState,
}

/// Fields accepted when recording a payment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPayment {
    /// Amount paid
    pub amount: f64,
    /// Stage the payment is for
    #[serde(default)]
    pub stage_id: Option<i64>,
    /// Payment method
    #[serde(default)]
    pub method: Option<String>,
    /// External reference
    #[serde(default)]
    pub reference: Option<String>,
}

/// Derives the payment state from a total and the paid amount.
#[must_use]
pub fn derive_state(total: f64, paid: f64) -> PaymentState {
    if paid <= 0.0 {
        PaymentState::Pendiente
    } else if paid >= total {
        PaymentState::Completo
    } else {
        PaymentState::Parcial
    }
}

/// Sums payments by status and reconciles them against `total`.
#[must_use]
pub fn summarize(total: f64, payments: &[payment::Model]) -> PaymentSummary {
    let (mut approved, mut partial, mut pending) = (0.0, 0.0, 0.0);

    for p in payments {
        match p.status {
            PaymentStatus::Approved => approved += p.amount,
            PaymentStatus::Partial => partial += p.amount,
            PaymentStatus::Pending => pending += p.amount,
            PaymentStatus::Rejected => {}
        }
    }

    let paid = approved + partial;
    PaymentSummary {
        total,
        approved,
        partial,
        pending,
        paid,
        outstanding: (total - paid).max(0.0),
        state: derive_state(total, paid),
    }
}

/// Lists a project's payments, newest first.
pub async fn list_project_payments(
    db: &DatabaseConnection,
    project_id: i64,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::ProjectId.eq(project_id))
        .order_by_desc(payment::Column::CreatedAt)
        .order_by_desc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fetches a payment by id.
pub async fn get_payment(db: &DatabaseConnection, payment_id: i64) -> Result<payment::Model> {
    Payment::find_by_id(payment_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("payment", payment_id))
}

/// Records a `PENDING` payment against a project.
///
/// A stage, when given, must belong to the same project.
pub async fn record_payment(
    db: &DatabaseConnection,
    project_id: i64,
    recorded_by: i64,
    input: NewPayment,
) -> Result<payment::Model> {
    if !input.amount.is_finite() || input.amount <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: input.amount,
        });
    }

    Project::find_by_id(project_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("project", project_id))?;

    if let Some(stage_id) = input.stage_id {
        let stage = Stage::find_by_id(stage_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::not_found("stage", stage_id))?;
        if stage.project_id != project_id {
            return Err(Error::validation(format!(
                "stage {stage_id} does not belong to project {project_id}"
            )));
        }
    }

    let now = chrono::Utc::now();
    let payment = payment::ActiveModel {
        project_id: Set(project_id),
        stage_id: Set(input.stage_id),
        amount: Set(input.amount),
        status: Set(PaymentStatus::Pending),
        method: Set(input.method),
        reference: Set(input.reference),
        recorded_by: Set(recorded_by),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let payment = payment.insert(db).await?;
    tracing::info!(
        project_id,
        payment_id = payment.id,
        amount = payment.amount,
        "recorded payment"
    );
    Ok(payment)
}

/// Sets the review status of a payment.
pub async fn set_payment_status(
    db: &DatabaseConnection,
    payment_id: i64,
    status: PaymentStatus,
) -> Result<payment::Model> {
    let mut payment: payment::ActiveModel = get_payment(db, payment_id).await?.into();
    payment.status = Set(status);
    payment.updated_at = Set(chrono::Utc::now());
    let payment = payment.update(db).await?;
    tracing::info!(payment_id, status = ?payment.status, "payment reviewed");
    Ok(payment)
}

/// Reconciles a project's payments.
///
/// The total is the project's agreed `total_budget` when set, otherwise the
/// sum of its budget lines.
pub async fn project_payment_summary(
    db: &DatabaseConnection,
    project_id: i64,
) -> Result<PaymentSummary> {
    let project = Project::find_by_id(project_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("project", project_id))?;

    let total = match project.total_budget {
        Some(total) => total,
        None => budget::budget_total(db, project_id).await?,
    };

    let payments = list_project_payments(db, project_id).await?;
    Ok(summarize(total, &payments))
}

/// Reconciles the payments scoped to a stage against its `budget_amount`.
pub async fn stage_payment_summary(
    db: &DatabaseConnection,
    stage_id: i64,
) -> Result<(stage::Model, PaymentSummary)> {
    let stage = Stage::find_by_id(stage_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("stage", stage_id))?;

    let payments = Payment::find()
        .filter(payment::Column::StageId.eq(stage_id))
        .all(db)
        .await?;

    let summary = summarize(stage.budget_amount.unwrap_or(0.0), &payments);
    Ok((stage, summary))
}

//! Real-estate listings published from finished projects.

use crate::{
    core::budget,
    entities::{Listing, Project, ProjectStatus, listing},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;

/// Fields accepted when publishing a listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewListing {
    /// Headline, defaults to the project name
    #[serde(default)]
    pub title: Option<String>,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Asking price
    pub price: f64,
    /// Location, defaults to the project address
    #[serde(default)]
    pub location: Option<String>,
    /// Whether the listing is visible to the public right away
    #[serde(default = "default_published")]
    pub is_published: bool,
}

/// Fields accepted when updating a listing; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingChanges {
    /// New headline
    #[serde(default)]
    pub title: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New asking price
    #[serde(default)]
    pub price: Option<f64>,
    /// New location
    #[serde(default)]
    pub location: Option<String>,
    /// Publish or withdraw
    #[serde(default)]
    pub is_published: Option<bool>,
}

const fn default_published() -> bool {
    true
}

fn validate_price(price: f64) -> Result<f64> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidAmount { amount: price });
    }
    Ok(price)
}

/// Lists published listings, newest first.
pub async fn list_published_listings(db: &DatabaseConnection) -> Result<Vec<listing::Model>> {
    Listing::find()
        .filter(listing::Column::IsPublished.eq(true))
        .order_by_desc(listing::Column::CreatedAt)
        .order_by_desc(listing::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fetches a listing by id, published or not.
pub async fn get_listing(db: &DatabaseConnection, listing_id: i64) -> Result<listing::Model> {
    Listing::find_by_id(listing_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("listing", listing_id))
}

/// Fetches a listing only if it is published.
pub async fn get_published_listing(
    db: &DatabaseConnection,
    listing_id: i64,
) -> Result<listing::Model> {
    Listing::find_by_id(listing_id)
        .one(db)
        .await?
        .filter(|l| l.is_published)
        .ok_or_else(|| Error::not_found("listing", listing_id))
}

/// Fetches the listing built from a project.
pub async fn get_project_listing(
    db: &DatabaseConnection,
    project_id: i64,
) -> Result<listing::Model> {
    Listing::find()
        .filter(listing::Column::ProjectId.eq(project_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "listing",
            id: format!("project {project_id}"),
        })
}

/// Publishes a listing for a `FINALIZADO` project.
///
/// The construction cost is copied from the project's budget total at this
/// moment; later budget edits do not change it.
pub async fn create_listing_from_project(
    db: &DatabaseConnection,
    project_id: i64,
    input: NewListing,
) -> Result<listing::Model> {
    let price = validate_price(input.price)?;

    let project = Project::find_by_id(project_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("project", project_id))?;

    if project.status != ProjectStatus::Finalizado {
        return Err(Error::Conflict {
            message: format!("project {project_id} is not finished"),
        });
    }

    match get_project_listing(db, project_id).await {
        Ok(existing) => {
            return Err(Error::Conflict {
                message: format!("project {project_id} already has listing {}", existing.id),
            });
        }
        Err(Error::NotFound { .. }) => {}
        Err(e) => return Err(e),
    }

    let title = match input.title {
        Some(title) if !title.trim().is_empty() => title.trim().to_string(),
        Some(_) => return Err(Error::validation("Listing title cannot be empty")),
        None => project.name.clone(),
    };

    let construction_cost = budget::budget_total(db, project_id).await?;
    let now = chrono::Utc::now();
    let listing = listing::ActiveModel {
        project_id: Set(project_id),
        title: Set(title),
        description: Set(input.description.or(project.description)),
        price: Set(price),
        location: Set(input.location.or(project.address)),
        construction_cost: Set(construction_cost),
        is_published: Set(input.is_published),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let listing = listing.insert(db).await?;
    tracing::info!(
        project_id,
        listing_id = listing.id,
        construction_cost,
        "published listing"
    );
    Ok(listing)
}

/// Applies [`ListingChanges`] to a listing.
pub async fn update_listing(
    db: &DatabaseConnection,
    listing_id: i64,
    changes: ListingChanges,
) -> Result<listing::Model> {
    let mut listing: listing::ActiveModel = get_listing(db, listing_id).await?.into();

    if let Some(title) = changes.title {
        if title.trim().is_empty() {
            return Err(Error::validation("Listing title cannot be empty"));
        }
        listing.title = Set(title.trim().to_string());
    }
    if let Some(description) = changes.description {
        listing.description = Set(Some(description));
    }
    if let Some(price) = changes.price {
        listing.price = Set(validate_price(price)?);
    }
    if let Some(location) = changes.location {
        listing.location = Set(Some(location));
    }
    if let Some(is_published) = changes.is_published {
        listing.is_published = Set(is_published);
    }

    listing.updated_at = Set(chrono::Utc::now());
    listing.update(db).await.map_err(Into::into)
}

/// Deletes a listing.
pub async fn delete_listing(db: &DatabaseConnection, listing_id: i64) -> Result<()> {
    let result = Listing::delete_by_id(listing_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("listing", listing_id));
    }
    tracing::info!(listing_id, "deleted listing");
    Ok(())
}

use crate::{
    db::DbPool,
    entities::location::{self, LocationKind},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLocationInput {
    pub name: String,
    pub kind: LocationKind,
    pub address: Option<String>,
}

#[derive(Clone)]
pub struct LocationService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl LocationService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Locations ordered by name.
    #[instrument(skip(self))]
    pub async fn list_locations(&self) -> Result<Vec<location::Model>, ServiceError> {
        Ok(location::Entity::find()
            .order_by_asc(location::Column::Name)
            .all(self.db.as_ref())
            .await?)
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_location(
        &self,
        input: CreateLocationInput,
    ) -> Result<location::Model, ServiceError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "location name is required".to_string(),
            ));
        }

        let existing = location::Entity::find()
            .filter(location::Column::Name.eq(name.as_str()))
            .one(self.db.as_ref())
            .await?;
        if existing.is_some() {
            return Err(ServiceError::InvalidOperation(format!(
                "location {} already exists",
                name
            )));
        }

        let model = location::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            kind: Set(input.kind),
            address: Set(input.address),
            created_at: Set(Utc::now()),
        };
        let created = model.insert(self.db.as_ref()).await?;

        info!(location_id = %created.id, "location created");
        self.event_sender
            .publish(Event::LocationCreated(created.id))
            .await;

        Ok(created)
    }
}

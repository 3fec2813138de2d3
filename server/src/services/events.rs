//! Event lifecycle: listing, lookup, creation, owner-only update and delete,
//! and substring search.

use std::sync::Arc;

use uuid::Uuid;

use crate::models::{Event, EventChanges, EventWithCreator, NewEvent};
use crate::store::EventStore;
use crate::uploads::{ImageStorage, ImageUpload};
use crate::utils::error::{AppError, AppResult};

pub const EVENT_NOT_FOUND: &str = "Event not found";

#[derive(Debug, Clone, Default)]
pub struct EventFields {
    pub title: String,
    pub description: String,
    pub event_type: String,
    pub date: String,
    pub time: String,
    pub venue: String,
}

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn EventStore>,
    images: Arc<ImageStorage>,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>, images: Arc<ImageStorage>) -> Self {
        Self { store, images }
    }

    pub async fn list(&self) -> AppResult<Vec<EventWithCreator>> {
        self.store
            .list()
            .await
            .map_err(AppError::storage("Error fetching events"))
    }

    pub async fn get(&self, id: &str) -> AppResult<EventWithCreator> {
        let Some(id) = parse_id(id) else {
            return Err(not_found());
        };

        self.store
            .find_with_creator(id)
            .await
            .map_err(AppError::storage("Error fetching event"))?
            .ok_or_else(not_found)
    }

    pub async fn create(
        &self,
        subject: Uuid,
        fields: EventFields,
        image: Option<ImageUpload>,
    ) -> AppResult<Event> {
        if fields.title.trim().is_empty() {
            return Err(AppError::ValidationError("Title is required".to_string()));
        }

        let image = self.store_image(image).await?;

        let new = NewEvent {
            title: fields.title,
            description: fields.description,
            event_type: fields.event_type,
            date: fields.date,
            time: fields.time,
            venue: fields.venue,
            image: image.unwrap_or_default(),
            created_by: subject,
        };

        let event = self
            .store
            .insert(new)
            .await
            .map_err(AppError::storage("Error creating event"))?;

        tracing::info!(event_id = %event.id, created_by = %subject, "Event created");
        Ok(event)
    }

    /// Overwrites the supplied non-empty fields. A new image replaces the
    /// stored reference; without one the previous image is kept.
    pub async fn update(
        &self,
        subject: Uuid,
        id: &str,
        mut changes: EventChanges,
        image: Option<ImageUpload>,
    ) -> AppResult<Event> {
        const CONTEXT: &str = "Error updating event";

        let mut event = self.owned_event(subject, id, CONTEXT, "update").await?;
        if let Some(reference) = self.store_image(image).await? {
            changes.image = Some(reference);
        }
        event.apply(changes);

        let updated = self
            .store
            .update(&event)
            .await
            .map_err(AppError::storage(CONTEXT))?
            .ok_or_else(not_found)?;

        tracing::info!(event_id = %updated.id, "Event updated");
        Ok(updated)
    }

    pub async fn delete(&self, subject: Uuid, id: &str) -> AppResult<()> {
        const CONTEXT: &str = "Error deleting event";

        let event = self.owned_event(subject, id, CONTEXT, "delete").await?;

        let removed = self
            .store
            .delete(event.id)
            .await
            .map_err(AppError::storage(CONTEXT))?;
        if !removed {
            return Err(not_found());
        }

        tracing::info!(event_id = %event.id, "Event deleted");
        Ok(())
    }

    pub async fn search(&self, query: &str) -> AppResult<Vec<EventWithCreator>> {
        self.store
            .search(query)
            .await
            .map_err(AppError::storage("Error searching events"))
    }

    async fn store_image(&self, image: Option<ImageUpload>) -> AppResult<Option<String>> {
        let Some(image) = image else {
            return Ok(None);
        };

        let reference = self
            .images
            .store(image.file_name.as_deref(), &image.data)
            .await
            .map_err(|e| AppError::InternalServerError(format!("Error storing image: {e}")))?;
        Ok(Some(reference))
    }

    /// Loads the event and checks that `subject` created it.
    async fn owned_event(
        &self,
        subject: Uuid,
        id: &str,
        context: &'static str,
        action: &str,
    ) -> AppResult<Event> {
        let Some(id) = parse_id(id) else {
            return Err(not_found());
        };

        let event = self
            .store
            .find(id)
            .await
            .map_err(AppError::storage(context))?
            .ok_or_else(not_found)?;

        if !event.is_owned_by(subject) {
            tracing::warn!(
                event_id = %id,
                subject = %subject,
                action,
                "Non-creator mutation attempt"
            );
            return Err(AppError::Forbidden(format!(
                "Not authorized to {action} this event"
            )));
        }

        Ok(event)
    }
}

/// A malformed id cannot name any stored event.
fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

fn not_found() -> AppError {
    AppError::NotFound(EVENT_NOT_FOUND.to_string())
}

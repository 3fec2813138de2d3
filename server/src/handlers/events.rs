//! `/api/events` handlers.
//!
//! Create and update take a multipart form with the text fields `title`,
//! `description`, `eventType`, `date`, `time`, `venue` and an optional `image`
//! file part.

use axum::extract::{Multipart, Path, State};
use axum::response::Response;

use crate::auth::AuthUser;
use crate::models::{EventChanges, SUGGESTED_CATEGORIES};
use crate::services::EventFields;
use crate::state::AppState;
use crate::uploads::ImageUpload;
use crate::utils::error::AppResult;
use crate::utils::extract::{multipart_error, ApiMultipart};
use crate::utils::response::{created, message, ok};

#[derive(Debug, Default)]
struct EventForm {
    title: Option<String>,
    description: Option<String>,
    event_type: Option<String>,
    date: Option<String>,
    time: Option<String>,
    venue: Option<String>,
    image: Option<ImageUpload>,
}

impl EventForm {
    fn into_fields(self) -> (EventFields, Option<ImageUpload>) {
        let fields = EventFields {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            event_type: self.event_type.unwrap_or_default(),
            date: self.date.unwrap_or_default(),
            time: self.time.unwrap_or_default(),
            venue: self.venue.unwrap_or_default(),
        };
        (fields, self.image)
    }

    fn into_changes(self) -> (EventChanges, Option<ImageUpload>) {
        let changes = EventChanges {
            title: self.title,
            description: self.description,
            event_type: self.event_type,
            date: self.date,
            time: self.time,
            venue: self.venue,
            image: None,
        };
        (changes, self.image)
    }
}

async fn read_form(mut multipart: Multipart) -> AppResult<EventForm> {
    let mut form = EventForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        if name == "image" {
            let file_name = field.file_name().map(str::to_string);
            let data = field.bytes().await.map_err(multipart_error)?;
            // Browsers send an empty part when no file was picked.
            if !data.is_empty() {
                form.image = Some(ImageUpload {
                    file_name,
                    data: data.to_vec(),
                });
            }
            continue;
        }

        let slot = match name.as_str() {
            "title" => &mut form.title,
            "description" => &mut form.description,
            "eventType" => &mut form.event_type,
            "date" => &mut form.date,
            "time" => &mut form.time,
            "venue" => &mut form.venue,
            _ => continue,
        };
        *slot = Some(field.text().await.map_err(multipart_error)?);
    }

    Ok(form)
}

/// GET /api/events
pub async fn list_events(State(state): State<AppState>) -> AppResult<Response> {
    let events = state.event_service().list().await?;
    Ok(ok(events))
}

/// GET /api/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let event = state.event_service().get(&id).await?;
    Ok(ok(event))
}

/// POST /api/events
pub async fn create_event(
    user: AuthUser,
    State(state): State<AppState>,
    ApiMultipart(multipart): ApiMultipart,
) -> AppResult<Response> {
    let (fields, image) = read_form(multipart).await?.into_fields();
    let event = state
        .event_service()
        .create(user.user_id, fields, image)
        .await?;
    Ok(created(event))
}

/// PUT /api/events/:id
pub async fn update_event(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiMultipart(multipart): ApiMultipart,
) -> AppResult<Response> {
    let (changes, image) = read_form(multipart).await?.into_changes();
    let event = state
        .event_service()
        .update(user.user_id, &id, changes, image)
        .await?;
    Ok(ok(event))
}

/// DELETE /api/events/:id
pub async fn delete_event(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    state.event_service().delete(user.user_id, &id).await?;
    Ok(message("Event deleted successfully"))
}

/// GET /api/events/search/:query
pub async fn search_events(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> AppResult<Response> {
    let events = state.event_service().search(&query).await?;
    Ok(ok(events))
}

/// GET /api/categories
pub async fn list_categories() -> Response {
    ok(SUGGESTED_CATEGORIES)
}

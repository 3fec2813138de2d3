use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EventStore, StoreError, UserStore};
use crate::models::{Creator, Event, EventWithCreator, NewEvent, NewUser, User};

#[derive(Default)]
struct State {
    events: Vec<Event>,
    users: Vec<User>,
}

impl State {
    fn join(&self, event: &Event) -> EventWithCreator {
        let creator = self
            .users
            .iter()
            .find(|u| u.id == event.created_by)
            .map(Creator::from)
            .unwrap_or_else(|| Creator::unresolved(event.created_by));
        event.clone().with_creator(creator)
    }
}

/// In-process store. Events keep insertion order.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_query(event: &Event, needle: &str) -> bool {
    [&event.title, &event.description, &event.event_type]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert(&self, new: NewEvent) -> Result<Event, StoreError> {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            event_type: new.event_type,
            date: new.date,
            time: new.time,
            venue: new.venue,
            image: new.image,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.events.push(event.clone());
        Ok(event)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let state = self.state.read().await;
        Ok(state.events.iter().find(|e| e.id == id).cloned())
    }

    async fn find_with_creator(
        &self,
        id: Uuid,
    ) -> Result<Option<EventWithCreator>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .events
            .iter()
            .find(|e| e.id == id)
            .map(|e| state.join(e)))
    }

    async fn list(&self) -> Result<Vec<EventWithCreator>, StoreError> {
        let state = self.state.read().await;
        Ok(state.events.iter().map(|e| state.join(e)).collect())
    }

    async fn update(&self, event: &Event) -> Result<Option<Event>, StoreError> {
        let mut state = self.state.write().await;
        let Some(stored) = state.events.iter_mut().find(|e| e.id == event.id) else {
            return Ok(None);
        };

        stored.title = event.title.clone();
        stored.description = event.description.clone();
        stored.event_type = event.event_type.clone();
        stored.date = event.date.clone();
        stored.time = event.time.clone();
        stored.venue = event.venue.clone();
        stored.image = event.image.clone();
        stored.updated_at = Utc::now();

        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let before = state.events.len();
        state.events.retain(|e| e.id != id);
        Ok(state.events.len() < before)
    }

    async fn search(&self, query: &str) -> Result<Vec<EventWithCreator>, StoreError> {
        let needle = query.to_lowercase();
        let state = self.state.read().await;
        Ok(state
            .events
            .iter()
            .filter(|e| matches_query(e, &needle))
            .map(|e| state.join(e))
            .collect())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::Duplicate(new.email));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            created_at: Utc::now(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }
}

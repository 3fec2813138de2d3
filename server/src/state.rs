use std::sync::Arc;

use crate::auth::JwtConfig;
use crate::services::{AccountService, EventService};
use crate::store::{EventStore, UserStore};
use crate::uploads::ImageStorage;

/// Shared state handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<dyn EventStore>,
    pub users: Arc<dyn UserStore>,
    pub jwt: Arc<JwtConfig>,
    pub images: Arc<ImageStorage>,
}

impl AppState {
    /// Builds state around a single backend serving both events and users.
    pub fn new<S>(store: Arc<S>, jwt: JwtConfig, images: ImageStorage) -> Self
    where
        S: EventStore + UserStore + 'static,
    {
        Self {
            events: store.clone(),
            users: store,
            jwt: Arc::new(jwt),
            images: Arc::new(images),
        }
    }

    pub fn event_service(&self) -> EventService {
        EventService::new(self.events.clone(), self.images.clone())
    }

    pub fn account_service(&self) -> AccountService {
        AccountService::new(self.users.clone(), self.jwt.clone())
    }
}

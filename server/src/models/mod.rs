pub mod event;
pub mod user;

pub use event::{Event, EventChanges, EventWithCreator, NewEvent, SUGGESTED_CATEGORIES};
pub use user::{Creator, NewUser, PublicUser, User};

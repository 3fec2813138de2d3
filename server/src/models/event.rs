use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::Creator;

/// A campus event.
///
/// `C` is the representation of the creator: the raw user id as stored, or a
/// [`Creator`] once the creator's public identity has been joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event<C = Uuid> {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub event_type: String,
    pub date: String,
    pub time: String,
    pub venue: String,
    /// Public reference of the uploaded image, empty when none was supplied.
    pub image: String,
    pub created_by: C,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub type EventWithCreator = Event<Creator>;

impl Event {
    pub fn with_creator(self, creator: Creator) -> EventWithCreator {
        Event {
            id: self.id,
            title: self.title,
            description: self.description,
            event_type: self.event_type,
            date: self.date,
            time: self.time,
            venue: self.venue,
            image: self.image,
            created_by: creator,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn is_owned_by(&self, subject: Uuid) -> bool {
        self.created_by == subject
    }

    /// Applies a partial update. Only non-empty fields overwrite the stored
    /// values, so a field cannot be cleared through an update.
    pub fn apply(&mut self, changes: EventChanges) {
        fn fill(slot: &mut String, value: Option<String>) {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                *slot = value;
            }
        }

        fill(&mut self.title, changes.title);
        fill(&mut self.description, changes.description);
        fill(&mut self.event_type, changes.event_type);
        fill(&mut self.date, changes.date);
        fill(&mut self.time, changes.time);
        fill(&mut self.venue, changes.venue);
        fill(&mut self.image, changes.image);
    }
}

/// Fields accepted when creating an event. `image` is the reference returned
/// by the upload storage, empty when no image was attached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub event_type: String,
    pub date: String,
    pub time: String,
    pub venue: String,
    pub image: String,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub venue: Option<String>,
    pub image: Option<String>,
}

/// Category labels offered to clients. Storage accepts any label.
pub const SUGGESTED_CATEGORIES: &[&str] = &[
    "Academic",
    "Sports",
    "Cultural",
    "Technical",
    "Workshop",
    "Seminar",
    "Conference",
    "Social",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(owner: Uuid) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            title: "Tech Fest".into(),
            description: "Annual fest".into(),
            event_type: "Technical".into(),
            date: "2024-03-01".into(),
            time: "10:00".into(),
            venue: "Main Hall".into(),
            image: String::new(),
            created_by: owner,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_apply_overwrites_only_supplied_fields() {
        let mut event = sample(Uuid::new_v4());
        let before = event.clone();

        event.apply(EventChanges {
            venue: Some("Auditorium".into()),
            ..Default::default()
        });

        assert_eq!(event.venue, "Auditorium");
        assert_eq!(event.title, before.title);
        assert_eq!(event.description, before.description);
        assert_eq!(event.event_type, before.event_type);
        assert_eq!(event.date, before.date);
        assert_eq!(event.time, before.time);
    }

    #[test]
    fn test_apply_ignores_empty_values() {
        let mut event = sample(Uuid::new_v4());
        let before = event.clone();

        event.apply(EventChanges {
            title: Some(String::new()),
            description: Some(String::new()),
            image: Some(String::new()),
            ..Default::default()
        });

        assert_eq!(event, before);
    }

    #[test]
    fn test_apply_replaces_image_reference() {
        let mut event = sample(Uuid::new_v4());
        event.apply(EventChanges {
            image: Some("uploads/poster.png".into()),
            ..Default::default()
        });
        assert_eq!(event.image, "uploads/poster.png");
    }

    #[test]
    fn test_ownership_is_by_value() {
        let owner = Uuid::new_v4();
        let event = sample(owner);
        let same = Uuid::parse_str(&owner.to_string()).unwrap();
        assert!(event.is_owned_by(same));
        assert!(!event.is_owned_by(Uuid::new_v4()));
    }

    #[test]
    fn test_serializes_camel_case_with_joined_creator() {
        let owner = Uuid::new_v4();
        let event = sample(owner).with_creator(Creator {
            id: owner,
            name: Some("Asha".into()),
            email: Some("asha@college.edu".into()),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["eventType"], "Technical");
        assert_eq!(json["createdBy"]["name"], "Asha");
        assert_eq!(json["createdBy"]["id"], owner.to_string());
        assert!(json.get("event_type").is_none());
    }
}

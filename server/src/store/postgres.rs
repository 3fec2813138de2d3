use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{EventStore, StoreError, UserStore};
use crate::models::{Creator, Event, EventWithCreator, NewEvent, NewUser, User};

const EVENT_COLUMNS: &str = "id, title, description, event_type, date, time, venue, image, \
    created_by, created_at, updated_at";

/// Event columns qualified with the `e` alias plus the joined creator fields.
const JOINED_COLUMNS: &str = "e.id, e.title, e.description, e.event_type, e.date, e.time, \
    e.venue, e.image, e.created_by, e.created_at, e.updated_at, \
    u.name AS creator_name, u.email AS creator_email";

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at";

#[derive(Debug, FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: String,
    event_type: String,
    date: String,
    time: String,
    venue: String,
    image: String,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            title: row.title,
            description: row.description,
            event_type: row.event_type,
            date: row.date,
            time: row.time,
            venue: row.venue,
            image: row.image,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct JoinedEventRow {
    #[sqlx(flatten)]
    event: EventRow,
    creator_name: Option<String>,
    creator_email: Option<String>,
}

impl From<JoinedEventRow> for EventWithCreator {
    fn from(row: JoinedEventRow) -> Self {
        let creator = Creator {
            id: row.event.created_by,
            name: row.creator_name,
            email: row.creator_email,
        };
        Event::from(row.event).with_creator(creator)
    }
}

/// Escapes `LIKE` wildcards so the query is matched literally.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// PostgreSQL unique constraint violation: error code 23505.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

fn duplicate_or(err: sqlx::Error, key: &str) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Duplicate(key.to_string())
    } else {
        StoreError::Database(err)
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and applies pending migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        tracing::info!("Successfully connected to database");

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {e}")))?;

        tracing::info!("Migrations run successfully");

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn insert(&self, new: NewEvent) -> Result<Event, StoreError> {
        let query = format!(
            "INSERT INTO events
                (id, title, description, event_type, date, time, venue, image, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {EVENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, EventRow>(&query)
            .bind(Uuid::new_v4())
            .bind(&new.title)
            .bind(&new.description)
            .bind(&new.event_type)
            .bind(&new.date)
            .bind(&new.time)
            .bind(&new.venue)
            .bind(&new.image)
            .bind(new.created_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let row = sqlx::query_as::<_, EventRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Event::from))
    }

    async fn find_with_creator(
        &self,
        id: Uuid,
    ) -> Result<Option<EventWithCreator>, StoreError> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM events e LEFT JOIN users u ON u.id = e.created_by
             WHERE e.id = $1"
        );
        let row = sqlx::query_as::<_, JoinedEventRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(EventWithCreator::from))
    }

    async fn list(&self) -> Result<Vec<EventWithCreator>, StoreError> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM events e LEFT JOIN users u ON u.id = e.created_by
             ORDER BY e.created_at"
        );
        let rows = sqlx::query_as::<_, JoinedEventRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(EventWithCreator::from).collect())
    }

    async fn update(&self, event: &Event) -> Result<Option<Event>, StoreError> {
        let query = format!(
            "UPDATE events SET
                title = $1,
                description = $2,
                event_type = $3,
                date = $4,
                time = $5,
                venue = $6,
                image = $7,
                updated_at = NOW()
             WHERE id = $8
             RETURNING {EVENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, EventRow>(&query)
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.event_type)
            .bind(&event.date)
            .bind(&event.time)
            .bind(&event.venue)
            .bind(&event.image)
            .bind(event.id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Event::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, query: &str) -> Result<Vec<EventWithCreator>, StoreError> {
        let sql = format!(
            "SELECT {JOINED_COLUMNS}
             FROM events e LEFT JOIN users u ON u.id = e.created_by
             WHERE e.title ILIKE $1 ESCAPE '\\'
                OR e.description ILIKE $1 ESCAPE '\\'
                OR e.event_type ILIKE $1 ESCAPE '\\'"
        );
        let rows = sqlx::query_as::<_, JoinedEventRow>(&sql)
            .bind(like_pattern(query))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(EventWithCreator::from).collect())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let query = format!(
            "INSERT INTO users (id, name, email, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| duplicate_or(e, &new.email))?;
        Ok(user)
    }

    async fn find(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

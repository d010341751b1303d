mod memory;
mod seed;
mod sqlite;

use anyhow::Result;
use campus_core::{ChatMessage, Course, Enrollment, NewEnrollment, SessionRecord};
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use memory::MemoryStore;
pub use seed::{sample_courses, seed_catalog, SeedOutcome};
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("course `{0}` already exists")]
    DuplicateCourse(String),
    #[error("session `{0}` already exists")]
    DuplicateSession(String),
}

/// Catalog access. `list_courses` is the full scan and returns courses in
/// insertion order.
pub trait CourseRepository: Send + Sync {
    async fn list_courses(&self) -> Result<Vec<Course>>;
    async fn find_course(&self, code: &str) -> Result<Option<Course>>;
    async fn insert_course(&self, course: &Course) -> Result<()>;
    async fn count_courses(&self) -> Result<u64>;
}

pub trait SessionRepository: Send + Sync {
    async fn find_session(&self, session_id: &str) -> Result<Option<SessionRecord>>;
    async fn insert_session(&self, session: &SessionRecord) -> Result<()>;
    async fn sessions_for_email(&self, email: &str) -> Result<Vec<SessionRecord>>;
}

pub trait EnrollmentRepository: Send + Sync {
    async fn insert_enrollment(
        &self,
        enrollment: &NewEnrollment,
        enrolled_at: DateTime<Utc>,
    ) -> Result<Enrollment>;
    async fn list_enrollments(&self) -> Result<Vec<Enrollment>>;
}

/// Append-only chat log.
pub trait MessageRepository: Send + Sync {
    async fn append_message(&self, message: &ChatMessage) -> Result<()>;
    async fn messages_for_session(&self, session_id: &str) -> Result<Vec<ChatMessage>>;
}

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub async fn sqlite(database_url: &str) -> Result<Self> {
        let sqlite = SqliteStore::connect(database_url).await?;
        Ok(Self::Sqlite(sqlite))
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Store::Memory(_) => "memory",
            Store::Sqlite(_) => "sqlite",
        }
    }
}

impl CourseRepository for Store {
    async fn list_courses(&self) -> Result<Vec<Course>> {
        match self {
            Store::Memory(store) => store.list_courses().await,
            Store::Sqlite(store) => store.list_courses().await,
        }
    }

    async fn find_course(&self, code: &str) -> Result<Option<Course>> {
        match self {
            Store::Memory(store) => store.find_course(code).await,
            Store::Sqlite(store) => store.find_course(code).await,
        }
    }

    async fn insert_course(&self, course: &Course) -> Result<()> {
        match self {
            Store::Memory(store) => store.insert_course(course).await,
            Store::Sqlite(store) => store.insert_course(course).await,
        }
    }

    async fn count_courses(&self) -> Result<u64> {
        match self {
            Store::Memory(store) => store.count_courses().await,
            Store::Sqlite(store) => store.count_courses().await,
        }
    }
}

impl SessionRepository for Store {
    async fn find_session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        match self {
            Store::Memory(store) => store.find_session(session_id).await,
            Store::Sqlite(store) => store.find_session(session_id).await,
        }
    }

    async fn insert_session(&self, session: &SessionRecord) -> Result<()> {
        match self {
            Store::Memory(store) => store.insert_session(session).await,
            Store::Sqlite(store) => store.insert_session(session).await,
        }
    }

    async fn sessions_for_email(&self, email: &str) -> Result<Vec<SessionRecord>> {
        match self {
            Store::Memory(store) => store.sessions_for_email(email).await,
            Store::Sqlite(store) => store.sessions_for_email(email).await,
        }
    }
}

impl EnrollmentRepository for Store {
    async fn insert_enrollment(
        &self,
        enrollment: &NewEnrollment,
        enrolled_at: DateTime<Utc>,
    ) -> Result<Enrollment> {
        match self {
            Store::Memory(store) => store.insert_enrollment(enrollment, enrolled_at).await,
            Store::Sqlite(store) => store.insert_enrollment(enrollment, enrolled_at).await,
        }
    }

    async fn list_enrollments(&self) -> Result<Vec<Enrollment>> {
        match self {
            Store::Memory(store) => store.list_enrollments().await,
            Store::Sqlite(store) => store.list_enrollments().await,
        }
    }
}

impl MessageRepository for Store {
    async fn append_message(&self, message: &ChatMessage) -> Result<()> {
        match self {
            Store::Memory(store) => store.append_message(message).await,
            Store::Sqlite(store) => store.append_message(message).await,
        }
    }

    async fn messages_for_session(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        match self {
            Store::Memory(store) => store.messages_for_session(session_id).await,
            Store::Sqlite(store) => store.messages_for_session(session_id).await,
        }
    }
}

use std::str::FromStr;

use anyhow::{Context, Result};
use campus_core::{
    ChatMessage, Course, Enrollment, Intent, KeywordSet, NewEnrollment, SessionRecord,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::{
    CourseRepository, EnrollmentRepository, MessageRepository, SessionRepository, StorageError,
};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid sqlite url {}", database_url))?
            .create_if_missing(true);

        // An in-memory database lives only as long as its single connection.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("failed connecting to sqlite at {}", database_url))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS courses (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              code TEXT NOT NULL UNIQUE,
              name TEXT NOT NULL,
              category TEXT NOT NULL,
              instructor TEXT NOT NULL,
              keywords TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              session_id TEXT NOT NULL UNIQUE,
              user_email TEXT,
              started_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS enrollments (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              session_id TEXT NOT NULL,
              course_code TEXT NOT NULL REFERENCES courses(code),
              student_name TEXT NOT NULL,
              student_email TEXT NOT NULL,
              enrolled_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              session_id TEXT NOT NULL,
              user_message TEXT NOT NULL,
              bot_response TEXT NOT NULL,
              intent TEXT NOT NULL,
              created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn course_from_row(row: &SqliteRow) -> Course {
    Course {
        code: row.get("code"),
        name: row.get("name"),
        category: row.get("category"),
        instructor: row.get("instructor"),
        keywords: KeywordSet::parse_joined(row.get::<String, _>("keywords").as_str()),
    }
}

fn session_from_row(row: &SqliteRow) -> SessionRecord {
    SessionRecord {
        session_id: row.get("session_id"),
        user_email: row.get("user_email"),
        started_at: parse_timestamp(row.get("started_at")),
    }
}

fn enrollment_from_row(row: &SqliteRow) -> Enrollment {
    Enrollment {
        id: row.get("id"),
        session_id: row.get("session_id"),
        course_code: row.get("course_code"),
        student_name: row.get("student_name"),
        student_email: row.get("student_email"),
        enrolled_at: parse_timestamp(row.get("enrolled_at")),
    }
}

/// Rows with an unreadable timestamp are still returned, stamped with the
/// read time.
fn parse_timestamp(value: String) -> DateTime<Utc> {
    match value.parse() {
        Ok(timestamp) => timestamp,
        Err(error) => {
            tracing::warn!(value = %value, error = %error, "unreadable stored timestamp");
            Utc::now()
        }
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|db_error| db_error.is_unique_violation())
}

impl CourseRepository for SqliteStore {
    async fn list_courses(&self) -> Result<Vec<Course>> {
        let rows = sqlx::query(
            r#"
            SELECT code, name, category, instructor, keywords
            FROM courses
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(course_from_row).collect())
    }

    async fn find_course(&self, code: &str) -> Result<Option<Course>> {
        let row = sqlx::query(
            r#"
            SELECT code, name, category, instructor, keywords
            FROM courses
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(course_from_row))
    }

    async fn insert_course(&self, course: &Course) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO courses (code, name, category, instructor, keywords)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&course.code)
        .bind(&course.name)
        .bind(&course.category)
        .bind(&course.instructor)
        .bind(course.keywords.to_joined())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) if is_unique_violation(&error) => {
                Err(StorageError::DuplicateCourse(course.code.clone()).into())
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn count_courses(&self) -> Result<u64> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS total FROM courses")
            .fetch_one(&self.pool)
            .await?
            .get("total");

        Ok(count.max(0) as u64)
    }
}

impl SessionRepository for SqliteStore {
    async fn find_session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let row = sqlx::query(
            r#"
            SELECT session_id, user_email, started_at
            FROM sessions
            WHERE session_id = ?1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(session_from_row))
    }

    async fn insert_session(&self, session: &SessionRecord) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO sessions (session_id, user_email, started_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(&session.session_id)
        .bind(&session.user_email)
        .bind(session.started_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) if is_unique_violation(&error) => {
                Err(StorageError::DuplicateSession(session.session_id.clone()).into())
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn sessions_for_email(&self, email: &str) -> Result<Vec<SessionRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT session_id, user_email, started_at
            FROM sessions
            WHERE user_email = ?1
            ORDER BY id
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(session_from_row).collect())
    }
}

impl EnrollmentRepository for SqliteStore {
    async fn insert_enrollment(
        &self,
        enrollment: &NewEnrollment,
        enrolled_at: DateTime<Utc>,
    ) -> Result<Enrollment> {
        let result = sqlx::query(
            r#"
            INSERT INTO enrollments (session_id, course_code, student_name, student_email, enrolled_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&enrollment.session_id)
        .bind(&enrollment.course_code)
        .bind(&enrollment.student_name)
        .bind(&enrollment.student_email)
        .bind(enrolled_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Enrollment {
            id: result.last_insert_rowid(),
            session_id: enrollment.session_id.clone(),
            course_code: enrollment.course_code.clone(),
            student_name: enrollment.student_name.clone(),
            student_email: enrollment.student_email.clone(),
            enrolled_at,
        })
    }

    async fn list_enrollments(&self) -> Result<Vec<Enrollment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, session_id, course_code, student_name, student_email, enrolled_at
            FROM enrollments
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(enrollment_from_row).collect())
    }
}

impl MessageRepository for SqliteStore {
    async fn append_message(&self, message: &ChatMessage) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO messages (session_id, user_message, bot_response, intent, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&message.session_id)
        .bind(&message.user_message)
        .bind(&message.bot_response)
        .bind(message.intent.as_label())
        .bind(message.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn messages_for_session(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query(
            r#"
            SELECT session_id, user_message, bot_response, intent, created_at
            FROM messages
            WHERE session_id = ?1
            ORDER BY id
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        let messages = rows
            .into_iter()
            .map(|row| ChatMessage {
                session_id: row.get("session_id"),
                user_message: row.get("user_message"),
                bot_response: row.get("bot_response"),
                intent: Intent::from_label(row.get::<String, _>("intent").as_str()),
                created_at: parse_timestamp(row.get("created_at")),
            })
            .collect();

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite should open")
    }

    fn course(code: &str, name: &str, keywords: &str) -> Course {
        Course {
            code: code.to_string(),
            name: name.to_string(),
            category: "AI".to_string(),
            instructor: "Dr. Meera Iyer".to_string(),
            keywords: KeywordSet::parse_joined(keywords),
        }
    }

    fn message(session_id: &str, user_message: &str, intent: Intent) -> ChatMessage {
        ChatMessage {
            session_id: session_id.to_string(),
            user_message: user_message.to_string(),
            bot_response: "ok".to_string(),
            intent,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn courses_list_in_insertion_order() {
        let store = store().await;
        for code in ["DL301", "CS102", "ML201"] {
            store
                .insert_course(&course(code, code, "ai"))
                .await
                .unwrap();
        }

        let codes = store
            .list_courses()
            .await
            .unwrap()
            .into_iter()
            .map(|course| course.code)
            .collect::<Vec<_>>();
        assert_eq!(codes, vec!["DL301", "CS102", "ML201"]);
        assert_eq!(store.count_courses().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn enrollments_take_row_ids_and_list_in_order() {
        let store = store().await;
        store
            .insert_course(&course("CS102", "Python for AI", "python"))
            .await
            .unwrap();
        store
            .insert_course(&course("NLP201", "NLP Basics", "nlp"))
            .await
            .unwrap();

        let enrolled_at = Utc::now();
        let first = store
            .insert_enrollment(
                &NewEnrollment {
                    session_id: "Noon".to_string(),
                    student_email: "rahul@gmail.com".to_string(),
                    student_name: "Rahul".to_string(),
                    course_code: "CS102".to_string(),
                },
                enrolled_at,
            )
            .await
            .unwrap();
        let second = store
            .insert_enrollment(
                &NewEnrollment {
                    session_id: "Eve".to_string(),
                    student_email: "asha@gmail.com".to_string(),
                    student_name: "Asha".to_string(),
                    course_code: "NLP201".to_string(),
                },
                enrolled_at,
            )
            .await
            .unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        let listed = store.list_enrollments().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, 1);
        assert_eq!(listed[0].course_code, "CS102");
        assert_eq!(listed[0].student_name, "Rahul");
        assert_eq!(listed[0].enrolled_at.timestamp(), enrolled_at.timestamp());
        assert_eq!(listed[1].id, 2);
        assert_eq!(listed[1].session_id, "Eve");
    }

    #[tokio::test]
    async fn session_messages_come_back_in_append_order() {
        let store = store().await;
        store
            .append_message(&message("Noon", "hello", Intent::Greeting))
            .await
            .unwrap();
        store
            .append_message(&message("Eve", "bye", Intent::Exit))
            .await
            .unwrap();
        store
            .append_message(&message("Noon", "list courses", Intent::ListCourses))
            .await
            .unwrap();
        store
            .append_message(&message("Noon", "any nlp?", Intent::SearchCourse))
            .await
            .unwrap();

        let texts = store
            .messages_for_session("Noon")
            .await
            .unwrap()
            .into_iter()
            .map(|message| message.user_message)
            .collect::<Vec<_>>();
        assert_eq!(texts, vec!["hello", "list courses", "any nlp?"]);
    }

    #[tokio::test]
    async fn unreadable_timestamps_still_load() {
        let store = store().await;
        sqlx::query(
            r#"
            INSERT INTO messages (session_id, user_message, bot_response, intent, created_at)
            VALUES ('Noon', 'hello', 'hi there', 'greeting', 'not-a-date')
            "#,
        )
        .execute(&store.pool)
        .await
        .unwrap();

        let before = Utc::now();
        let messages = store.messages_for_session("Noon").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].intent, Intent::Greeting);
        assert!(messages[0].created_at >= before);
    }

    #[tokio::test]
    async fn keyword_sets_survive_the_joined_column() {
        let store = store().await;
        let course = Course {
            code: "DL301".to_string(),
            name: "Deep Learning".to_string(),
            category: "Deep Learning".to_string(),
            instructor: "Dr. Kavita Reddy".to_string(),
            keywords: KeywordSet::parse_joined("deep learning,neural networks,tensorflow"),
        };
        store.insert_course(&course).await.unwrap();

        let loaded = store.find_course("DL301").await.unwrap().unwrap();
        assert_eq!(loaded, course);
        assert_eq!(
            loaded.keywords.to_joined(),
            "deep learning,neural networks,tensorflow"
        );
    }

    #[tokio::test]
    async fn duplicate_course_maps_to_storage_error() {
        let store = store().await;
        let course = Course {
            code: "NLP201".to_string(),
            name: "NLP Basics".to_string(),
            category: "NLP".to_string(),
            instructor: "Dr. Rohan Sharma".to_string(),
            keywords: KeywordSet::new(["nlp"]),
        };
        store.insert_course(&course).await.unwrap();

        let error = store.insert_course(&course).await.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<StorageError>(),
            Some(StorageError::DuplicateCourse(_))
        ));
    }

    #[tokio::test]
    async fn chat_messages_keep_intent_labels() {
        let store = store().await;
        store
            .append_message(&ChatMessage {
                session_id: "Eve".to_string(),
                user_message: "list courses".to_string(),
                bot_response: "Available courses: ".to_string(),
                intent: Intent::ListCourses,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let messages = store.messages_for_session("Eve").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].intent, Intent::ListCourses);
    }

    #[tokio::test]
    async fn sessions_are_found_by_email() {
        let store = store().await;
        let session = SessionRecord {
            session_id: "Noon".to_string(),
            user_email: Some("rahul@gmail.com".to_string()),
            started_at: Utc::now(),
        };
        store.insert_session(&session).await.unwrap();

        assert!(store.find_session("Noon").await.unwrap().is_some());
        assert_eq!(
            store
                .sessions_for_email("rahul@gmail.com")
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(store.insert_session(&session).await.is_err());
    }
}

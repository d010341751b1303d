mod error;

use std::sync::Arc;
use std::time::Instant;

use campus_core::search::NO_MATCH_REPLY;
use campus_core::{
    classify, reply_for, search_catalog, ChatInput, ChatMessage, ChatReply, Course, CoreError,
    Enrollment, Intent, NewEnrollment, SessionRecord,
};
use campus_observability::AppMetrics;
use campus_storage::{
    CourseRepository, EnrollmentRepository, MessageRepository, SessionRepository, StorageError,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument, warn};

pub use error::AssistantError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStart {
    Created,
    AlreadyExists,
}

impl SessionStart {
    pub fn message(self) -> &'static str {
        match self {
            Self::Created => "New session started.",
            Self::AlreadyExists => "Session already exists.",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentReceipt {
    pub enrollment: Enrollment,
    pub course_name: String,
}

impl EnrollmentReceipt {
    pub fn message(&self) -> String {
        format!("Enrolled successfully in {}!", self.course_name)
    }
}

/// Application service over a store. Each chat turn is classified on its
/// own; the only state carried between calls lives in the store.
#[derive(Clone)]
pub struct CampusAssistant<S>
where
    S: CourseRepository + SessionRepository + EnrollmentRepository + MessageRepository,
{
    store: Arc<S>,
    metrics: Arc<AppMetrics>,
}

impl<S> CampusAssistant<S>
where
    S: CourseRepository + SessionRepository + EnrollmentRepository + MessageRepository,
{
    pub fn new(store: Arc<S>, metrics: Arc<AppMetrics>) -> Self {
        Self { store, metrics }
    }

    pub fn metrics(&self) -> &AppMetrics {
        &self.metrics
    }

    #[instrument(skip(self, input), fields(session_id = %input.session_id))]
    pub async fn handle_chat(&self, input: ChatInput) -> Result<ChatReply, AssistantError> {
        let started = Instant::now();
        self.metrics.inc_request();

        let intent = classify(&input.user_message);
        let catalog = match intent {
            Intent::ListCourses | Intent::SearchCourse => self.store.list_courses().await?,
            _ => Vec::new(),
        };
        let bot_response = reply_for(intent, &input.user_message, &catalog);

        if intent == Intent::SearchCourse && bot_response == NO_MATCH_REPLY {
            self.metrics.inc_search_miss();
        }

        self.store
            .append_message(&ChatMessage {
                session_id: input.session_id.clone(),
                user_message: input.user_message,
                bot_response: bot_response.clone(),
                intent,
                created_at: Utc::now(),
            })
            .await?;

        self.metrics.inc_chat_turn();
        self.metrics.observe_latency(started.elapsed());
        info!(intent = %intent, catalog = catalog.len(), "chat handled");

        Ok(ChatReply {
            bot_response,
            intent,
        })
    }

    pub async fn start_session(
        &self,
        session_id: &str,
        user_email: Option<String>,
    ) -> Result<SessionStart, AssistantError> {
        self.metrics.inc_request();

        if self.store.find_session(session_id).await?.is_some() {
            return Ok(SessionStart::AlreadyExists);
        }

        let session = SessionRecord {
            session_id: session_id.to_string(),
            user_email,
            started_at: Utc::now(),
        };

        match self.store.insert_session(&session).await {
            Ok(()) => {
                info!(session_id, "session started");
                Ok(SessionStart::Created)
            }
            Err(error)
                if matches!(
                    error.downcast_ref::<StorageError>(),
                    Some(StorageError::DuplicateSession(_))
                ) =>
            {
                Ok(SessionStart::AlreadyExists)
            }
            Err(error) => Err(error.into()),
        }
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>, AssistantError> {
        self.metrics.inc_request();
        Ok(self.store.list_courses().await?)
    }

    pub async fn search_catalog(&self, keyword: &str) -> Result<Vec<Course>, AssistantError> {
        self.metrics.inc_request();
        let catalog = self.store.list_courses().await?;

        search_catalog(&catalog, keyword).map_err(|error| match error {
            CoreError::NoMatchingCourses { keyword } => {
                self.metrics.inc_search_miss();
                AssistantError::NoMatchingCourses(keyword)
            }
        })
    }

    /// Records an enrollment for an existing course. The chat `enroll` intent
    /// only prompts for details; this is the write path.
    pub async fn enroll(&self, request: NewEnrollment) -> Result<EnrollmentReceipt, AssistantError> {
        self.metrics.inc_request();

        let Some(course) = self.store.find_course(&request.course_code).await? else {
            warn!(course_code = %request.course_code, "enrollment for unknown course");
            return Err(AssistantError::CourseNotFound(request.course_code));
        };

        let enrollment = self
            .store
            .insert_enrollment(&request, Utc::now())
            .await?;
        self.metrics.inc_enrollment();
        info!(
            course_code = %course.code,
            session_id = %enrollment.session_id,
            "enrollment recorded"
        );

        Ok(EnrollmentReceipt {
            enrollment,
            course_name: course.name,
        })
    }

    pub async fn list_enrollments(&self) -> Result<Vec<Enrollment>, AssistantError> {
        self.metrics.inc_request();
        Ok(self.store.list_enrollments().await?)
    }

    /// Messages of every session registered under `email`, session by session.
    pub async fn chat_history(&self, email: &str) -> Result<Vec<ChatMessage>, AssistantError> {
        self.metrics.inc_request();

        let sessions = self.store.sessions_for_email(email).await?;
        if sessions.is_empty() {
            return Err(AssistantError::NoSessionsForEmail(email.to_string()));
        }

        let mut history = Vec::new();
        for session in &sessions {
            history.extend(self.store.messages_for_session(&session.session_id).await?);
        }

        Ok(history)
    }
}

use std::sync::Arc;

use anyhow::Result;
use campus_core::{ChatMessage, Course, Enrollment, NewEnrollment, SessionRecord};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::{
    CourseRepository, EnrollmentRepository, MessageRepository, SessionRepository, StorageError,
};

#[derive(Clone, Default)]
pub struct MemoryStore {
    courses: Arc<RwLock<Vec<Course>>>,
    sessions: Arc<RwLock<Vec<SessionRecord>>>,
    enrollments: Arc<RwLock<Vec<Enrollment>>>,
    messages: Arc<RwLock<Vec<ChatMessage>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CourseRepository for MemoryStore {
    async fn list_courses(&self) -> Result<Vec<Course>> {
        Ok(self.courses.read().clone())
    }

    async fn find_course(&self, code: &str) -> Result<Option<Course>> {
        Ok(self
            .courses
            .read()
            .iter()
            .find(|course| course.code == code)
            .cloned())
    }

    async fn insert_course(&self, course: &Course) -> Result<()> {
        let mut courses = self.courses.write();
        if courses.iter().any(|existing| existing.code == course.code) {
            return Err(StorageError::DuplicateCourse(course.code.clone()).into());
        }
        courses.push(course.clone());
        Ok(())
    }

    async fn count_courses(&self) -> Result<u64> {
        Ok(self.courses.read().len() as u64)
    }
}

impl SessionRepository for MemoryStore {
    async fn find_session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        Ok(self
            .sessions
            .read()
            .iter()
            .find(|session| session.session_id == session_id)
            .cloned())
    }

    async fn insert_session(&self, session: &SessionRecord) -> Result<()> {
        let mut sessions = self.sessions.write();
        if sessions
            .iter()
            .any(|existing| existing.session_id == session.session_id)
        {
            return Err(StorageError::DuplicateSession(session.session_id.clone()).into());
        }
        sessions.push(session.clone());
        Ok(())
    }

    async fn sessions_for_email(&self, email: &str) -> Result<Vec<SessionRecord>> {
        Ok(self
            .sessions
            .read()
            .iter()
            .filter(|session| session.user_email.as_deref() == Some(email))
            .cloned()
            .collect())
    }
}

impl EnrollmentRepository for MemoryStore {
    async fn insert_enrollment(
        &self,
        enrollment: &NewEnrollment,
        enrolled_at: DateTime<Utc>,
    ) -> Result<Enrollment> {
        let mut enrollments = self.enrollments.write();
        let record = Enrollment {
            id: enrollments.len() as i64 + 1,
            session_id: enrollment.session_id.clone(),
            course_code: enrollment.course_code.clone(),
            student_name: enrollment.student_name.clone(),
            student_email: enrollment.student_email.clone(),
            enrolled_at,
        };
        enrollments.push(record.clone());
        Ok(record)
    }

    async fn list_enrollments(&self) -> Result<Vec<Enrollment>> {
        Ok(self.enrollments.read().clone())
    }
}

impl MessageRepository for MemoryStore {
    async fn append_message(&self, message: &ChatMessage) -> Result<()> {
        self.messages.write().push(message.clone());
        Ok(())
    }

    async fn messages_for_session(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        Ok(self
            .messages
            .read()
            .iter()
            .filter(|message| message.session_id == session_id)
            .cloned()
            .collect())
    }
}

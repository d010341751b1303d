use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("course `{0}` not found")]
    CourseNotFound(String),
    #[error("no courses found matching `{0}`")]
    NoMatchingCourses(String),
    #[error("no sessions found for `{0}`")]
    NoSessionsForEmail(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("no courses found matching `{keyword}`")]
    NoMatchingCourses { keyword: String },
}

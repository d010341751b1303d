pub mod composer;
pub mod error;
pub mod intent;
pub mod models;
pub mod search;

pub use composer::{compose_reply, reply_for, ReplyPayload};
pub use error::CoreError;
pub use intent::{classify, search_terms};
pub use models::*;
pub use search::{
    course_line, course_lines, find_courses, matching_lines, search_by_any_keyword,
    search_by_keyword, search_catalog,
};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    ListCourses,
    Enroll,
    SearchCourse,
    Exit,
    Unknown,
}

impl Intent {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::ListCourses => "list_courses",
            Self::Enroll => "enroll",
            Self::SearchCourse => "search_course",
            Self::Exit => "exit",
            Self::Unknown => "unknown",
        }
    }

    /// Labels that do not name an intent map to `Unknown`.
    pub fn from_label(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "greeting" => Self::Greeting,
            "list_courses" => Self::ListCourses,
            "enroll" => Self::Enroll,
            "search_course" => Self::SearchCourse,
            "exit" => Self::Exit,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Lowercase tags attached to a course. Insertion order is kept so the
/// persisted form stays stable; duplicates and blank tokens are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KeywordSet {
    tokens: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for token in tokens {
            set.insert(token.as_ref());
        }
        set
    }

    /// Parses the comma-joined storage form, e.g. `"python,beginner"`.
    pub fn parse_joined(joined: &str) -> Self {
        Self::new(joined.split(','))
    }

    pub fn to_joined(&self) -> String {
        self.tokens.join(",")
    }

    pub fn insert(&mut self, token: &str) -> bool {
        let token = token.trim().to_lowercase();
        if token.is_empty() || self.tokens.contains(&token) {
            return false;
        }
        self.tokens.push(token);
        true
    }

    /// Substring containment against the whole comma-joined field, so a
    /// needle may span a token boundary. `needle` must already be lowercase.
    pub fn contains_fragment(&self, needle: &str) -> bool {
        self.to_joined().contains(needle)
    }
}

impl From<Vec<String>> for KeywordSet {
    fn from(tokens: Vec<String>) -> Self {
        Self::new(tokens)
    }
}

impl From<KeywordSet> for Vec<String> {
    fn from(set: KeywordSet) -> Self {
        set.tokens
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub code: String,
    pub name: String,
    pub category: String,
    pub instructor: String,
    pub keywords: KeywordSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub user_email: Option<String>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEnrollment {
    pub session_id: String,
    pub student_email: String,
    pub student_name: String,
    pub course_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub session_id: String,
    pub course_code: String,
    pub student_name: String,
    pub student_email: String,
    pub enrolled_at: DateTime<Utc>,
}

/// One persisted chat turn. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub session_id: String,
    pub user_message: String,
    pub bot_response: String,
    pub intent: Intent,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInput {
    pub session_id: String,
    pub user_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub bot_response: String,
    pub intent: Intent,
}

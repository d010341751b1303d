use crate::intent::search_terms;
use crate::models::{Course, Intent};
use crate::search::{matching_lines, NO_MATCH_REPLY};

pub const GREETING_REPLY: &str = "Hello! I can help you explore AI/ML courses.";
pub const ENROLL_REPLY: &str = "To enroll, please provide your course code and details.";
pub const EXIT_REPLY: &str = "Goodbye! Have a great day!";
pub const UNKNOWN_REPLY: &str = "Sorry, I didn't understand that.";

/// Data the composer needs for intents that depend on the catalog.
#[derive(Debug, Clone, Copy)]
pub enum ReplyPayload<'a> {
    None,
    Catalog(&'a [Course]),
    SearchLines(&'a [String]),
}

/// Renders the reply for an intent. A payload that does not fit the intent
/// is treated as empty.
pub fn compose_reply(intent: Intent, payload: ReplyPayload<'_>) -> String {
    match intent {
        Intent::Greeting => GREETING_REPLY.to_string(),
        Intent::ListCourses => {
            let names = match payload {
                ReplyPayload::Catalog(courses) => courses
                    .iter()
                    .map(|course| course.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => String::new(),
            };
            format!("Available courses: {names}")
        }
        Intent::SearchCourse => match payload {
            ReplyPayload::SearchLines(lines) if !lines.is_empty() => lines.join("\n"),
            _ => NO_MATCH_REPLY.to_string(),
        },
        Intent::Enroll => ENROLL_REPLY.to_string(),
        Intent::Exit => EXIT_REPLY.to_string(),
        Intent::Unknown => UNKNOWN_REPLY.to_string(),
    }
}

/// Builds the payload an intent needs from the catalog snapshot and composes
/// the reply.
pub fn reply_for(intent: Intent, message: &str, catalog: &[Course]) -> String {
    match intent {
        Intent::ListCourses => compose_reply(intent, ReplyPayload::Catalog(catalog)),
        Intent::SearchCourse => {
            let terms = search_terms(message);
            let lines = if terms.is_empty() {
                matching_lines(catalog, &[message])
            } else {
                matching_lines(catalog, terms.as_slice())
            };
            compose_reply(intent, ReplyPayload::SearchLines(&lines))
        }
        _ => compose_reply(intent, ReplyPayload::None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::classify;
    use crate::models::KeywordSet;

    fn course(code: &str, name: &str, instructor: &str, keywords: &[&str]) -> Course {
        Course {
            code: code.to_string(),
            name: name.to_string(),
            category: "AI Fundamentals".to_string(),
            instructor: instructor.to_string(),
            keywords: KeywordSet::new(keywords.iter().copied()),
        }
    }

    #[test]
    fn lists_names_in_catalog_order() {
        let catalog = vec![
            course("B2", "CourseB", "Dr. B", &["b"]),
            course("A1", "CourseA", "Dr. A", &["a"]),
        ];
        assert_eq!(
            compose_reply(Intent::ListCourses, ReplyPayload::Catalog(&catalog)),
            "Available courses: CourseB, CourseA"
        );
    }

    #[test]
    fn empty_catalog_lists_nothing() {
        assert_eq!(
            compose_reply(Intent::ListCourses, ReplyPayload::Catalog(&[])),
            "Available courses: "
        );
    }

    #[test]
    fn search_without_lines_uses_sentinel() {
        assert_eq!(
            compose_reply(Intent::SearchCourse, ReplyPayload::SearchLines(&[])),
            "No matching courses found."
        );
    }

    #[test]
    fn fixed_replies() {
        assert_eq!(
            compose_reply(Intent::Greeting, ReplyPayload::None),
            "Hello! I can help you explore AI/ML courses."
        );
        assert_eq!(compose_reply(Intent::Exit, ReplyPayload::None), EXIT_REPLY);
        assert_eq!(compose_reply(Intent::Enroll, ReplyPayload::None), ENROLL_REPLY);
        assert_eq!(
            compose_reply(Intent::Unknown, ReplyPayload::None),
            "Sorry, I didn't understand that."
        );
    }

    #[test]
    fn python_question_finds_the_python_course() {
        let catalog = vec![course(
            "CS102",
            "Python for AI",
            "Dr. Meera Iyer",
            &["python", "beginner"],
        )];
        let message = "do you have python courses?";
        let intent = classify(message);

        assert_eq!(intent, Intent::SearchCourse);
        assert_eq!(
            reply_for(intent, message, &catalog),
            "CS102 - Python for AI (Dr. Meera Iyer)"
        );
    }

    #[test]
    fn several_triggers_list_every_match_in_catalog_order() {
        let catalog = vec![
            course("CS102", "Python for AI", "Dr. Meera Iyer", &["python", "beginner"]),
            course("DL301", "Deep Learning", "Dr. Kavita Reddy", &["tensorflow"]),
            course("NLP201", "NLP Basics", "Dr. Rohan Sharma", &["nlp", "text"]),
        ];
        let message = "python or nlp courses?";

        assert_eq!(classify(message), Intent::SearchCourse);
        assert_eq!(
            reply_for(Intent::SearchCourse, message, &catalog),
            "CS102 - Python for AI (Dr. Meera Iyer)\nNLP201 - NLP Basics (Dr. Rohan Sharma)"
        );
    }

    #[test]
    fn search_miss_returns_sentinel() {
        let catalog = vec![course("DL301", "Deep Learning", "Dr. Kavita Reddy", &["tensorflow"])];
        assert_eq!(
            reply_for(Intent::SearchCourse, "any nlp?", &catalog),
            NO_MATCH_REPLY
        );
    }
}

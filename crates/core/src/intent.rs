use crate::models::Intent;

const GREETING_TERMS: &[&str] = &["hi", "hello"];
const LIST_TERMS: &[&str] = &["list", "show"];
const ENROLL_TERMS: &[&str] = &["enroll"];
const SEARCH_TERMS: &[&str] = &["python", "ml", "deep learning", "nlp"];
const EXIT_TERMS: &[&str] = &["bye"];

/// Ordered rule list; the first rule with a matching term wins.
const RULES: &[(&[&str], Intent)] = &[
    (GREETING_TERMS, Intent::Greeting),
    (LIST_TERMS, Intent::ListCourses),
    (ENROLL_TERMS, Intent::Enroll),
    (SEARCH_TERMS, Intent::SearchCourse),
    (EXIT_TERMS, Intent::Exit),
];

/// Classifies a message with plain substring checks. "hi" matches inside
/// words too ("this", "machine"), which is why greeting shadows most rules.
pub fn classify(message: &str) -> Intent {
    let lower = message.to_lowercase();

    RULES
        .iter()
        .find(|(terms, _)| contains_any(&lower, terms))
        .map(|(_, intent)| *intent)
        .unwrap_or(Intent::Unknown)
}

/// Every course-search trigger present in the message, in rule order.
pub fn search_terms(message: &str) -> Vec<&'static str> {
    let lower = message.to_lowercase();
    SEARCH_TERMS
        .iter()
        .copied()
        .filter(|term| lower.contains(term))
        .collect()
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}

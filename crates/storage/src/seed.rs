use anyhow::{Context, Result};
use campus_core::{Course, KeywordSet};
use tracing::info;

use crate::CourseRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded(usize),
    AlreadyPresent(u64),
}

pub fn sample_courses() -> Vec<Course> {
    [
        (
            "CS102",
            "Python for AI",
            "AI Fundamentals",
            "Dr. Meera Iyer",
            "python,beginner,programming,aiml",
        ),
        (
            "ML201",
            "ML Fundamentals",
            "Machine Learning",
            "Prof. Arjun Nair",
            "machine learning,ml,supervised",
        ),
        (
            "DL301",
            "Deep Learning",
            "Deep Learning",
            "Dr. Kavita Reddy",
            "deep learning,neural networks,tensorflow",
        ),
        (
            "NLP201",
            "NLP Basics",
            "NLP",
            "Dr. Rohan Sharma",
            "nlp,text,language",
        ),
    ]
    .into_iter()
    .map(|(code, name, category, instructor, keywords)| Course {
        code: code.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        instructor: instructor.to_string(),
        keywords: KeywordSet::parse_joined(keywords),
    })
    .collect()
}

/// Inserts `courses` only when the catalog is empty, so it is safe to call on
/// every startup.
pub async fn seed_catalog<R>(repo: &R, courses: &[Course]) -> Result<SeedOutcome>
where
    R: CourseRepository,
{
    let existing = repo.count_courses().await?;
    if existing > 0 {
        info!(courses = existing, "catalog already populated");
        return Ok(SeedOutcome::AlreadyPresent(existing));
    }

    for course in courses {
        repo.insert_course(course)
            .await
            .with_context(|| format!("failed seeding course {}", course.code))?;
    }

    info!(courses = courses.len(), "catalog seeded");
    Ok(SeedOutcome::Seeded(courses.len()))
}

use crate::error::CoreError;
use crate::models::Course;

pub const NO_MATCH_REPLY: &str = "No matching courses found.";

/// Scans the catalog in order. The keyword is lowercased and matched as a
/// substring of the comma-joined keyword field, and of the course name when
/// `match_name_too` is set.
pub fn search_by_keyword<'a>(
    catalog: &'a [Course],
    keyword: &str,
    match_name_too: bool,
) -> Vec<&'a Course> {
    search_by_any_keyword(catalog, &[keyword], match_name_too)
}

/// Like `search_by_keyword`, but a course matches when any of the keywords
/// does. Each course appears at most once, in catalog order.
pub fn search_by_any_keyword<'a, K: AsRef<str>>(
    catalog: &'a [Course],
    keywords: &[K],
    match_name_too: bool,
) -> Vec<&'a Course> {
    let needles = keywords
        .iter()
        .map(|keyword| keyword.as_ref().to_lowercase())
        .collect::<Vec<_>>();

    catalog
        .iter()
        .filter(|course| {
            let name = course.name.to_lowercase();
            needles.iter().any(|needle| {
                course.keywords.contains_fragment(needle)
                    || (match_name_too && name.contains(needle.as_str()))
            })
        })
        .collect()
}

pub fn course_line(course: &Course) -> String {
    format!("{} - {} ({})", course.code, course.name, course.instructor)
}

/// Chat-path search: keyword set only, one display line per match.
pub fn course_lines(catalog: &[Course], keyword: &str) -> Vec<String> {
    matching_lines(catalog, &[keyword])
}

/// Chat-path search over several keywords, merged in catalog order.
pub fn matching_lines<K: AsRef<str>>(catalog: &[Course], keywords: &[K]) -> Vec<String> {
    search_by_any_keyword(catalog, keywords, false)
        .into_iter()
        .map(course_line)
        .collect()
}

pub fn find_courses(catalog: &[Course], keyword: &str) -> String {
    let lines = course_lines(catalog, keyword);
    if lines.is_empty() {
        NO_MATCH_REPLY.to_string()
    } else {
        lines.join("\n")
    }
}

/// Catalog-path search: keyword set or name. An empty result is reported as
/// `CoreError::NoMatchingCourses`.
pub fn search_catalog(catalog: &[Course], keyword: &str) -> Result<Vec<Course>, CoreError> {
    let found = search_by_keyword(catalog, keyword, true)
        .into_iter()
        .cloned()
        .collect::<Vec<_>>();

    if found.is_empty() {
        return Err(CoreError::NoMatchingCourses {
            keyword: keyword.to_string(),
        });
    }

    Ok(found)
}

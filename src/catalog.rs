//! # Course Catalog Module
//!
//! Reads the externally edited course file on every call. Nothing is cached:
//! each call returns a fresh snapshot, and any problem with the file degrades
//! to an empty catalog instead of an error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

/// Top-level field holding the course array
pub const COURSES_FIELD: &str = "cursos";

/// A single course record, read-only to the bot
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Course {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "titulo", alias = "title", default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(
        rename = "descripcion_corta",
        alias = "short_description",
        default,
        deserialize_with = "lenient_string"
    )]
    pub short_description: String,
    #[serde(rename = "duracion", alias = "duration", default, deserialize_with = "lenient_string")]
    pub duration: String,
    #[serde(rename = "precio", alias = "price", default, deserialize_with = "lenient_string")]
    pub price: String,
    #[serde(
        rename = "link_inscripcion",
        alias = "enrollment_link",
        default,
        deserialize_with = "lenient_link"
    )]
    pub enrollment_link: Option<String>,
}

/// Accept strings, numbers and booleans; anything else reads as empty
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_link<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let link = lenient_string(deserializer)?;
    let link = link.trim();
    Ok((!link.is_empty()).then(|| link.to_string()))
}

/// Reasons a catalog read degrades to an empty snapshot
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("course file does not exist: {0}")]
    Missing(PathBuf),
    #[error("failed to read course file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in course file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid format in {0}: top level is not an object")]
    NotAnObject(PathBuf),
    #[error("invalid format in {0}: 'cursos' is not a list")]
    NotASequence(PathBuf),
}

/// Stateless query object over the course file
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    path: PathBuf,
}

impl CatalogLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a fresh snapshot, reporting why it could not be read
    pub fn try_load(&self) -> Result<Vec<Course>, CatalogError> {
        if !self.path.exists() {
            return Err(CatalogError::Missing(self.path.clone()));
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| CatalogError::Io {
            path: self.path.clone(),
            source,
        })?;

        let data: Value = serde_json::from_str(&content).map_err(|source| CatalogError::Json {
            path: self.path.clone(),
            source,
        })?;

        let object = data
            .as_object()
            .ok_or_else(|| CatalogError::NotAnObject(self.path.clone()))?;

        let entries = match object.get(COURSES_FIELD) {
            None => return Ok(Vec::new()),
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(CatalogError::NotASequence(self.path.clone())),
        };

        let courses = entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                if !entry.is_object() {
                    warn!(index, path = %self.path.display(), "Skipping course entry that is not an object");
                    return None;
                }
                match Course::deserialize(entry) {
                    Ok(course) => Some(course),
                    Err(e) => {
                        warn!(index, path = %self.path.display(), error = %e, "Skipping unreadable course entry");
                        None
                    }
                }
            })
            .collect();

        Ok(courses)
    }

    /// Read a fresh snapshot; never fails, logging the cause and returning an
    /// empty catalog instead
    pub fn load(&self) -> Vec<Course> {
        match self.try_load() {
            Ok(courses) => {
                info!(count = courses.len(), path = %self.path.display(), "Loaded courses");
                courses
            }
            Err(e) => {
                error!(error = %e, "Course catalog unavailable, using empty catalog");
                Vec::new()
            }
        }
    }

    /// [`load`](Self::load) on the blocking thread pool, for async callers
    pub async fn snapshot(&self) -> Vec<Course> {
        let loader = self.clone();
        match tokio::task::spawn_blocking(move || loader.load()).await {
            Ok(courses) => courses,
            Err(e) => {
                error!(error = %e, "Course catalog read aborted, using empty catalog");
                Vec::new()
            }
        }
    }
}

/// First course whose id equals the token
pub fn find_course<'a>(courses: &'a [Course], id: &str) -> Option<&'a Course> {
    courses.iter().find(|course| course.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn catalog_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_degrades_to_empty() {
        let loader = CatalogLoader::new("/nonexistent/courses.json");
        assert!(matches!(loader.try_load(), Err(CatalogError::Missing(_))));
        assert!(loader.load().is_empty());
    }

    #[test]
    fn test_malformed_json_degrades_to_empty() {
        let file = catalog_file("{ \"cursos\": [");
        let loader = CatalogLoader::new(file.path());
        assert!(matches!(loader.try_load(), Err(CatalogError::Json { .. })));
        assert!(loader.load().is_empty());
    }

    #[test]
    fn test_cursos_not_a_list() {
        let file = catalog_file(r#"{ "cursos": { "id": "c1" } }"#);
        let loader = CatalogLoader::new(file.path());
        assert!(matches!(loader.try_load(), Err(CatalogError::NotASequence(_))));
        assert!(loader.load().is_empty());
    }

    #[test]
    fn test_top_level_array_rejected() {
        let file = catalog_file(r#"[{ "id": "c1" }]"#);
        let loader = CatalogLoader::new(file.path());
        assert!(matches!(loader.try_load(), Err(CatalogError::NotAnObject(_))));
    }

    #[test]
    fn test_missing_cursos_field_is_empty_catalog() {
        let file = catalog_file(r#"{ "otros": [] }"#);
        let loader = CatalogLoader::new(file.path());
        assert!(loader.try_load().unwrap().is_empty());
    }

    #[test]
    fn test_parses_courses_in_order() {
        let file = catalog_file(
            r#"{ "cursos": [
                { "id": "c1", "titulo": "Intro", "descripcion_corta": "Basics",
                  "duracion": "4 semanas", "precio": "$100", "link_inscripcion": "https://x/y" },
                { "id": 2, "title": "Advanced", "price": 250 }
            ] }"#,
        );
        let courses = CatalogLoader::new(file.path()).load();
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].id, "c1");
        assert_eq!(courses[0].title, "Intro");
        assert_eq!(courses[0].duration, "4 semanas");
        assert_eq!(courses[0].enrollment_link.as_deref(), Some("https://x/y"));
        assert_eq!(courses[1].id, "2");
        assert_eq!(courses[1].title, "Advanced");
        assert_eq!(courses[1].price, "250");
        assert_eq!(courses[1].short_description, "");
        assert_eq!(courses[1].enrollment_link, None);
    }

    #[test]
    fn test_skips_non_object_entries_and_blank_links() {
        let file = catalog_file(
            r#"{ "cursos": [ "junk", { "id": "c1", "titulo": null, "link_inscripcion": "  " } ] }"#,
        );
        let courses = CatalogLoader::new(file.path()).load();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].title, "");
        assert_eq!(courses[0].enrollment_link, None);
    }

    #[test]
    fn test_reload_sees_external_edits() {
        let file = catalog_file(r#"{ "cursos": [] }"#);
        let loader = CatalogLoader::new(file.path());
        assert!(loader.load().is_empty());

        std::fs::write(file.path(), r#"{ "cursos": [ { "id": "c1", "titulo": "Intro" } ] }"#).unwrap();
        assert_eq!(loader.load().len(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_snapshot_reads_off_the_runtime() {
        let file = catalog_file(r#"{ "cursos": [ { "id": "c1" }, { "id": "c2" } ] }"#);
        let loader = CatalogLoader::new(file.path());
        assert_eq!(loader.snapshot().await, loader.load());
        assert_eq!(loader.snapshot().await.len(), 2);

        let missing = CatalogLoader::new("/nonexistent/courses.json");
        assert!(missing.snapshot().await.is_empty());
    }

    #[test]
    fn test_find_course_is_first_match() {
        let courses = vec![
            Course { id: "a".into(), title: "First".into(), ..Default::default() },
            Course { id: "a".into(), title: "Second".into(), ..Default::default() },
        ];
        assert_eq!(find_course(&courses, "a").unwrap().title, "First");
        assert!(find_course(&courses, "b").is_none());
    }
}

//! Username → projects mapping sources
//!
//! The mapping either comes from a YAML document whose top-level keys are
//! usernames and whose values are sequences of project names, or from the
//! fixed seed list compiled into the binary.

use errors::{LoaderError, LoaderResult};
use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Accounts seeded by the inline source
pub const SEED_USERNAMES: &[&str] = &[
    "alice@cluster.example.edu",
    "bob@cluster.example.edu",
    "carol@cluster.example.edu",
    "dave@cluster.example.edu",
];

/// Allocations every seeded account is given
pub const SEED_PROJECTS: &[&str] = &["cpu-alloc-2024", "gpu-alloc-2024", "scratch"];

/// One username with its ordered project list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProjectRow {
    pub username: String,
    pub projects: Vec<String>,
}

impl UserProjectRow {
    pub fn new(username: impl Into<String>, projects: Vec<String>) -> Self {
        Self {
            username: username.into(),
            projects,
        }
    }
}

/// Where the mapping is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingSource {
    /// YAML document on disk
    File(PathBuf),
    /// Fixed seed list, every user shares [`SEED_PROJECTS`]
    Inline,
}

/// Ordered username → projects mapping
///
/// Entries keep document order (or seed list order) so rows are inserted in
/// the same order they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProjectMap {
    entries: Vec<UserProjectRow>,
}

impl UserProjectMap {
    /// Build the inline seed mapping
    pub fn inline() -> Self {
        let projects: Vec<String> = SEED_PROJECTS.iter().map(|p| p.to_string()).collect();
        let entries = SEED_USERNAMES
            .iter()
            .map(|username| UserProjectRow::new(*username, projects.clone()))
            .collect();
        Self { entries }
    }

    /// Parse a mapping from YAML text
    pub fn from_yaml_str(text: &str) -> LoaderResult<Self> {
        Self::parse_document(text, "<inline>")
    }

    /// Read and parse a mapping from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> LoaderResult<Self> {
        let path = path.as_ref();
        debug!("Loading mapping: {:?}", path);

        let text =
            std::fs::read_to_string(path).map_err(|e| LoaderError::read_input(path, e))?;
        Self::parse_document(&text, &path.display().to_string())
    }

    fn parse_document(text: &str, file: &str) -> LoaderResult<Self> {
        let document: YamlValue =
            serde_yaml::from_str(text).map_err(|e| LoaderError::parse(file, e))?;

        let mapping = match document {
            // Empty document
            YamlValue::Null => return Ok(Self::default()),
            YamlValue::Mapping(mapping) => mapping,
            other => {
                return Err(LoaderError::invalid_mapping(format!(
                    "{}: top level must be a mapping of username to projects, found {}",
                    file,
                    yaml_type_name(&other)
                )))
            },
        };

        let mut entries = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let username = scalar_to_string(key).map_err(|found| {
                LoaderError::parse(file, format!("username: found {}", found))
            })?;

            let items = match value {
                YamlValue::Sequence(items) => items,
                other => {
                    return Err(LoaderError::parse(
                        file,
                        format!(
                            "projects of {}: expected a sequence, found {}",
                            username,
                            yaml_type_name(&other)
                        ),
                    ))
                },
            };
            let mut projects = Vec::with_capacity(items.len());
            for item in items {
                let project = scalar_to_string(item).map_err(|found| {
                    LoaderError::parse(file, format!("projects of {}: found {}", username, found))
                })?;
                projects.push(project);
            }

            entries.push(UserProjectRow { username, projects });
        }

        debug!("Parsed {} users from {}", entries.len(), file);
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserProjectRow> {
        self.entries.iter()
    }

    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|row| row.username.as_str())
    }

    /// Look up the projects of a username (first match)
    pub fn projects_of(&self, username: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|row| row.username == username)
            .map(|row| row.projects.as_slice())
    }
}

impl FromIterator<UserProjectRow> for UserProjectMap {
    fn from_iter<I: IntoIterator<Item = UserProjectRow>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a UserProjectMap {
    type Item = &'a UserProjectRow;
    type IntoIter = std::slice::Iter<'a, UserProjectRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Obtain the mapping from its source
///
/// @input source: &MappingSource - YAML file path or the inline seed list
/// @output `LoaderResult<UserProjectMap>` - Ordered mapping
/// @throws LoaderError (input kind) - File missing, unreadable or malformed
pub fn load_mapping(source: &MappingSource) -> LoaderResult<UserProjectMap> {
    match source {
        MappingSource::File(path) => UserProjectMap::from_yaml_file(path),
        MappingSource::Inline => Ok(UserProjectMap::inline()),
    }
}

/// Plain scalars keep their text: `12345` and `true` are names, not numbers
fn scalar_to_string(value: YamlValue) -> Result<String, &'static str> {
    match value {
        YamlValue::String(s) => Ok(s),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        other => Err(yaml_type_name(&other)),
    }
}

fn yaml_type_name(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "a boolean",
        YamlValue::Number(_) => "a number",
        YamlValue::String(_) => "a string",
        YamlValue::Sequence(_) => "a sequence",
        YamlValue::Mapping(_) => "a mapping",
        YamlValue::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_keeps_document_order() {
        let map = UserProjectMap::from_yaml_str(
            r#"
zed: [p9]
alice:
  - proj1
  - proj2
bob: ["proj3"]
"#,
        )
        .unwrap();

        let names: Vec<&str> = map.usernames().collect();
        assert_eq!(names, vec!["zed", "alice", "bob"]);
        assert_eq!(
            map.projects_of("alice").unwrap(),
            &["proj1".to_string(), "proj2".to_string()]
        );
    }

    #[test]
    fn test_empty_document_is_empty_mapping() {
        assert!(UserProjectMap::from_yaml_str("").unwrap().is_empty());
        assert!(UserProjectMap::from_yaml_str("{}").unwrap().is_empty());
    }

    #[test]
    fn test_user_with_no_projects() {
        let map = UserProjectMap::from_yaml_str("alice: []").unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.projects_of("alice").unwrap().is_empty());
    }

    #[test]
    fn test_top_level_sequence_rejected() {
        let err = UserProjectMap::from_yaml_str("- alice\n- bob\n").unwrap_err();
        assert!(err.is_input());
        assert!(err.to_string().contains("a sequence"));
    }

    #[test]
    fn test_non_sequence_projects_rejected() {
        let err = UserProjectMap::from_yaml_str("alice: proj1\n").unwrap_err();
        assert!(err.is_input());
        assert!(err.to_string().contains("projects of alice"));
    }

    #[test]
    fn test_numeric_scalars_kept_as_names() {
        let map =
            UserProjectMap::from_yaml_str("alice: [12345, def-x]\n12345: [p, true]\n").unwrap();

        assert_eq!(
            map.projects_of("alice").unwrap(),
            &["12345".to_string(), "def-x".to_string()]
        );
        assert_eq!(
            map.projects_of("12345").unwrap(),
            &["p".to_string(), "true".to_string()]
        );
    }

    #[test]
    fn test_nested_project_rejected() {
        let err = UserProjectMap::from_yaml_str("alice: [[proj1]]\n").unwrap_err();
        assert!(err.is_input());
        assert!(err.to_string().contains("projects of alice: found a sequence"));
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        let err = UserProjectMap::from_yaml_str("alice: [proj1\n").unwrap_err();
        assert!(matches!(err, LoaderError::ParseError { .. }));
    }

    #[test]
    fn test_malformed_file_error_names_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("users.yaml");
        fs::write(&path, "alice: [proj1\n").unwrap();

        let err = UserProjectMap::from_yaml_file(&path).unwrap_err();
        assert!(err.is_input());
        assert!(err.to_string().contains("users.yaml"));
        assert!(!err.to_string().contains("<inline>"));
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let temp_dir = TempDir::new().unwrap();
        let source = MappingSource::File(temp_dir.path().join("absent.yaml"));
        let err = load_mapping(&source).unwrap_err();
        assert!(matches!(err, LoaderError::ReadInput { .. }));
        assert!(err.is_input());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("users.yaml");
        fs::write(&path, "alice: [proj1, proj2]\nbob: [proj3]\n").unwrap();

        let map = load_mapping(&MappingSource::File(path)).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.projects_of("bob").unwrap(), &["proj3".to_string()]);
    }

    #[test]
    fn test_inline_source_shares_projects() {
        let map = load_mapping(&MappingSource::Inline).unwrap();
        assert_eq!(map.len(), SEED_USERNAMES.len());
        for row in &map {
            assert_eq!(row.projects, SEED_PROJECTS);
        }
        let names: Vec<&str> = map.usernames().collect();
        assert_eq!(names, SEED_USERNAMES);
    }
}

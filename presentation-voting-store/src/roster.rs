use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::models::{Presentation, PresentationId};

/// A validated list of presentations with unique, non-zero ids.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Roster(Vec<Presentation>);

/// On-disk and wire shape of a roster: `{"presentations": [...]}`.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct RosterDocument {
    pub presentations: Vec<Presentation>,
}

impl Roster {
    pub fn new(presentations: Vec<Presentation>) -> Result<Self, StoreError> {
        let mut seen = HashSet::with_capacity(presentations.len());
        for (index, presentation) in presentations.iter().enumerate() {
            if presentation.id.0 == 0 {
                return Err(StoreError::InvalidPresentation {
                    index,
                    reason: "id must be a positive integer",
                });
            }
            if presentation.team_name.trim().is_empty() {
                return Err(StoreError::InvalidPresentation {
                    index,
                    reason: "teamName must not be empty",
                });
            }
            if presentation.title.trim().is_empty() {
                return Err(StoreError::InvalidPresentation {
                    index,
                    reason: "title must not be empty",
                });
            }
            if !seen.insert(presentation.id) {
                return Err(StoreError::DuplicatePresentationId(presentation.id));
            }
        }
        Ok(Self(presentations))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, StoreError> {
        let contents = std::fs::read_to_string(path).map_err(|source| StoreError::RosterFile {
            path: path.to_owned(),
            source,
        })?;
        let document: RosterDocument =
            serde_json::from_str(&contents).map_err(|source| StoreError::RosterJson {
                path: path.to_owned(),
                source,
            })?;
        Self::new(document.presentations)
    }

    #[must_use]
    pub fn contains(&self, id: PresentationId) -> bool {
        self.0.iter().any(|presentation| presentation.id == id)
    }

    #[must_use]
    pub fn presentations(&self) -> &[Presentation] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    fn presentation(id: u32, team_name: &str, title: &str) -> Presentation {
        Presentation {
            id: PresentationId(id),
            team_name: team_name.to_owned(),
            title: title.to_owned(),
        }
    }

    #[test]
    fn accepts_valid_roster() {
        let roster = Roster::new(vec![
            presentation(1, "Alpha", "First"),
            presentation(2, "Beta", "Second"),
        ])
        .expect("valid roster");
        assert_eq!(roster.len(), 2);
        assert!(roster.contains(PresentationId(2)));
        assert!(!roster.contains(PresentationId(3)));
    }

    #[test]
    fn empty_roster_is_allowed() {
        assert!(Roster::new(Vec::new()).expect("valid roster").is_empty());
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(matches!(
            Roster::new(vec![presentation(0, "Alpha", "First")]),
            Err(StoreError::InvalidPresentation { index: 0, .. })
        ));
        assert!(matches!(
            Roster::new(vec![
                presentation(1, "Alpha", "First"),
                presentation(2, " ", "Second")
            ]),
            Err(StoreError::InvalidPresentation { index: 1, .. })
        ));
        assert!(matches!(
            Roster::new(vec![presentation(1, "Alpha", "")]),
            Err(StoreError::InvalidPresentation { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        assert!(matches!(
            Roster::new(vec![
                presentation(4, "Alpha", "First"),
                presentation(4, "Beta", "Second")
            ]),
            Err(StoreError::DuplicatePresentationId(PresentationId(4)))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"presentations": [{{"id": 1, "teamName": "Alpha", "title": "First"}}]}}"#
        )
        .expect("write roster");
        let roster = Roster::from_json_file(file.path()).expect("roster loads");
        assert_eq!(roster.presentations()[0].team_name, "Alpha");
    }

    #[test]
    fn reports_unreadable_file() {
        assert!(matches!(
            Roster::from_json_file(Path::new("/nonexistent/roster.json")),
            Err(StoreError::RosterFile { .. })
        ));
    }
}

//! Projects and their validation status lifecycle.
//!
//! A project is created `pending`, moves to `processing` when the backend
//! pipeline picks it up, and ends `completed` (with an analysis) or `failed`.
//! Only the two terminal states stop the client from polling.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::Analysis;
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PROCESSING: &str = "processing";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_FAILED: &str = "failed";

/// All valid project status strings.
pub const VALID_PROJECT_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_PROCESSING,
    STATUS_COMPLETED,
    STATUS_FAILED,
];

/// Name length bounds enforced by the backend.
pub const MIN_NAME_LENGTH: usize = 3;
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum description length accepted by the backend.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Number of keywords shown on a dashboard card before collapsing.
pub const KEYWORD_PREVIEW_LIMIT: usize = 3;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProjectStatus {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            STATUS_PENDING => Ok(Self::Pending),
            STATUS_PROCESSING => Ok(Self::Processing),
            STATUS_COMPLETED => Ok(Self::Completed),
            STATUS_FAILED => Ok(Self::Failed),
            _ => Err(CoreError::invalid_value(
                "project status",
                s,
                VALID_PROJECT_STATUSES,
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::Processing => STATUS_PROCESSING,
            Self::Completed => STATUS_COMPLETED,
            Self::Failed => STATUS_FAILED,
        }
    }

    /// No further automatic change is expected once terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Badge text shown next to a project.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    pub status: ProjectStatus,
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub created_at: Timestamp,
    #[serde(default, deserialize_with = "crate::timestamp::option::deserialize")]
    pub updated_at: Option<Timestamp>,
}

impl Project {
    pub fn keywords(&self) -> &[String] {
        self.keywords.as_deref().unwrap_or_default()
    }

    /// Split keywords into the ones shown on a card and a hidden count.
    pub fn keyword_preview(&self) -> (&[String], usize) {
        let all = self.keywords();
        let shown = all.len().min(KEYWORD_PREVIEW_LIMIT);
        (&all[..shown], all.len() - shown)
    }
}

/// `GET /projects/{id}` payload: the project plus its analysis, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectWithAnalysis {
    #[serde(flatten)]
    pub project: Project,
    #[serde(default)]
    pub analysis: Option<Analysis>,
}

impl ProjectWithAnalysis {
    pub fn status(&self) -> ProjectStatus {
        self.project.status
    }

    /// The analysis, but only once the project is `completed`.
    ///
    /// An analysis row attached to a project in any other state is never
    /// shown, so a half-finished run cannot leak onto the screen.
    pub fn completed_analysis(&self) -> Option<&Analysis> {
        match self.project.status {
            ProjectStatus::Completed => self.analysis.as_ref(),
            _ => None,
        }
    }
}

/// `POST /projects/{id}/validate` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationTask {
    pub status: String,
    pub task_id: String,
    pub project_id: DbId,
}

// ---------------------------------------------------------------------------
// Create form
// ---------------------------------------------------------------------------

/// `POST /projects` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

impl ProjectCreate {
    /// Build a request from raw form input.
    ///
    /// Blank descriptions and keyword lists are omitted rather than sent
    /// as empty values.
    pub fn from_form(name: &str, description: &str, keywords_input: &str) -> Self {
        let description = description.trim();
        let keywords = parse_keywords(keywords_input);
        Self {
            name: name.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            keywords: (!keywords.is_empty()).then_some(keywords),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let name_len = self.name.trim().chars().count();
        if name_len == 0 {
            return Err(CoreError::Validation("Project name is required".into()));
        }
        if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&name_len) {
            return Err(CoreError::Validation(format!(
                "Project name must be between {MIN_NAME_LENGTH} and {MAX_NAME_LENGTH} characters"
            )));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > MAX_DESCRIPTION_LENGTH {
                return Err(CoreError::Validation(format!(
                    "Description must be at most {MAX_DESCRIPTION_LENGTH} characters"
                )));
            }
        }
        Ok(())
    }
}

/// Parse comma-separated keyword input.
///
/// Segments are trimmed; blank segments are dropped. Order is preserved
/// and duplicates are kept.
pub fn parse_keywords(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

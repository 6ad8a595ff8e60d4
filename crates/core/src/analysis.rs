//! Analysis results and the score tiers used to present them.
//!
//! The per-platform blocks are open-ended JSON produced by the scraping
//! pipeline. The client only reads three well-known keys from them:
//! `error`, `score` and `summary`.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Score tiers
// ---------------------------------------------------------------------------

/// Lowest score in the "good" tier.
pub const TIER_GOOD_MIN: i64 = 80;

/// Lowest score in the "warning" tier.
pub const TIER_WARNING_MIN: i64 = 60;

/// Summary text shown for a platform block without one.
pub const NO_DATA_SUMMARY: &str = "No data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Good,
    Warning,
    Poor,
}

impl ScoreTier {
    /// Map a 0-100 score to its tier.
    pub fn from_score(score: i64) -> Self {
        if score >= TIER_GOOD_MIN {
            Self::Good
        } else if score >= TIER_WARNING_MIN {
            Self::Warning
        } else {
            Self::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Poor => "poor",
        }
    }
}

// ---------------------------------------------------------------------------
// Platforms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Reddit,
    Twitter,
    LinkedIn,
}

impl Platform {
    /// Display order on the project screen.
    pub const ALL: [Platform; 3] = [Platform::Reddit, Platform::Twitter, Platform::LinkedIn];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Reddit => "Reddit",
            Self::Twitter => "Twitter",
            Self::LinkedIn => "LinkedIn",
        }
    }
}

/// The displayable part of one platform block.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformSummary {
    pub platform: Platform,
    pub score: i64,
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub id: DbId,
    pub project_id: DbId,
    #[serde(default)]
    pub overall_score: Option<i64>,
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default)]
    pub key_insights: Option<Vec<String>>,
    #[serde(default)]
    pub recommendations: Option<Vec<String>>,
    #[serde(default)]
    pub reddit_data: Option<serde_json::Value>,
    #[serde(default)]
    pub twitter_data: Option<serde_json::Value>,
    #[serde(default)]
    pub linkedin_data: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "crate::timestamp::option::deserialize")]
    pub completed_at: Option<Timestamp>,
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub created_at: Timestamp,
}

impl Analysis {
    /// Overall score, `0` when the pipeline did not produce one.
    pub fn score(&self) -> i64 {
        self.overall_score.unwrap_or(0)
    }

    pub fn tier(&self) -> ScoreTier {
        ScoreTier::from_score(self.score())
    }

    pub fn key_insights(&self) -> &[String] {
        self.key_insights.as_deref().unwrap_or_default()
    }

    pub fn recommendations(&self) -> &[String] {
        self.recommendations.as_deref().unwrap_or_default()
    }

    pub fn platform_data(&self, platform: Platform) -> Option<&serde_json::Value> {
        match platform {
            Platform::Reddit => self.reddit_data.as_ref(),
            Platform::Twitter => self.twitter_data.as_ref(),
            Platform::LinkedIn => self.linkedin_data.as_ref(),
        }
    }

    /// Summary of one platform block.
    ///
    /// `None` when the block is missing, null, or carries an error marker.
    pub fn platform_summary(&self, platform: Platform) -> Option<PlatformSummary> {
        let data = self.platform_data(platform)?;
        if data.is_null() || data.get("error").is_some_and(is_truthy) {
            return None;
        }

        let score = data
            .get("score")
            .and_then(serde_json::Value::as_f64)
            .map(|s| s.round() as i64)
            .unwrap_or(0);
        let summary = data
            .get("summary")
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(NO_DATA_SUMMARY)
            .to_string();

        Some(PlatformSummary {
            platform,
            score,
            summary,
        })
    }

    /// Summaries of every platform block worth showing, in display order.
    pub fn platform_summaries(&self) -> Vec<PlatformSummary> {
        Platform::ALL
            .iter()
            .filter_map(|p| self.platform_summary(*p))
            .collect()
    }
}

/// Whether an error marker should hide its block: empty strings, `false`,
/// zero and null do not count as errors.
fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub profession: String,
    pub location: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default = "default_skill_level")]
    pub skill_level: String,
    #[serde(default = "default_career_stage")]
    pub career_stage: String,
}

fn default_skill_level() -> String {
    "intermediate".to_owned()
}

fn default_career_stage() -> String {
    "mid_career".to_owned()
}

impl UserProfile {
    pub fn new(profession: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            profession: profession.into(),
            location: location.into(),
            interests: Vec::new(),
            skill_level: default_skill_level(),
            career_stage: default_career_stage(),
        }
    }

    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests = interests.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    AddToCalendar,
    CreateTask,
    SetReminder,
    Bookmark,
    Apply,
    Register,
}

/// Descriptive suggestion attached to an item. Producing one never executes it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuggestedAction {
    pub kind: ActionKind,
    pub label: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl SuggestedAction {
    pub fn new(kind: ActionKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_owned(), value.into());
        self
    }
}

/// What an executor gets to see about the item an action came from.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionContext {
    pub item_id: String,
    pub title: String,
    pub url: String,
    pub summary: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionReceipt {
    pub record_id: String,
    pub kind: ActionKind,
}

// Object style note:
// The pipeline only consumes these two collaborators through the traits
// below. Implementations live with the product code that owns users, tasks
// and calendars; nothing in this workspace implements them outside tests.

pub trait ProfileSource {
    /// Synchronous lookup performed by the caller before asking for news.
    fn lookup(&self, user_id: &str) -> anyhow::Result<Option<UserProfile>>;
}

#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(
        &self,
        user_id: &str,
        action: &SuggestedAction,
        context: &ActionContext,
    ) -> anyhow::Result<ActionReceipt>;
}

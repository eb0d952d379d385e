use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
// Collaborator contracts shared with the rest of the product
pub use interfaces::defs::{ActionContext, ActionKind, SuggestedAction, UserProfile};

/// One entry as an adapter saw it. Lives for a single pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    pub title: String,
    pub description: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub source_name: String,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
}

impl RawItem {
    pub fn new(title: impl Into<String>, url: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            url: url.into(),
            published_at: Utc::now(),
            source_name: source_name.into(),
            content: None,
            image_url: None,
            tags: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = published_at;
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Title, description and content joined by spaces, skipping empty parts.
    pub fn combined_text(&self) -> String {
        [
            self.title.as_str(),
            self.description.as_str(),
            self.content.as_deref().unwrap_or(""),
        ]
        .iter()
        .filter(|part| !part.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    LocalEvents,
    ProfessionalDev,
    IndustryTrends,
    Productivity,
    CareerOpportunities,
    Education,
    Technology,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::LocalEvents,
        Category::ProfessionalDev,
        Category::IndustryTrends,
        Category::Productivity,
        Category::CareerOpportunities,
        Category::Education,
        Category::Technology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::LocalEvents => "local_events",
            Category::ProfessionalDev => "professional_dev",
            Category::IndustryTrends => "industry_trends",
            Category::Productivity => "productivity",
            Category::CareerOpportunities => "career_opportunities",
            Category::Education => "education",
            Category::Technology => "technology",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::LocalEvents => "Local Events",
            Category::ProfessionalDev => "Professional Dev",
            Category::IndustryTrends => "Industry Trends",
            Category::Productivity => "Productivity",
            Category::CareerOpportunities => "Career Opportunities",
            Category::Education => "Education",
            Category::Technology => "Technology",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| NewsError::General(format!("Unknown category: {}", s)))
    }
}

/// A raw item after enrichment and scoring. Scores are always within [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub summary: String,
    pub url: String,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub source: String,
    pub category: Category,
    pub relevance_score: f64,
    pub quality_score: f64,
    pub engagement_score: f64,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
    pub is_local_event: bool,
    pub is_urgent: bool,
    pub event_date: Option<DateTime<Utc>>,
    pub event_location: Option<String>,
    pub event_deadline: Option<DateTime<Utc>>,
    pub available_actions: Vec<SuggestedAction>,
}

impl ProcessedItem {
    /// Ranking key: 0.6 relevance + 0.4 quality.
    pub fn weighted_score(&self) -> f64 {
        0.6 * self.relevance_score + 0.4 * self.quality_score
    }

    pub fn action_context(&self) -> ActionContext {
        ActionContext {
            item_id: self.id.clone(),
            title: self.title.clone(),
            url: self.url.clone(),
            summary: self.summary.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadMetadata {
    pub total_articles: usize,
    pub raw_articles_fetched: usize,
    pub sources_used: usize,
    pub last_updated: DateTime<Utc>,
    pub user_profile: UserProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of `get_contextual_news`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsPayload {
    pub articles: Vec<ProcessedItem>,
    pub categories: BTreeMap<Category, Vec<ProcessedItem>>,
    pub metadata: PayloadMetadata,
}

impl NewsPayload {
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceHealthReport {
    pub health_score: f64,
    pub last_fetch: Option<DateTime<Utc>>,
    pub fetch_count: u64,
    pub error_count: u64,
    pub can_fetch: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub sources: BTreeMap<String, SourceHealthReport>,
    pub overall_health: f64,
    pub last_check: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub title: String,
    pub summary: String,
    pub relevance: f64,
    pub url: String,
    pub published: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalEventNote {
    pub title: String,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

/// Compact digest of recent, notable items for a conversational consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsContext {
    pub total_articles: usize,
    pub categories: BTreeMap<Category, Vec<ContextEntry>>,
    pub urgent_items: Vec<String>,
    pub local_events: Vec<LocalEventNote>,
    pub career_opportunities: Vec<String>,
    pub learning_opportunities: Vec<String>,
    pub summary: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Feed size exceeds limit: {size_mb}MB")]
    FeedTooLarge { size_mb: usize },

    #[error("Fetch from {source_name} timed out after {seconds}s")]
    Timeout { source_name: String, seconds: u64 },

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("General error: {0}")]
    General(String),
}

impl NewsError {
    pub fn config(msg: impl Into<String>) -> Self {
        NewsError::Config(msg.into())
    }

    pub fn processing(msg: impl Into<String>) -> Self {
        NewsError::Processing(msg.into())
    }

    pub fn cache(msg: impl Into<String>) -> Self {
        NewsError::Cache(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, NewsError>;

use crate::types::{RawItem, UserProfile};
use crate::utils::text::contains_term;
use crate::utils::time::hours_between;
use chrono::{DateTime, Utc};

pub const PROFESSION_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "teacher",
        &[
            "education", "teaching", "classroom", "student", "pedagogy", "curriculum", "edtech",
            "assessment", "learning", "online courses", "student engagement",
        ],
    ),
    (
        "engineer",
        &[
            "software", "engineering", "development", "devops", "machine learning", "automation",
            "coding", "programming", "cloud", "system design",
        ],
    ),
    (
        "student",
        &["scholarship", "internship", "exam", "degree", "online courses", "study", "research", "college", "career"],
    ),
    (
        "developer",
        &[
            "javascript", "flutter", "dart", "api", "unix", "rust", "open source", "frontend", "backend",
            "database", "microservices",
        ],
    ),
];

pub const REPUTABLE_SOURCES: &[&str] = &["bbc", "reuters", "hindu", "times", "techcrunch", "verge", "coursera", "edsurge"];

pub fn profession_keywords(profession: &str) -> &'static [&'static str] {
    let wanted = profession.trim().to_lowercase();
    PROFESSION_KEYWORDS
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, keywords)| *keywords)
        .unwrap_or(&[])
}

fn literal_in(text: &str, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    !needle.is_empty() && text.contains(&needle)
}

/// How well the item matches the profile, clamped to [0, 1].
pub fn relevance(text: &str, profile: &UserProfile) -> f64 {
    let text = text.to_lowercase();
    let mut score = 0.0;

    if literal_in(&text, &profile.profession) {
        score += 0.3;
    }
    if literal_in(&text, &profile.location) {
        score += 0.2;
    }

    let interest_hits = profile.interests.iter().filter(|i| literal_in(&text, i)).count();
    score += (interest_hits as f64 * 0.05).min(0.25);

    let keyword_hits = profession_keywords(&profile.profession)
        .iter()
        .filter(|k| contains_term(&text, k))
        .count();
    score += (keyword_hits as f64 * 0.05).min(0.25);

    score.clamp(0.0, 1.0)
}

/// Length, provenance, freshness and imagery, clamped to [0, 1].
pub fn quality(item: &RawItem, text: &str, now: DateTime<Utc>) -> f64 {
    let mut score = 0.4;

    let length = text.chars().count();
    if length > 100 {
        score += 0.1;
    }
    if length > 300 {
        score += 0.15;
    }

    let source = item.source_name.to_lowercase();
    if REPUTABLE_SOURCES.iter().any(|s| source.contains(s)) {
        score += 0.2;
    }

    let age_hours = hours_between(item.published_at, now);
    if age_hours < 48.0 {
        score += 0.1;
    } else if age_hours < 168.0 {
        score += 0.05;
    }

    if item.image_url.as_deref().is_some_and(|u| !u.is_empty()) {
        score += 0.05;
    }

    f64::clamp(score, 0.0, 1.0)
}

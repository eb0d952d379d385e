use crate::types::Category;
use crate::utils::text::contains_term;

pub const EVENT_TERMS: &[&str] = &["conference", "meetup", "workshop", "seminar", "event", "summit"];
pub const CAREER_TERMS: &[&str] = &["job", "career", "vacancy", "hiring", "opportunity"];
pub const EDUCATION_TERMS: &[&str] = &["course", "training", "learning", "education", "certification"];
pub const TECHNOLOGY_TERMS: &[&str] = &["technology", "software", "hardware", "innovation", "ai", "machine learning"];
pub const PRODUCTIVITY_TERMS: &[&str] = &["productivity", "efficiency", "tool", "method", "technique"];

/// What a rule looks for in the lowercased item text.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    AnyTerm(&'static [&'static str]),
    ProfessionName,
}

impl Matcher {
    fn matches(&self, text: &str, profession: &str) -> bool {
        match self {
            Matcher::AnyTerm(terms) => terms.iter().any(|term| contains_term(text, term)),
            Matcher::ProfessionName => !profession.is_empty() && text.contains(profession),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub matcher: Matcher,
    pub category: Category,
}

/// Evaluated top to bottom; the first match wins.
pub const RULES: &[CategoryRule] = &[
    CategoryRule { matcher: Matcher::AnyTerm(EVENT_TERMS), category: Category::LocalEvents },
    CategoryRule { matcher: Matcher::AnyTerm(CAREER_TERMS), category: Category::CareerOpportunities },
    CategoryRule { matcher: Matcher::AnyTerm(EDUCATION_TERMS), category: Category::Education },
    CategoryRule { matcher: Matcher::AnyTerm(TECHNOLOGY_TERMS), category: Category::Technology },
    CategoryRule { matcher: Matcher::ProfessionName, category: Category::ProfessionalDev },
    CategoryRule { matcher: Matcher::AnyTerm(PRODUCTIVITY_TERMS), category: Category::Productivity },
];

pub const FALLBACK: Category = Category::IndustryTrends;

pub fn classify(text: &str, profession: &str) -> Category {
    classify_with(RULES, text, profession)
}

pub fn classify_with(rules: &[CategoryRule], text: &str, profession: &str) -> Category {
    let text = text.to_lowercase();
    let profession = profession.trim().to_lowercase();
    rules
        .iter()
        .find(|rule| rule.matcher.matches(&text, &profession))
        .map(|rule| rule.category)
        .unwrap_or(FALLBACK)
}

use crate::types::ProcessedItem;

pub const MIN_QUALITY: f64 = 0.2;
pub const MIN_TITLE_CHARS: usize = 5;
pub const MIN_DESCRIPTION_CHARS: usize = 10;
pub const SPAM_PHRASES: &[&str] = &["buy now", "limited offer", "act fast", "click here now"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    LowQuality,
    ShortTitle,
    ShortDescription,
    Spam,
}

/// The only place items are discarded.
pub fn check(item: &ProcessedItem) -> Result<(), Rejection> {
    if item.quality_score < MIN_QUALITY {
        return Err(Rejection::LowQuality);
    }
    if item.title.chars().count() < MIN_TITLE_CHARS {
        return Err(Rejection::ShortTitle);
    }
    if item.description.chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(Rejection::ShortDescription);
    }
    let text = format!("{} {}", item.title, item.description).to_lowercase();
    if SPAM_PHRASES.iter().any(|p| text.contains(p)) {
        return Err(Rejection::Spam);
    }
    Ok(())
}

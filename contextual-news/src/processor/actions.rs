use super::events::EventSignals;
use crate::types::{ActionKind, SuggestedAction};
use crate::utils::text::contains_term;

pub const MAX_ACTIONS: usize = 3;

const LEARNING_TERMS: &[&str] = &["course", "tutorial", "learning"];
const CAREER_TERMS: &[&str] = &["job", "career", "hiring", "apply"];

fn any_term(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| contains_term(text, t))
}

/// Suggested follow-ups in fixed priority order, at most three.
pub fn suggest(text: &str, signals: &EventSignals) -> Vec<SuggestedAction> {
    let text = text.to_lowercase();
    let mut actions = Vec::new();

    if signals.is_local_event {
        let mut action = SuggestedAction::new(ActionKind::AddToCalendar, "Add to Calendar")
            .with_meta("icon", "calendar_today")
            .with_meta("color", "#2196F3");
        if let Some(date) = signals.event_date {
            action = action.with_meta("date", date.to_rfc3339());
        }
        if let Some(location) = &signals.location {
            action = action.with_meta("location", location.clone());
        }
        actions.push(action);
    }

    if any_term(&text, LEARNING_TERMS) {
        actions.push(
            SuggestedAction::new(ActionKind::CreateTask, "Create Learning Task")
                .with_meta("icon", "task_alt")
                .with_meta("color", "#4CAF50")
                .with_meta("type", "learning"),
        );
    }

    if let Some(deadline) = signals.deadline {
        actions.push(
            SuggestedAction::new(ActionKind::SetReminder, "Set Reminder")
                .with_meta("icon", "notifications")
                .with_meta("color", "#FF9800")
                .with_meta("deadline", deadline.to_rfc3339()),
        );
    }

    if any_term(&text, CAREER_TERMS) {
        actions.push(
            SuggestedAction::new(ActionKind::CreateTask, "Create Career Task")
                .with_meta("icon", "work")
                .with_meta("color", "#9C27B0")
                .with_meta("type", "career"),
        );
    }

    actions.truncate(MAX_ACTIONS);
    actions
}

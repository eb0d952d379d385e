pub mod defs;

pub use defs::{
    ActionContext, ActionExecutor, ActionKind, ActionReceipt, ProfileSource, SuggestedAction,
    UserProfile,
};

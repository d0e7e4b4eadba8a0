pub mod claude_api;
pub mod debounce;
pub mod events;
pub mod family;
pub mod goals;
pub mod insights;
pub mod journal;
pub mod profile;
pub mod progress;
pub mod routine;
pub mod scoring;
pub mod urgency;
pub mod validation;

pub mod connection_task;
pub mod family_event;
pub mod focus_routine;
pub mod journal_entry;
pub mod long_term_goal;
pub mod routine_task;
pub mod user;

pub mod energy;
pub mod flip;
pub mod mastery;
pub mod quiz_token;
pub mod session;
pub mod study_entry;

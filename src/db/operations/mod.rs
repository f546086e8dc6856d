pub mod decks;
pub mod energy;
pub mod progress;
pub mod tokens;
pub mod users;

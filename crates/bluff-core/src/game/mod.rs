pub mod error;
pub mod opponent;
pub mod rules;
pub mod serialization;
pub mod state;
pub mod turn;

pub mod claim;
pub mod hand;
pub mod history;
pub mod player;
pub mod strength;

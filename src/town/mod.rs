//! The home settlement: buildings the player upgrades with resources and
//! liberated locations.

pub mod logic;
pub mod types;

pub use logic::*;
pub use types::*;

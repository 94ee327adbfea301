//! Game state, configuration and the gameloop that advances them.

pub mod config;
pub mod constants;
pub mod game_state;
pub mod setup;
pub mod store;
pub mod tick;
pub mod timers;
pub mod worker;

pub use config::*;
pub use game_state::*;
pub use setup::*;
pub use store::*;
pub use tick::*;
pub use timers::*;
pub use worker::*;

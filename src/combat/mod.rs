//! Turn-based encounters between the party and a location's guardians.

pub mod damage;
pub mod guardians;
pub mod logic;
pub mod types;

pub use damage::*;
pub use guardians::*;
pub use logic::*;
pub use types::*;

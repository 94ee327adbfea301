//! Item and skill instances: creation, drops, equipping, salvage.

pub mod drops;
pub mod equipment;
pub mod generation;
pub mod salvage;
pub mod types;

pub use drops::*;
pub use equipment::*;
pub use generation::*;
pub use salvage::*;
pub use types::*;

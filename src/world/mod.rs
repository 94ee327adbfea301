//! The world map: locations, fog, zones of control, travel and claims.

pub mod cache;
pub mod claim;
pub mod explore;
pub mod fog;
pub mod generation;
pub mod interconnect;
pub mod travel;
pub mod types;

pub use cache::*;
pub use claim::*;
pub use explore::*;
pub use fog::*;
pub use generation::*;
pub use interconnect::*;
pub use travel::*;
pub use types::*;

pub mod cli_commands;
pub mod core;
mod crs;
mod geometry;
mod positions;
pub mod serialization;

pub use self::crs::*;
pub use self::geometry::*;
pub use self::positions::*;
pub use self::core::*;

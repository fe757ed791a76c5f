//! Safe SQL assembly: identifiers are literals in code, values always travel as parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;

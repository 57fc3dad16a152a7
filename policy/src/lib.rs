//! Business rules shared by every API crate.
//!
//! Everything here is pure: callers pass the current time and the rows they
//! loaded, nothing touches the database or the network.

pub mod lifecycle;
pub mod limits;
pub mod subscription;
pub mod temperature;

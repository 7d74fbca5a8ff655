pub mod math;
pub mod time;

// Foundation crate: plain numeric types and pure geometry only.
pub use time::*;

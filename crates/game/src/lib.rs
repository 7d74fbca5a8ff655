pub mod config;
pub mod machine;
pub mod outputs;
pub mod phase;
pub mod round;
pub mod summary;

pub use config::*;
pub use machine::*;
pub use phase::*;
pub use round::*;
pub use summary::*;

pub mod observable;
pub mod output;
pub mod throttle;
pub mod timer;

pub use observable::*;
pub use output::*;
pub use throttle::*;
pub use timer::*;

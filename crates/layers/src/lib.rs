pub mod countries;
pub mod resolver;

pub use countries::*;
pub use resolver::*;

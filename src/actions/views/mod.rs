pub mod aircraft;
pub mod airport;
pub mod flight;

pub use aircraft::*;
pub use airport::*;
pub use flight::*;

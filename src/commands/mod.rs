pub mod report;
pub mod seed;
pub mod web;

pub use report::handle_report;
pub use seed::handle_seed;
pub use web::handle_web;

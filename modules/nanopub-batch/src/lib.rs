pub mod aggregate;
pub mod extract;
pub mod fetch;
pub mod report;
pub mod runner;
pub mod validate;

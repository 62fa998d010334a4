pub mod bootstrap;
pub mod report;

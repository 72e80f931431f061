pub mod extract;
pub mod parser;
pub mod workflow;

pub mod fields;
pub mod honeypot;
pub mod parser;
pub mod pipeline;

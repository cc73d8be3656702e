pub mod rmcp;
pub mod stdio;

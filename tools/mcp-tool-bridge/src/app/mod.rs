pub mod catalog;
pub mod discovery;
pub mod function_tool;

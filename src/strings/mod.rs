pub mod help;
pub mod logs;
pub mod templates;

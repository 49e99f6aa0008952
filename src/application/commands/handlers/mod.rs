//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod import_handlers;

pub use import_handlers::*;

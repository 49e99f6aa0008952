//! Persistence Layer - 数据持久化
//!
//! 项目、章节版本与提示词均存于 SQLite

pub mod sqlite;

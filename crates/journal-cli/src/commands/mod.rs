pub mod add;
pub mod ask;
pub mod auth_cmd;
pub mod chat;
pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod list;
pub mod show;
pub mod write;

pub mod adaptive;
pub mod assignee;
pub mod completion;
pub mod config;
pub mod error;
pub mod model;
pub mod schedule;
pub mod storage;

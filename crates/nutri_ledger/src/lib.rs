pub mod config;
pub mod dispatch;
pub mod error;
pub mod forms;
pub mod matchers;
pub mod records;
pub mod replies;
pub mod router;
pub mod server;
pub mod state;
pub mod storage;
pub mod telegram;

pub mod database;
pub mod error;
pub mod os;
pub mod storage;
pub mod utils;

//! Application services

pub mod manager;
pub mod storage;

pub use manager::{MapInfo, MindMapManager, Outcome};
pub use storage::{MapStorage, MAP_EXTENSION};

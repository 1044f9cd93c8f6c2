pub mod replay;

pub use replay::{replay, ReplayRecord};

mod console;

pub use console::ConsoleSink;

use crate::pipeline::PublishedState;
use anyhow::Result;

/// Trait for presentation of published state
pub trait StateSink {
    /// Present a state snapshot
    fn present(&mut self, state: &PublishedState) -> Result<()>;
}

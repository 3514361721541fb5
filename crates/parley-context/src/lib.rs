mod strategy;
mod windowed;

pub use strategy::{count_words, BoundedHistory, ContextStrategy};
pub use windowed::WindowedContextStrategy;

pub mod align;
pub mod core;
pub mod export;
pub mod frames;
pub mod pipeline;
pub mod source;

pub use crate::align::{AlignmentEngine, AlignmentOutcome, PageProbe};
pub use crate::core::config::AlignConfig;
pub use crate::core::error::AlignError;
pub use crate::core::model::{AlignmentReport, MatchPair, Page, PageSequence, StreamRole};

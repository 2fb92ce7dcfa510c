pub mod dir_reader;
pub mod page_name;

pub use dir_reader::PageDirectory;
pub use page_name::page_number_of;

use crate::core::error::AlignResult;
use crate::core::model::{PageSequence, StreamRole};

pub trait PageSource {
    fn load_sequence(&self, role: StreamRole) -> AlignResult<PageSequence>;
}

pub mod document;
pub mod styles;
mod writer;

pub use document::{DocxDocument, Fragment, FragmentId, Run};
pub use writer::{write_docx, write_docx_to_writer};

pub mod client;
pub mod latex;
pub mod preprocess;

pub use client::VisionClient;
pub use latex::{clean_latex, strip_math_delimiters};
pub use preprocess::prepare_for_upload;

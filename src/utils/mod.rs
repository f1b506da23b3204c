mod error;
mod interval;
mod readers;
mod util;

pub use error::{Error, Result};
pub(crate) use interval::parse_coordinate;
pub use interval::{normalize_chromosome, GenomicInterval};
pub use readers::open_text_reader;
pub use util::{copy_new_file, ensure_output_dir, handle_error_and_exit};

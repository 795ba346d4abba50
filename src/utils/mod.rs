mod string;

pub use string::{collapse_whitespace, relative_path, unquote_go_string};

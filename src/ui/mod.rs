mod output;

pub use output::{print_summary, spinner, spinner_error, spinner_success};

//! CLI command messaging
//!
//! Consistent, colour-tagged output for the one-shot subcommands.

const INFO: &str = "\x1b[1;36m[INFO]\x1b[0m";
const WARN: &str = "\x1b[1;33m[WARN]\x1b[0m";
const ERROR: &str = "\x1b[1;31m[ERROR]\x1b[0m";
const SUCCESS: &str = "\x1b[1;32m[SUCCESS]\x1b[0m";

fn tagged(tag: &str, title: &str, details: &str) -> String {
    if details.is_empty() {
        format!("{} {}", tag, title)
    } else {
        format!("{} {}\t {}", tag, title, details)
    }
}

pub fn print_info(title: &str, details: &str) {
    println!("{}", tagged(INFO, title, details));
}

pub fn print_warn(title: &str, details: &str) {
    println!("{}", tagged(WARN, title, details));
}

/// Errors go to stderr so piped output stays clean.
pub fn print_error(title: &str, details: Option<&str>) {
    eprintln!("{}", tagged(ERROR, title, details.unwrap_or_default()));
}

pub fn print_success(title: &str, details: &str) {
    println!("{}", tagged(SUCCESS, title, details));
}

#[macro_export]
macro_rules! print_cmd_info {
    ($title:expr, $($details:tt)*) => {
        $crate::cli_messages::print_info($title, &format!($($details)*))
    };
}

#[macro_export]
macro_rules! print_cmd_warn {
    ($title:expr, $($details:tt)*) => {
        $crate::cli_messages::print_warn($title, &format!($($details)*))
    };
}

#[macro_export]
macro_rules! print_cmd_error {
    ($title:expr) => {
        $crate::cli_messages::print_error($title, None)
    };
    ($title:expr, $details:expr) => {
        $crate::cli_messages::print_error($title, Some($details))
    };
}

#[macro_export]
macro_rules! print_cmd_success {
    ($title:expr, $($details:tt)*) => {
        $crate::cli_messages::print_success($title, &format!($($details)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_are_tab_separated() {
        assert_eq!(tagged("[T]", "Saved", ""), "[T] Saved");
        assert_eq!(tagged("[T]", "Saved", "~/.dualfarm"), "[T] Saved\t ~/.dualfarm");
    }
}

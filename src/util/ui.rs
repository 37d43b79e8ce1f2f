//! Status lines for the user.
//!
//! stdout belongs to the driver, so everything here goes to stderr.

/// Print a success message with checkmark
pub fn success(msg: &str) {
    eprintln!("  ✓ {}", msg);
}

/// Print an error message with X
pub fn error(msg: &str) {
    eprintln!("  ✗ {}", msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    eprintln!("  ⚠ {}", msg);
}

/// Print an info message
pub fn info(msg: &str) {
    eprintln!("{}", msg);
}

//! Custom assertions for nbacross integration tests

use super::RunResult;

/// Extension trait for nbacross-specific assertions
pub trait NbacrossAssertions {
    /// Assert that the driver received `-t <template>` for these flags
    fn assert_template_for(&self, tool_and_flags: &str);

    /// Assert that the driver was never launched
    fn assert_driver_not_run(&self);

    /// Assert that error output contains a message
    fn assert_error_contains(&self, message: &str);

    /// Assert the harness exited with this code
    fn assert_exit_code(&self, code: i32);

    /// Assert command succeeded
    fn assert_success(&self);

    /// Assert command failed
    fn assert_failure(&self);
}

impl NbacrossAssertions for RunResult {
    fn assert_template_for(&self, tool_and_flags: &str) {
        let suffix = format!("{} > %O", tool_and_flags);
        let args = self.driver_args();
        let found = args
            .windows(2)
            .any(|w| w[0] == "-t" && w[1].starts_with("cat %H | ") && w[1].ends_with(&suffix));
        assert!(
            found,
            "Expected a `-t 'cat %H | ...{}'` template, driver got:\n{:#?}",
            suffix, args
        );
    }

    fn assert_driver_not_run(&self) {
        assert!(
            self.driver_args().is_empty() && !self.output_contains("should-not-run"),
            "Driver should not have run:\nstdout: {}\nstderr: {}",
            self.stdout,
            self.stderr
        );
    }

    fn assert_error_contains(&self, message: &str) {
        assert!(
            !self.success() && self.stderr_contains(message),
            "Expected error containing '{}', got:\nexit: {}\nstdout: {}\nstderr: {}",
            message,
            self.exit_code,
            self.stdout,
            self.stderr
        );
    }

    fn assert_exit_code(&self, code: i32) {
        assert_eq!(
            self.exit_code, code,
            "Unexpected exit code:\nstdout: {}\nstderr: {}",
            self.stdout, self.stderr
        );
    }

    fn assert_success(&self) {
        assert!(
            self.success(),
            "Expected success (exit 0), got exit {}:\nstdout: {}\nstderr: {}",
            self.exit_code,
            self.stdout,
            self.stderr
        );
    }

    fn assert_failure(&self) {
        assert!(
            !self.success(),
            "Expected failure (non-zero exit), got exit 0:\nstdout: {}\nstderr: {}",
            self.stdout,
            self.stderr
        );
    }
}

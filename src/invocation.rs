//! Driver command line assembly
//!
//! The driver receives one `-t <template>` per translator. Each template is
//! a shell pipeline that the driver expands per test case:
//!
//!   cat %H | <translator> > %O
//!
//! `%H` (input automaton) and `%O` (output file) are left untouched here.
//! The final command line is an argument vector; no shell sits between
//! nbacross and the driver.

use crate::combinator::Variant;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Input-file marker expanded by the driver
pub const INPUT_MARKER: &str = "%H";

/// Output-file marker expanded by the driver
pub const OUTPUT_MARKER: &str = "%O";

/// Flag introducing each translator template
const TRANSLATOR_FLAG: &str = "-t";

/// A translator invocation with placeholders for the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationTemplate {
    text: String,
}

impl InvocationTemplate {
    /// `cat %H | <command> > %O`
    pub fn wrap(command: &str) -> Self {
        Self {
            text: format!("cat {} | {} > {}", INPUT_MARKER, command, OUTPUT_MARKER),
        }
    }

    /// Wrap the tool under test with one variant's flags
    ///
    /// The tool path is shell-quoted; variant flags are inserted verbatim.
    pub fn for_variant(tool: &Path, variant: &Variant) -> Self {
        let tool = shell_quote(&tool.to_string_lossy());
        if variant.is_empty() {
            Self::wrap(&tool)
        } else {
            Self::wrap(&format!("{} {}", tool, variant.render()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for InvocationTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Files the driver writes its findings to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    /// Counterexamples for disagreeing translators
    pub bogus: PathBuf,
    /// Per-translator statistics
    pub stats: PathBuf,
}

impl OutputFiles {
    pub fn to_args(&self) -> [OsString; 2] {
        [
            flag_with_path("--save-bogus=", &self.bogus),
            flag_with_path("--csv=", &self.stats),
        ]
    }
}

fn flag_with_path(flag: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(flag);
    arg.push(path.as_os_str());
    arg
}

/// An assembled program + argument vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandLine {
    pub fn builder<S: AsRef<OsStr>>(program: S) -> CommandLineBuilder {
        CommandLineBuilder {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
        }
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    #[cfg(test)]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Build a `Command` using argv-style APIs only
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Shell-quoted rendering, for display only
impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(&arg.to_string_lossy()))?;
        }
        Ok(())
    }
}

pub struct CommandLineBuilder {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandLineBuilder {
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn build(self) -> CommandLine {
        CommandLine {
            program: self.program,
            args: self.args,
        }
    }
}

/// Everything needed to build the driver command line
#[derive(Debug, Clone)]
pub struct DriverInvocation<'a> {
    pub driver: &'a Path,
    pub driver_args: &'a [String],
    pub baseline: &'a str,
    pub tool: &'a Path,
    pub variants: &'a [Variant],
    pub outputs: &'a OutputFiles,
    pub passthrough: &'a [String],
}

impl DriverInvocation<'_> {
    /// Baseline first, then one template per variant
    pub fn templates(&self) -> Vec<InvocationTemplate> {
        std::iter::once(InvocationTemplate::wrap(self.baseline))
            .chain(
                self.variants
                    .iter()
                    .map(|variant| InvocationTemplate::for_variant(self.tool, variant)),
            )
            .collect()
    }

    pub fn command_line(&self) -> CommandLine {
        let mut builder = CommandLine::builder(self.driver).args(self.driver_args);

        for template in self.templates() {
            builder = builder.arg(TRANSLATOR_FLAG).arg(template.as_str());
        }

        builder
            .args(self.outputs.to_args())
            .args(self.passthrough)
            .build()
    }
}

/// Quote a word for a POSIX shell if it needs it
fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+%@".contains(c));

    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

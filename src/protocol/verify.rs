//! Result Verifier
//!
//! The array reports success or failure only through free-form text, so
//! each call site states what a successful answer looks like as a
//! [`SuccessPredicate`]. A failed predicate becomes
//! [`Error::CommandVerification`] carrying the command and both streams.

use crate::domain::ports::CommandOutput;
use crate::error::{Error, Result};
use tracing::error;

/// What a successful answer to a command looks like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuccessPredicate {
    /// Both stdout and stderr are empty
    #[default]
    BothEmpty,
    /// stderr is empty; stdout may carry informational text
    StderrEmpty,
    /// stdout contains the given confirmation text
    StdoutContains(&'static str),
    /// Both streams are empty, or either one mentions the given text
    /// (case-insensitive)
    EmptyOrMentions(&'static str),
}

impl SuccessPredicate {
    pub fn holds(&self, output: &CommandOutput) -> bool {
        match self {
            SuccessPredicate::BothEmpty => output.stdout.is_empty() && output.stderr.is_empty(),
            SuccessPredicate::StderrEmpty => output.stderr.is_empty(),
            SuccessPredicate::StdoutContains(needle) => output.stdout.contains(needle),
            SuccessPredicate::EmptyOrMentions(needle) => {
                if output.stdout.is_empty() && output.stderr.is_empty() {
                    return true;
                }
                let needle = needle.to_lowercase();
                output.stdout.to_lowercase().contains(&needle)
                    || output.stderr.to_lowercase().contains(&needle)
            }
        }
    }
}

/// Fail with a verification error unless `predicate` holds for `output`
pub fn ensure_succeeded(
    command: &str,
    output: &CommandOutput,
    message: &str,
    predicate: SuccessPredicate,
) -> Result<()> {
    if predicate.holds(output) {
        return Ok(());
    }

    let err = Error::CommandVerification {
        message: message.to_string(),
        command: command.to_string(),
        stdout: output.stdout.clone(),
        stderr: output.stderr.clone(),
    };
    error!("{}", err);
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_predicate_requires_silence() {
        let predicate = SuccessPredicate::default();
        assert_eq!(predicate, SuccessPredicate::BothEmpty);
        assert!(predicate.holds(&CommandOutput::empty()));
        assert!(!predicate.holds(&CommandOutput::new("lun map: done", "")));
        assert!(!predicate.holds(&CommandOutput::new("", "lun map: failed")));
    }

    #[test]
    fn test_stderr_only_predicate_ignores_confirmation_text() {
        let output = CommandOutput::new("lun create: created a LUN of size:    1.0g", "");
        assert!(SuccessPredicate::StderrEmpty.holds(&output));
        assert!(!SuccessPredicate::StderrEmpty.holds(&CommandOutput::new("", "No such volume")));
    }

    #[test]
    fn test_stdout_contains() {
        let predicate = SuccessPredicate::StdoutContains("Clone operation started successfully");
        assert!(predicate.holds(&CommandOutput::new(
            "Clone operation started successfully. ID: 3",
            ""
        )));
        assert!(!predicate.holds(&CommandOutput::empty()));
    }

    #[test]
    fn test_empty_or_mentions() {
        let predicate = SuccessPredicate::EmptyOrMentions("not mapped");
        assert!(predicate.holds(&CommandOutput::empty()));
        assert!(predicate.holds(&CommandOutput::new(
            "",
            "lun unmap: LUN /vol/vol0/v1 is Not Mapped to openstack"
        )));
        assert!(!predicate.holds(&CommandOutput::new("", "lun unmap: No such LUN exists")));
    }

    #[test]
    fn test_failure_carries_command_and_streams() {
        let output = CommandOutput::new("partial", "igroup: no such group");
        let result = ensure_succeeded(
            "igroup add -f openstack iqn.x",
            &output,
            "error initializing connection",
            SuccessPredicate::BothEmpty,
        );

        assert_matches!(
            result,
            Err(Error::CommandVerification { message, command, stdout, stderr })
                if message == "error initializing connection"
                    && command == "igroup add -f openstack iqn.x"
                    && stdout == "partial"
                    && stderr == "igroup: no such group"
        );
    }
}

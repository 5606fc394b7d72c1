//! Exit code constants for the vdiff CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unreadable files, invalid config)
//! - 2: A diff could not be parsed into a variation diff
//! - 3: Git operation failure

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unreadable input, or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// Parse failure: malformed diff, unbalanced annotations, or an unparseable condition.
pub const PARSE_FAILURE: i32 = 2;

/// Git operation failure: unknown revision, failed `git diff`/`git show`.
pub const GIT_FAILURE: i32 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [SUCCESS, USER_ERROR, PARSE_FAILURE, GIT_FAILURE];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn exit_codes_fit_in_a_byte() {
        for code in [SUCCESS, USER_ERROR, PARSE_FAILURE, GIT_FAILURE] {
            assert!((0..=255).contains(&code));
        }
    }
}

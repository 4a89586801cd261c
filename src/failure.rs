use std::fmt;

use anyhow::Error;

/// Exit status for errors that carry no [`Failure`] tag, including usage errors.
pub const GENERAL_EXIT_CODE: i32 = 1;

/// Outcome category attached to an error as `anyhow` context.
///
/// Each category maps to the stable exit status documented for its command, so
/// calling scripts can branch on how a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// `create-db`: the destination exists and `--force` was not given.
    DatabaseExists,
    /// `create-db`: preparing the path or running the DDL failed.
    Schema,
    /// `import-items`: the source JSON file does not exist.
    SourceMissing,
    /// `import-items`: the source could not be read or is not an array of objects.
    SourceInvalid,
    /// `import-items`: the upsert transaction failed.
    Import,
}

impl Failure {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::DatabaseExists => 2,
            Self::Schema => 3,
            Self::SourceMissing => 2,
            Self::SourceInvalid => 3,
            Self::Import => 4,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::DatabaseExists => "database file already exists; pass --force to overwrite",
            Self::Schema => "failed to create database schema",
            Self::SourceMissing => "item source file not found",
            Self::SourceInvalid => "failed to read or parse item source file",
            Self::Import => "item import failed",
        };
        f.write_str(message)
    }
}

pub fn exit_code_for(err: &Error) -> i32 {
    err.downcast_ref::<Failure>()
        .map(|failure| failure.exit_code())
        .unwrap_or(GENERAL_EXIT_CODE)
}

#[cfg(test)]
mod tests {
    use anyhow::{Context, anyhow};

    use super::{Failure, GENERAL_EXIT_CODE, exit_code_for};

    #[test]
    fn tagged_errors_map_to_their_exit_code() {
        let err = anyhow!("disk full")
            .context("failed to create table StdItems")
            .context(Failure::Schema);
        assert_eq!(exit_code_for(&err), 3);
    }

    #[test]
    fn tag_is_found_beneath_later_context() {
        let result = Err::<(), _>(anyhow!("constraint failed"))
            .context(Failure::Import)
            .context("while importing items.json");
        let err = result.expect_err("error should propagate");
        assert_eq!(exit_code_for(&err), 4);
    }

    #[test]
    fn untagged_errors_use_general_exit_code() {
        let err = anyhow!("something else");
        assert_eq!(exit_code_for(&err), GENERAL_EXIT_CODE);
    }
}

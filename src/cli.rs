use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_ITEMS_FILE: &str = "DB/Stditems/药水.json";

#[derive(Parser, Debug)]
#[command(
    name = "gamedb",
    version,
    about = "Create and populate the Magic/StdItems/Monster game database"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the Magic, StdItems and Monster tables in a new database file.
    CreateDb(CreateDbArgs),
    /// Upsert item records from a JSON array into StdItems.
    ImportItems(ImportItemsArgs),
    /// Show row counts for the game tables.
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CreateDbArgs {
    #[arg(long = "db", short = 'd')]
    pub db_path: PathBuf,

    /// Replace the database file if it already exists.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ImportItemsArgs {
    #[arg(long = "db", short = 'd')]
    pub db_path: PathBuf,

    #[arg(long = "file", short = 'f', default_value = DEFAULT_ITEMS_FILE)]
    pub source_path: PathBuf,

    /// Write a JSON summary of the import after it commits.
    #[arg(long = "report")]
    pub report_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long = "db", short = 'd')]
    pub db_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use clap::error::ErrorKind;

    use super::{Cli, Commands, DEFAULT_ITEMS_FILE};

    #[test]
    fn create_db_accepts_short_db_flag_and_force() {
        let cli = Cli::try_parse_from(["gamedb", "create-db", "-d", "out/game.db", "--force"])
            .expect("create-db args should parse");

        let Commands::CreateDb(args) = cli.command else {
            panic!("expected create-db command");
        };
        assert_eq!(args.db_path.to_str(), Some("out/game.db"));
        assert!(args.force);
    }

    #[test]
    fn import_items_defaults_source_file() {
        let cli = Cli::try_parse_from(["gamedb", "import-items", "--db", "game.db"])
            .expect("import-items args should parse");

        let Commands::ImportItems(args) = cli.command else {
            panic!("expected import-items command");
        };
        assert_eq!(args.source_path.to_str(), Some(DEFAULT_ITEMS_FILE));
        assert!(args.report_path.is_none());
    }

    #[test]
    fn missing_db_argument_is_a_usage_error() {
        let err = Cli::try_parse_from(["gamedb", "create-db", "--force"])
            .expect_err("missing --db should be rejected");
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    version,
    about = "Supabase client setup - validate and exercise VITE_SUPABASE_* settings"
)]
pub struct Cli {
    /// Read settings from this dotenv file instead of ./.env
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Supabase project URL (overrides --env-file and VITE_SUPABASE_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Supabase anon (public) key (overrides --env-file and VITE_SUPABASE_ANON_KEY)
    #[arg(long, global = true)]
    pub anon_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate the configuration and show what was found
    Check,
    /// Print the derived service endpoints
    Endpoints,
    /// Call the auth health endpoint
    Health,
    /// Fetch rows from a table through the REST endpoint
    Select {
        /// Table or view name
        table: String,
        /// Column list passed as `select=`
        #[arg(long, default_value = "*")]
        columns: String,
        /// Maximum number of rows
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_select_with_options() {
        let cli = Cli::parse_from([
            "supaenv",
            "--url",
            "https://abcd.supabase.co",
            "--anon-key",
            "k",
            "select",
            "items",
            "--columns",
            "id,name",
            "--limit",
            "5",
        ]);

        assert_eq!(cli.url.as_deref(), Some("https://abcd.supabase.co"));
        match cli.command {
            Command::Select {
                table,
                columns,
                limit,
            } => {
                assert_eq!(table, "items");
                assert_eq!(columns, "id,name");
                assert_eq!(limit, Some(5));
            }
            _ => panic!("expected select"),
        }
    }

    #[test]
    fn global_flags_may_follow_subcommand() {
        let cli = Cli::parse_from(["supaenv", "check", "--env-file", "prod.env"]);
        assert_eq!(cli.env_file, Some(PathBuf::from("prod.env")));
        assert!(matches!(cli.command, Command::Check));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

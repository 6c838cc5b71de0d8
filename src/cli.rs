use clap::{Parser, Subcommand, ValueEnum};
use sheetpull::transport::TransportKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sheetpull")]
#[command(about = "Fetch rows from a published spreadsheet", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch one or more chunks of a sheet
    Fetch(FetchArgs),
}

#[derive(clap::Args, Debug)]
pub struct FetchArgs {
    /// Sheet URL; falls back to `defaults.url` from the configuration
    #[arg(long)]
    pub url: Option<String>,

    /// Query language statement
    #[arg(long, short)]
    pub query: Option<String>,

    /// Rows per chunk (0 fetches everything at once)
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Header rows in the sheet to leave out of row numbering
    #[arg(long)]
    pub headers: Option<usize>,

    /// Column label override, repeated once per column
    #[arg(long = "label")]
    pub labels: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Render into a table (thead/tbody) instead of a plain block
    #[arg(long)]
    pub table: bool,

    /// Chunks to fetch; 0 keeps going until every row is loaded
    #[arg(long, default_value_t = 1)]
    pub pages: usize,

    /// Forget paging and failure state before the first request
    #[arg(long)]
    pub reset: bool,

    /// Override the configured transport
    #[arg(long, value_enum)]
    pub transport: Option<TransportKind>,

    /// Configuration file (default: $SHEETPULL_CONFIG or config/sheetpull.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per row
    Json,
    /// Accumulated markup
    Html,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetch_args() {
        let cli = Cli::try_parse_from([
            "sheetpull",
            "fetch",
            "--url",
            "https://docs.google.com/spreadsheets/d/abc/edit#gid=0",
            "--chunk-size",
            "10",
            "--label",
            "Name",
            "--label",
            "Score",
            "--format",
            "html",
            "--pages",
            "0",
            "--transport",
            "callback",
        ])
        .unwrap();

        let Commands::Fetch(args) = cli.command;
        assert_eq!(args.chunk_size, Some(10));
        assert_eq!(args.labels, vec!["Name", "Score"]);
        assert_eq!(args.format, OutputFormat::Html);
        assert_eq!(args.pages, 0);
        assert_eq!(args.transport, Some(TransportKind::Callback));
        assert!(!args.table);
    }
}

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI для разбора MDF без движка SQL Server
#[derive(Parser, Debug)]
#[command(
    name = "mdfcarve",
    version,
    about = "Carve page headers, ghost rows and LOB values out of a SQL Server MDF file",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

/// Известные схемы строк для --schema
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schema {
    /// pictures(id int, date char(8), category nchar(16), filename nvarchar(255), data image)
    Pictures,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Dump every page header as CSV (or JSON lines with --json)
    Headers {
        /// Path to MDF file
        #[arg(short, long)]
        input: PathBuf,
        /// Only data pages (type 1)
        #[arg(short, long, default_value_t = false)]
        leaf: bool,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Parse records of a data page, marking ghost/deleted ones
    ///
    /// Пример:
    ///   mdfcarve rows -i db.mdf -p 153
    ///   mdfcarve rows -i db.mdf -p 153 --deleted --schema pictures
    Rows {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        page: u32,
        /// Show only deleted records
        #[arg(short, long, default_value_t = false)]
        deleted: bool,
        /// Decode columns with a known table layout
        #[arg(long, value_enum)]
        schema: Option<Schema>,
        /// JSON lines, one per record
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the ordered leaf list of a LARGE_ROOT LOB tree
    LobTree {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        page: u32,
        #[arg(short, long)]
        slot: u16,
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Fail if any irregular value was seen
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Extract a LARGE_ROOT (type 5) LOB and append its bytes to --output
    LobLarge {
        #[arg(short, long)]
        input: PathBuf,
        /// Output file (opened in append mode)
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long)]
        page: u32,
        #[arg(short, long)]
        slot: u16,
        /// Refuse to extract if the tree walk reported irregular values
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Print a SMALL_ROOT (type 0) LOB stored inline
    LobSmall {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        page: u32,
        #[arg(short, long)]
        slot: u16,
        /// Optional file to append the raw value to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

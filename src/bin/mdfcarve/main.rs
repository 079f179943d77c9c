use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};

mod cli;
mod util;
mod cmd_headers;
mod cmd_rows;
mod cmd_lob_tree;
mod cmd_lob_large;
mod cmd_lob_small;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт: info. Лог идёт в stderr,
    // stdout остаётся под CSV/JSON/hex-вывод.
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Headers { input, leaf, json } =>
            cmd_headers::exec(input, leaf, json),

        cli::Cmd::Rows { input, page, deleted, schema, json } =>
            cmd_rows::exec(input, page, deleted, schema, json),

        cli::Cmd::LobTree { input, page, slot, json, strict } =>
            cmd_lob_tree::exec(input, page, slot, json, strict),

        cli::Cmd::LobLarge { input, output, page, slot, strict } =>
            cmd_lob_large::exec(input, output, page, slot, strict),

        cli::Cmd::LobSmall { input, page, slot, output } =>
            cmd_lob_small::exec(input, page, slot, output),
    }
}

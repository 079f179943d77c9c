use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use mdfcarve::extract_large;

use super::util::{load_config, open_input};

pub fn exec(input: PathBuf, output: PathBuf, page: u32, slot: u16, strict: bool) -> Result<()> {
    let cfg = load_config(strict);
    let mut reader = open_input(&input)?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&output)
        .with_context(|| format!("open output {}", output.display()))?;
    let mut out = BufWriter::new(f);

    // В строгом режиме extract_large отказывается до первой записи в выход.
    let res = extract_large(&mut reader, page, slot, &mut out, &cfg);
    // То, что уже собрано до ошибки, остаётся в файле.
    out.flush()?;
    let ex = res?;

    println!("Page {}, Slot {} => Offset {}", ex.page, ex.slot, ex.root_offset);
    println!("Wrote {} bytes from {} leaf record(s)", ex.bytes_written, ex.leaves);
    Ok(())
}

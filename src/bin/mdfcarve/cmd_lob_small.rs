use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use mdfcarve::extract_small;

use super::util::{display_text, hex_dump, open_input};

pub fn exec(input: PathBuf, page: u32, slot: u16, output: Option<PathBuf>) -> Result<()> {
    let mut reader = open_input(&input)?;
    let v = extract_small(&mut reader, page, slot)?;

    if let Some(out_path) = output {
        // как и lob-large: дописываем в конец
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&out_path)
            .with_context(|| format!("open output {}", out_path.display()))?;
        f.write_all(&v)?;
        f.sync_all()?;
        println!("SMALL_ROOT: {} B -> appended to {}", v.len(), out_path.display());
    } else {
        println!("SMALL_ROOT: {} B", v.len());
        println!("text: {}", display_text(&v));
        print!("{}", hex_dump(&v));
    }
    Ok(())
}

use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::path::Path;

use mdfcarve::{CarveBuilder, CarveConfig, Diagnostics, PageReader};

/// Открыть MDF на чтение с понятной ошибкой.
pub fn open_input(path: &Path) -> Result<PageReader<File>> {
    if !path.exists() {
        return Err(anyhow!("{} does not exist", path.display()));
    }
    PageReader::open(path).with_context(|| format!("open {}", path.display()))
}

/// Конфиг из ENV; флаг --strict включает строгий режим поверх ENV.
pub fn load_config(strict: bool) -> CarveConfig {
    let mut b = CarveBuilder::new();
    if strict {
        b = b.strict(true);
    }
    b.build()
}

/// В строгом режиме любое предупреждение: ошибка запуска.
pub fn check_strict(cfg: &CarveConfig, diag: &Diagnostics) -> Result<()> {
    if cfg.strict && !diag.is_empty() {
        let first = diag.iter().next().map(|w| w.to_string()).unwrap_or_default();
        return Err(anyhow!(
            "strict mode: {} irregular value(s), first: {}",
            diag.len(),
            first
        ));
    }
    Ok(())
}

pub fn display_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => format!("(binary {} B)", bytes.len()),
    }
}

#[inline]
fn printable(b: u8) -> char {
    if (33..126).contains(&b) {
        b as char
    } else {
        '.'
    }
}

/// Hex-дамп по 16 байт в строке: "000010 xx xx ... xx ascii".
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in bytes.chunks(16).enumerate() {
        out.push_str(&format!("{:06X}", row * 16));
        for b in chunk {
            out.push_str(&format!(" {:02x}", b));
        }
        for _ in chunk.len()..16 {
            out.push_str("   ");
        }
        out.push(' ');
        out.extend(chunk.iter().map(|&b| printable(b)));
        out.push('\n');
    }
    out
}

pub fn to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{:02x}", b));
    }
    s
}

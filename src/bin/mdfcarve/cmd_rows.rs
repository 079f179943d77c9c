use anyhow::Result;
use log::warn;
use serde::Serialize;
use std::path::PathBuf;

use mdfcarve::schema::{decode_picture_row, PictureRow};
use mdfcarve::{scan_rows, RowRecord};

use super::cli::Schema;
use super::util::{hex_dump, open_input, to_hex};

#[derive(Serialize)]
struct RecordLine<'a> {
    page: u32,
    #[serde(flatten)]
    record: &'a RowRecord,
    hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pictures: Option<PictureRow>,
}

pub fn exec(
    input: PathBuf,
    page: u32,
    deleted_only: bool,
    schema: Option<Schema>,
    json: bool,
) -> Result<()> {
    let mut reader = open_input(&input)?;
    let scan = scan_rows(&mut reader, page)?;

    if !json {
        println!(
            "slotCnt: {}, freeData {}, slotArray: {}, actualSlots: {}",
            scan.slot_cnt,
            scan.free_data,
            scan.slot_array.len(),
            scan.actual_slots()
        );
    }

    for r in scan.records.iter().filter(|r| r.deleted || !deleted_only) {
        let bytes = scan.record_bytes(r)?;
        let decoded = match schema {
            Some(Schema::Pictures) => match decode_picture_row(bytes) {
                Ok(row) => Some(row),
                Err(e) => {
                    warn!("page {} record {}: pictures decode failed: {}", page, r.index, e);
                    None
                }
            },
            None => None,
        };

        if json {
            let line = RecordLine {
                page,
                record: r,
                hex: to_hex(bytes),
                pictures: decoded,
            };
            println!("{}", serde_json::to_string(&line)?);
            continue;
        }

        println!();
        if r.deleted {
            println!("[DELETED] Offset:{}, Slot:{}", r.offset, r.index);
        } else {
            println!("Offset:{}, Slot:{}", r.offset, r.index);
        }
        print!("{}", hex_dump(bytes));
        if let Some(row) = decoded {
            println!("id: {}", row.id);
            println!("date: {}", row.date);
            println!("Category: {}", row.category);
            println!("Filename: {}", row.filename);
            println!(
                "Data: {}, {}, {} (Page, File, Slot)",
                row.data.page, row.data.file_id, row.data.slot
            );
        }
    }
    Ok(())
}

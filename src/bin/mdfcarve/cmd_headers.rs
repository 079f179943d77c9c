use anyhow::Result;
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use mdfcarve::scan::for_each_page_header;
use mdfcarve::PageHeader;

use super::util::open_input;

#[derive(Serialize)]
struct HeaderLine<'a> {
    page_no: u32,
    #[serde(flatten)]
    header: &'a PageHeader,
}

pub fn exec(input: PathBuf, leaf: bool, json: bool) -> Result<()> {
    let mut reader = open_input(&input)?;
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if !json {
        writeln!(
            out,
            "pageId,type,typeFlag,level,flag,pminlen,slotCnt,\
             freeCnt,freeData,reservedCnt,ghostRecCnt"
        )?;
    }

    for_each_page_header(&mut reader, leaf, |page_no, h| {
        if json {
            let line = HeaderLine { page_no, header: h };
            serde_json::to_writer(&mut out, &line).map_err(std::io::Error::from)?;
            writeln!(out)?;
        } else {
            writeln!(
                out,
                "{},{},{},{},{},{},{},{},{},{},{}",
                h.page_id,
                h.page_type,
                h.type_flag,
                h.level,
                h.flag,
                h.pminlen,
                h.slot_cnt,
                h.free_cnt,
                h.free_data,
                h.reserved_cnt,
                h.ghost_rec_cnt
            )?;
        }
        Ok(())
    })?;

    out.flush()?;
    Ok(())
}

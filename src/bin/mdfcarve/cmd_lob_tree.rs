use anyhow::Result;
use std::path::PathBuf;

use mdfcarve::record::lob_type_name;
use mdfcarve::walk_lob_tree;

use super::util::{check_strict, load_config, open_input};

pub fn exec(input: PathBuf, page: u32, slot: u16, json: bool, strict: bool) -> Result<()> {
    let cfg = load_config(strict);
    let mut reader = open_input(&input)?;
    let tree = walk_lob_tree(&mut reader, page, slot, &cfg)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        println!(
            "Page {}, Slot {} => Offset {}",
            tree.root_page, tree.root_slot, tree.root_offset
        );
        println!(
            "{}: blob_id={} maxlinks={} curlinks={} level={}",
            lob_type_name(tree.record.rec_type),
            tree.record.blob_id,
            tree.root.maxlinks,
            tree.root.curlinks,
            tree.root.level
        );
        for l in &tree.links {
            println!("  link: size={} page={} file={} slot={}", l.size, l.page, l.file_id, l.slot);
        }
        println!(
            "leaves: {} (internal pages visited: {})",
            tree.leaves.len(),
            tree.nodes_visited
        );
        for leaf in &tree.leaves {
            println!("{},{}", leaf.page, leaf.slot);
        }
    }

    check_strict(&cfg, &tree.diagnostics)
}

//! `winhlp <path.hlp>`: reads a WinHelp container and writes a
//! structural JSON dump to stdout (spec §6 "CLI"). Exit 0 on success,
//! 1 on parse error, mirroring goblin's own `examples/rdr.rs`-style
//! driver binaries but built on the `serde_json::json!` macro rather
//! than `{:#?}` since the output is meant to be machine-read.
//!
//! This binary, and the `cli` feature gating it, are deliberately the
//! only demo built: spec §6 names `collect_test_files`,
//! `collect_coverage_files` and `extract_hlp_files` as out-of-scope
//! corpus tooling.

use std::env;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};

use winhelp::annotation::AnnotationFile;
use winhelp::helpfile::HelpFile;
use winhelp::richtext::{EmbeddedImage, HotspotTarget};
use winhelp::system::CodePage;

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let path = match args.next() {
        Some(p) => p,
        None => {
            eprintln!("usage: winhlp <path.hlp>");
            return ExitCode::FAILURE;
        }
    };
    let with_bitmaps = args.any(|a| a == "--with-bitmaps");

    match dump(&path, with_bitmaps) {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value).expect("Value serialization cannot fail"));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("winhlp: {e}");
            ExitCode::FAILURE
        }
    }
}

fn dump(path: &str, with_bitmaps: bool) -> Result<Value, String> {
    let data = fs::read(path).map_err(|e| format!("reading {path}: {e}"))?;
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    let is_gid = extension == "gid";

    if extension == "ann" {
        return dump_annotation(path, &data);
    }

    let help = HelpFile::open_with_options(data, Default::default(), is_gid).map_err(|e| e.to_string())?;

    let directory: Vec<&str> = help.directory.names().collect();

    let topics = help
        .topics()
        .map_err(|e| e.to_string())?
        .iter()
        .map(topic_to_json)
        .collect::<Vec<_>>();

    let mut bitmaps = serde_json::Map::new();
    for name in help.bitmap_names() {
        if let Some(pic) = help.bitmap(&name).map_err(|e| e.to_string())? {
            let mut obj = json!({
                "format": format!("{:?}", pic.format),
                "width": pic.header.width,
                "height": pic.header.height,
                "bit_count": pic.header.bit_count,
                "hotspots": pic.hotspots.iter().map(|h| json!({
                    "x": h.x,
                    "y": h.y,
                    "width": h.width,
                    "height": h.height,
                    "hash": h.hash,
                    "context": winhelp::context::reverse_hash(h.hash),
                    "name": h.name,
                    "target": h.target,
                })).collect::<Vec<_>>(),
            });
            if with_bitmaps {
                if let Some(bmp) = help.extract_bitmap(&name).map_err(|e| e.to_string())? {
                    obj["bmp_base64"] = json!(BASE64.encode(&bmp));
                }
            }
            bitmaps.insert(name, obj);
        }
    }

    let titles = help
        .title_tree()
        .map_err(|e| e.to_string())?
        .map(|tree| tree.len())
        .unwrap_or(0);

    Ok(json!({
        "path": path,
        "is_gid": is_gid,
        "header": {
            "magic": format!("{:#010x}", help.header.magic),
            "directory_start": help.header.directory_start,
            "free_chain_start": help.header.free_chain_start,
            "entire_file_size": help.header.entire_file_size,
        },
        "directory": directory,
        "system": {
            "version": help.system.header.map(|h| json!({"major": h.major, "minor": h.minor})),
            "codepage": format!("{:?}", help.codepage()),
            "title": help.system.title,
            "copyright": help.system.copyright,
        },
        "topic_count": topics.len(),
        "topics": topics,
        "bitmaps": bitmaps,
        "title_tree_entries": titles,
    }))
}

fn dump_annotation(path: &str, data: &[u8]) -> Result<Value, String> {
    let ann = AnnotationFile::parse(data, CodePage::Cp1252).map_err(|e| e.to_string())?;
    let entries = ann
        .references
        .iter()
        .zip(ann.texts.iter())
        .map(|(r, text)| {
            json!({
                "topic_offset": r.topic_offset,
                "text": text,
            })
        })
        .collect::<Vec<_>>();
    Ok(json!({
        "path": path,
        "kind": "annotation",
        "entries": entries,
    }))
}

fn topic_to_json(topic: &winhelp::topic::ParsedTopic) -> Value {
    let spans = topic
        .spans
        .iter()
        .map(|span| {
            json!({
                "text": span.text,
                "font_number": span.font_number,
                "embedded_image": span.embedded_image.as_ref().map(embedded_image_to_json),
            })
        })
        .collect::<Vec<_>>();

    let hotspots = topic
        .hotspots
        .iter()
        .map(|hs| {
            json!({
                "span_index": hs.span_index,
                "display_text": hs.display_text,
                "start_position": hs.start_position,
                "end_position": hs.end_position,
                "target": hotspot_target_to_json(&hs.target),
            })
        })
        .collect::<Vec<_>>();

    let tables = topic
        .tables
        .iter()
        .map(|table| {
            json!({
                "columns": table.columns,
                "table_type": table.table_type,
                "rows": table.rows.iter().map(|row| {
                    row.cells.iter().map(|cell| {
                        cell.spans.iter().map(|s| s.text.as_str()).collect::<String>()
                    }).collect::<Vec<_>>()
                }).collect::<Vec<_>>(),
            })
        })
        .collect::<Vec<_>>();

    json!({
        "topic_number": topic.topic_number,
        "topic_offset": topic.topic_offset,
        "browse_bck": topic.browse_bck,
        "browse_for": topic.browse_for,
        "next_topic": topic.next_topic,
        "plain_text": topic.get_plain_text(),
        "spans": spans,
        "hotspots": hotspots,
        "tables": tables,
    })
}

fn embedded_image_to_json(image: &EmbeddedImage) -> Value {
    match image {
        EmbeddedImage::Window { alignment, bitmap_ref } => json!({
            "kind": "window",
            "alignment": format!("{alignment:?}"),
            "bitmap_ref": bitmap_ref,
        }),
        EmbeddedImage::Bitmap { alignment, bitmap_ref } => json!({
            "kind": "bitmap",
            "alignment": format!("{alignment:?}"),
            "bitmap_ref": bitmap_ref,
        }),
    }
}

fn hotspot_target_to_json(target: &HotspotTarget) -> Value {
    match target {
        HotspotTarget::Topic { topic_offset, is_popup, suppress_font_change } => json!({
            "kind": "topic",
            "topic_offset": topic_offset,
            "is_popup": is_popup,
            "suppress_font_change": suppress_font_change,
        }),
        HotspotTarget::Macro { macro_text, suppress_font_change } => json!({
            "kind": "macro",
            "macro_text": macro_text,
            "suppress_font_change": suppress_font_change,
        }),
        HotspotTarget::External {
            type_field,
            topic_offset,
            window_number,
            external_file,
            window_name,
            is_popup,
            suppress_font_change,
        } => json!({
            "kind": "external",
            "type_field": type_field,
            "topic_offset": topic_offset,
            "window_number": window_number,
            "external_file": external_file,
            "window_name": window_name,
            "is_popup": is_popup,
            "suppress_font_change": suppress_font_change,
        }),
    }
}

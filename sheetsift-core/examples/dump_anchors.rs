use anyhow::{Context, Result};
use sheetsift_core::reader::read_worksheet;
use std::env;
use std::fs;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <file.xlsx>", args[0]);
        std::process::exit(1);
    }

    let file_path = &args[1];

    println!("Reading workbook: {}", file_path);
    let bytes = fs::read(file_path).with_context(|| format!("Failed to read {}", file_path))?;
    let sheet = read_worksheet(&bytes)?;

    println!(
        "\n=== Sheet: {} ({} rows x {} columns) ===",
        sheet.name, sheet.row_count, sheet.column_count
    );

    if sheet.image_anchors.is_empty() {
        println!("No anchored images found.");
        return Ok(());
    }

    for (idx, anchor) in sheet.image_anchors.iter().enumerate() {
        let first_cell = sheet.cell_text(anchor.source_row, 1);
        println!(
            "  #{:<3} row {:>5}, column {:>3}: {:>8} bytes  [{}]",
            idx + 1,
            anchor.source_row,
            anchor.source_column,
            anchor.bytes.len(),
            first_cell
        );
    }

    Ok(())
}

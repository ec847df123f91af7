use console::style;
use prettytable::{format, Cell, Row, Table};

use crate::cli::OutputFormat;
use crate::image_processing::encode::frame_duration_ms;
use crate::image_processing::grouping::GroupTable;
use crate::image_processing::ordering::OrderKey;
use crate::image_processing::ImageFile;
use crate::pipeline::ExportSummary;
use crate::session::{ExportPlan, SelectionMode};
use crate::utils::{format_duration, format_kb, truncate};

const NAME_WIDTH: usize = 30;

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(Row::new(headers.iter().map(|h| Cell::new(h)).collect()));
    table
}

/// Group listing. Row 0 is manual selection over every discovered file.
pub fn print_group_table(discovered: usize, groups: &GroupTable) {
    println!("\n{}", style("Discovered groups (by dimensions)").bold().cyan());

    let mut table = new_table(&["#", "Dimensions", "Count", "Sample file"]);
    table.add_row(Row::new(vec![
        Cell::new("0"),
        Cell::new("Manual selection"),
        Cell::new(&discovered.to_string()),
        Cell::new("Pick and order frames by hand"),
    ]));
    for (index, group) in groups.groups().iter().enumerate() {
        let sample = group.files.first().map(|f| f.file_name()).unwrap_or("");
        table.add_row(Row::new(vec![
            Cell::new(&(index + 1).to_string()),
            Cell::new(&group.dimensions.to_string()),
            Cell::new(&group.files.len().to_string()),
            Cell::new(&truncate(sample, NAME_WIDTH)),
        ]));
    }
    table.printstd();
}

pub fn print_available_images(files: &[ImageFile]) {
    let mut table = new_table(&["#", "Filename", "Dimensions", "Size"]);
    for (index, file) in files.iter().enumerate() {
        let dimensions = file
            .dimensions()
            .map(|d| d.to_string())
            .unwrap_or_else(|_| "Unknown".to_string());
        table.add_row(Row::new(vec![
            Cell::new(&(index + 1).to_string()),
            Cell::new(&truncate(file.file_name(), NAME_WIDTH)),
            Cell::new(&dimensions),
            Cell::new(&format_kb(file.size_bytes)),
        ]));
    }
    table.printstd();
}

pub fn print_manual_help() {
    println!("\n{}", style("Commands:").bold());
    println!("  {}  add image by number", style("N      ").green());
    println!("  {}  remove frame at position N", style("rN     ").yellow());
    println!("  {}  remove all selected frames", style("clear  ").cyan());
    println!("  {}  show frame count and timing", style("preview").cyan());
    println!("  {}  finish selection", style("done   ").green().bold());
    println!("  {}  cancel and exit", style("quit   ").red());
}

/// Current manual sequence, or a hint when it is empty
pub fn print_sequence<'a>(files: impl Iterator<Item = &'a ImageFile>) {
    let mut table = new_table(&["Frame #", "Filename", "Action"]);
    let mut count = 0;
    for (index, file) in files.enumerate() {
        count += 1;
        table.add_row(Row::new(vec![
            Cell::new(&(index + 1).to_string()),
            Cell::new(&truncate(file.file_name(), NAME_WIDTH)),
            Cell::new(&format!("Remove with 'r{}'", index + 1)),
        ]));
    }

    if count == 0 {
        println!("{}", style("No images selected yet.").dim());
    } else {
        table.printstd();
    }
}

/// Property/value rows of the export plan
pub fn plan_rows(plan: &ExportPlan) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();
    let frames = plan.frame_count();

    match &plan.mode {
        SelectionMode::Group { dimensions, order } => {
            rows.push(("Source Group", format!("{} ({} frames)", dimensions, frames)));
            let key = match order {
                OrderKey::CreationTime => "Creation time",
                OrderKey::FileName => "File name (creation time unavailable)",
            };
            let suffix = if plan.reverse { " (reversed)" } else { "" };
            rows.push(("Frame Order", format!("{}{}", key, suffix)));
        }
        SelectionMode::Manual => {
            rows.push(("Source Mode", format!("Manual selection ({} frames)", frames)));
            let mut sizes: Vec<String> = plan
                .files
                .iter()
                .filter_map(|f| f.dimensions().ok())
                .map(|d| d.to_string())
                .collect();
            sizes.sort();
            sizes.dedup();
            let dimensions = match sizes.as_slice() {
                [single] => single.clone(),
                [] => "Unknown".to_string(),
                _ => "Mixed dimensions (centered on the largest canvas)".to_string(),
            };
            rows.push(("Dimensions", dimensions));
            rows.push(("Frame Order", "Custom selection".to_string()));
        }
    }

    rows.push(("Output Format", plan.format.to_string()));
    rows.push((
        "Frame Rate",
        format!("{} FPS ({} ms per frame)", plan.fps, frame_duration_ms(plan.fps)),
    ));
    rows.push((
        "Resize Target",
        plan.resize
            .map(|d| d.to_string())
            .unwrap_or_else(|| "Original dimensions".to_string()),
    ));

    if plan.alpha_count > 0 {
        let effect = if plan.format.is_palette_based() {
            "will be flattened to white background"
        } else {
            "will be preserved"
        };
        rows.push((
            "Alpha Channels",
            format!("{}/{} images have transparency ({})", plan.alpha_count, frames, effect),
        ));
    }

    let file_name = plan
        .output_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    rows.push(("Output File", file_name));

    if plan.format == OutputFormat::Webp {
        rows.push(("WebP Quality", format!("{}%", plan.quality)));
    }

    rows
}

pub fn print_plan(plan: &ExportPlan) {
    println!("\n{}", style("Animation Export Plan").bold().cyan());
    let mut table = new_table(&["Property", "Value"]);
    for (property, value) in plan_rows(plan) {
        table.add_row(Row::new(vec![Cell::new(property), Cell::new(&value)]));
    }
    table.printstd();
}

/// Final report after the animation was written
pub fn print_summary(summary: &ExportSummary) {
    let file_name = summary
        .output_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    println!();
    println!("{}", style("Animation created successfully!").bold().green());
    println!("  File:   {}", style(file_name).bold());
    println!(
        "  Frames: {} at {} FPS",
        style(summary.frames).bold(),
        style(summary.fps).bold()
    );
    if summary.failed() > 0 {
        println!("  Skipped: {}", style(summary.failed()).bold().red());
        for failure in &summary.failures {
            let name = failure
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!(
                "    {} {}",
                style(truncate(&name, NAME_WIDTH)).yellow(),
                style(&failure.error).dim()
            );
        }
    }
    match summary.format {
        OutputFormat::Webp => println!(
            "  Format: {} (Quality: {}%)",
            style(summary.format).bold(),
            summary.quality
        ),
        OutputFormat::Gif => println!("  Format: {}", style(summary.format).bold()),
    }
    println!("  Size:   {}", style(format_kb(summary.size_bytes)).bold());
    println!(
        "  {}",
        style(format!("Completed in {}", format_duration(summary.elapsed))).dim()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_processing::Dimensions;
    use std::path::PathBuf;

    fn plan(mode: SelectionMode, format: OutputFormat, alpha_count: usize) -> ExportPlan {
        ExportPlan {
            mode,
            files: vec![
                ImageFile::new(PathBuf::from("a.png"), 0),
                ImageFile::new(PathBuf::from("b.png"), 0),
            ],
            format,
            fps: 8,
            resize: None,
            quality: 80,
            reverse: true,
            output_path: PathBuf::from("/tmp/holiday/holiday_1.gif"),
            alpha_count,
            dry_run: false,
        }
    }

    fn value<'a>(rows: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        rows.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_group_plan_rows() {
        let mode = SelectionMode::Group {
            dimensions: Dimensions::new(100, 100),
            order: OrderKey::CreationTime,
        };
        let rows = plan_rows(&plan(mode, OutputFormat::Gif, 1));
        assert_eq!(value(&rows, "Source Group"), Some("100x100 (2 frames)"));
        assert_eq!(value(&rows, "Frame Order"), Some("Creation time (reversed)"));
        assert_eq!(value(&rows, "Frame Rate"), Some("8 FPS (125 ms per frame)"));
        assert_eq!(value(&rows, "Output File"), Some("holiday_1.gif"));
        assert!(value(&rows, "Alpha Channels").unwrap().contains("flattened"));
        assert_eq!(value(&rows, "WebP Quality"), None);
    }

    #[test]
    fn test_webp_plan_rows() {
        let rows = plan_rows(&plan(SelectionMode::Manual, OutputFormat::Webp, 0));
        assert_eq!(value(&rows, "Source Mode"), Some("Manual selection (2 frames)"));
        assert_eq!(value(&rows, "Frame Order"), Some("Custom selection"));
        assert_eq!(value(&rows, "WebP Quality"), Some("80%"));
        assert_eq!(value(&rows, "Alpha Channels"), None);
        assert_eq!(value(&rows, "Output Format"), Some("WEBP"));
    }
}

use anyhow::Result;
use clap::Parser;
use console::style;
use std::time::Instant;

mod cli;
mod image_processing;
mod json_output;
mod selection;
mod utils;

use cli::Args;
use image_processing::{BatchReport, ConversionEngine, ConversionOptions, FileOutcome};
use json_output::JsonMessage;
use selection::Selection;
use utils::{create_progress_bar, error_println, format_duration, validate_inputs, warn_println};

fn main() -> Result<()> {
    let start_time = Instant::now();
    let args = Args::parse();

    if !args.json_progress {
        // Print banner
        println!(
            "{}",
            style("Image Compressor - Batch Conversion").bold().blue()
        );
        println!(
            "{}",
            style("JPEG / PNG / WebP re-encoding with EXIF orientation").dim()
        );
        println!();
    }

    validate_inputs(&args)?;

    // Create conversion options
    let options = ConversionOptions {
        format: args.format,
        quality: args.quality,
        compress: !args.no_compress,
        auto_orient: args.auto_orient,
        verbose: args.verbose && !args.json_progress,
    };

    if options.verbose {
        println!("{}", style("Configuration:").bold());
        println!("  Output format: {}", options.format);
        println!("  Quality: {}", options.quality);
        println!(
            "  Compression: {}",
            if options.compress {
                "enabled"
            } else {
                "disabled (maximum fidelity)"
            }
        );
        println!("  Auto-orientation: {}", options.auto_orient);
        println!("  Extensions: {:?}", args.parse_extensions());
        println!("  Output directory: {}", args.output_dir.display());
        println!();
    }

    // Build the selection: explicit files as-is, directories scanned
    let extensions = args.parse_extensions();
    let selection = Selection::from_inputs(&args.input_paths, &extensions)?;

    if selection.is_empty() {
        if args.json_progress {
            JsonMessage::progress(0, 0, "No images found");
        } else {
            warn_println("No images found with specified extensions");
        }
        return Ok(());
    }

    if !args.json_progress {
        println!(
            "{}",
            style(format!("✓ Found {} images", selection.len())).green()
        );
    }

    let engine = ConversionEngine::new(options);

    let report = if args.json_progress {
        run_with_json_progress(&engine, &selection, &args)?
    } else {
        run_with_progress_bar(&engine, &selection, &args)?
    };

    let total_time = start_time.elapsed();

    if args.json_progress {
        JsonMessage::summary(
            report.total(),
            report.converted(),
            report.skipped(),
            report.failed(),
            &report.run_dir,
            total_time.as_secs_f64(),
        );
        return Ok(());
    }

    // Print results summary
    println!();
    println!("{}", style("Results Summary:").bold().green());
    println!(
        "  Converted: {}",
        style(report.converted()).bold().green()
    );
    if report.skipped() > 0 {
        println!(
            "  Skipped (not decodable): {}",
            style(report.skipped()).bold().yellow()
        );
    }
    if report.failed() > 0 {
        println!("  Failed: {}", style(report.failed()).bold().red());
    }

    println!();
    println!("{}", style("Performance:").bold().blue());
    println!(
        "  Total processing time: {}",
        style(format_duration(total_time)).bold()
    );
    println!(
        "  Average time per image: {}",
        style(format_duration(total_time / report.total() as u32)).dim()
    );

    // Detailed listings for anything that did not convert
    let skips: Vec<_> = report
        .outcomes
        .iter()
        .filter_map(|o| match o {
            FileOutcome::Skipped { input, reason } => Some((input, reason)),
            _ => None,
        })
        .collect();
    if !skips.is_empty() {
        println!();
        println!("{}", style("Skipped files (not decodable):").bold().yellow());
        for (i, (input, reason)) in skips.iter().enumerate() {
            let filename = input
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("unknown");
            println!(
                "  {}: {} - {}",
                style(format!("#{}", i + 1)).dim(),
                style(filename).bold().yellow(),
                reason
            );
        }
    }

    let failures: Vec<_> = report
        .outcomes
        .iter()
        .filter_map(|o| match o {
            FileOutcome::Failed { input, error } => Some((input, error)),
            _ => None,
        })
        .collect();
    if !failures.is_empty() {
        println!();
        println!("{}", style("Errors encountered:").bold().red());
        for (i, (input, error)) in failures.iter().enumerate() {
            let filename = input
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("unknown");
            println!(
                "  {}: {} - {}",
                style(format!("#{}", i + 1)).dim(),
                style(filename).bold().red(),
                error
            );
        }
    }

    println!();
    println!(
        "{}",
        style(format!(
            "✓ {} images converted into {}",
            report.converted(),
            report.run_dir.display()
        ))
        .bold()
        .green()
    );

    Ok(())
}

/// Run the batch with a live progress bar, surfacing skips and failures
/// above the bar as they happen
fn run_with_progress_bar(
    engine: &ConversionEngine,
    selection: &Selection,
    args: &Args,
) -> Result<BatchReport> {
    let progress = create_progress_bar(selection.len() as u64);
    progress.set_message("Converting images");

    let report = engine.convert_batch(selection, &args.output_dir, |_, _, outcome| {
        match outcome {
            FileOutcome::Converted { .. } => {}
            FileOutcome::Skipped { input, reason } => {
                progress.suspend(|| {
                    warn_println(&format!("Skipped {}: {}", input.display(), reason))
                });
            }
            FileOutcome::Failed { input, error } => {
                progress.suspend(|| error_println(&format!("{}: {}", input.display(), error)));
            }
        }
        progress.inc(1);
    })?;

    progress.finish_with_message("✓ Conversion complete");
    Ok(report)
}

/// Run the batch emitting one JSON line per event on stdout
fn run_with_json_progress(
    engine: &ConversionEngine,
    selection: &Selection,
    args: &Args,
) -> Result<BatchReport> {
    engine.convert_batch(selection, &args.output_dir, |current, total, outcome| {
        match outcome {
            FileOutcome::Converted { input, output } => {
                JsonMessage::file_converted(input, output)
            }
            FileOutcome::Skipped { input, reason } => {
                JsonMessage::file_skipped(input, reason.clone())
            }
            FileOutcome::Failed { input, error } => JsonMessage::file_failed(input, error.clone()),
        }
        JsonMessage::progress(
            current,
            total,
            format!("Processed {}", outcome.input().display()),
        );
    })
}

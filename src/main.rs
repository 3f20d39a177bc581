//! # qqmerge CLI
//!
//! Command-line interface for the qqmerge library.

use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use qqmerge::cli::Args;
use qqmerge::core::merge;
use qqmerge::format::{OutputFormat, write_to_format};
use qqmerge::reader::{ParsedSource, read_sources};
use qqmerge::QqMergeError;

fn main() {
    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run() -> Result<(), QqMergeError> {
    let total_start = Instant::now();
    let args = <Args as ClapParser>::parse();
    init_tracing(&args);

    let lib_format: OutputFormat = args.format.into();

    // Print header
    println!("📦 qqmerge v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Inputs:  {}", args.inputs.len());
    println!("💾 Output:  {}", args.output.display());
    println!("📄 Format:  {}", lib_format);
    if args.parallel {
        println!("🧵 Mode:    Parallel");
    }
    println!();

    // Step 1: Parse every input
    println!("⏳ Parsing {} archives...", args.inputs.len());
    let parse_start = Instant::now();
    let sources = collect_sources(&args)?;
    let parse_time = parse_start.elapsed();
    println!(
        "   Parsed {} sources ({:.2}s)",
        sources.len(),
        parse_time.as_secs_f64()
    );

    // Step 2: Merge
    println!("🔀 Merging timelines...");
    let merge_start = Instant::now();
    let transcript = merge(&sources)?;
    let stats = transcript.stats;
    println!(
        "   {} messages, {} duplicates removed ({:.1}%, {:.2}s)",
        stats.merged_messages,
        stats.duplicates_removed,
        stats.duplicate_ratio(),
        merge_start.elapsed().as_secs_f64()
    );

    // Step 3: Write output
    println!("💾 Writing {}...", lib_format);
    let write_start = Instant::now();
    let written = write_to_format(&transcript, &args.output, lib_format, &args.output_config())?;
    println!("   Written in {:.2}s", write_start.elapsed().as_secs_f64());

    // Images are copied by now; release the scratch directories
    drop(transcript);
    for source in sources {
        source.cleanup()?;
    }

    let total_time = total_start.elapsed();

    println!();
    println!("✅ Done! Output saved to {}", written.display());

    // Summary
    println!();
    println!("📊 Summary:");
    println!("   Sources:    {}", stats.sources);
    println!("   Input:      {} messages", stats.input_messages);
    println!("   Merged:     {} messages", stats.merged_messages);
    println!("   Duplicates: {} removed", stats.duplicates_removed);
    println!("   Images:     {}", stats.images);

    // Performance stats
    println!();
    println!("⚡ Performance:");
    println!("   Total time:  {:.2}s", total_time.as_secs_f64());
    let msgs_per_sec = stats.input_messages as f64 / total_time.as_secs_f64();
    println!("   Throughput:  {:.0} messages/sec", msgs_per_sec);

    Ok(())
}

/// Parses all inputs, printing one line per source.
///
/// A failed source aborts the run unless `--skip-invalid` is set.
fn collect_sources(args: &Args) -> Result<Vec<ParsedSource>, QqMergeError> {
    let mut sources = Vec::with_capacity(args.inputs.len());

    let results = read_sources(&args.inputs, &args.reader_config());

    for (path, result) in args.inputs.iter().zip(results) {
        match result {
            Ok(source) => {
                println!(
                    "   📖 {}: {} messages, {} images",
                    path.display(),
                    source.messages().len(),
                    source.images().len()
                );
                sources.push(source);
            }
            Err(e) if args.skip_invalid => {
                println!("   ⚠️  Skipping {}: {}", path.display(), e);
            }
            Err(e) => return Err(e),
        }
    }

    if sources.is_empty() {
        return Err(QqMergeError::EmptySourceList);
    }
    Ok(sources)
}

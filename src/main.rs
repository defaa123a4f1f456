//! bindery - HTML to print-ready DOCX converter

use std::process::ExitCode;

use clap::Parser;

use bindery::{ConvertOptions, Report, convert};

#[derive(Parser)]
#[command(name = "bindery")]
#[command(version, about = "HTML to print-ready DOCX converter", long_about = None)]
#[command(after_help = "EXAMPLES:
    bindery book.html book.docx             Convert a book
    bindery --odd-page-chapters in.html out.docx
                                            Start chapters on recto pages
    bindery --json in.html out.docx         Print the run report as JSON")]
struct Cli {
    /// Input HTML file
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output DOCX file
    #[arg(value_name = "OUTPUT")]
    output: String,

    /// Start each chapter on an odd (recto) page
    #[arg(long)]
    odd_page_chapters: bool,

    /// Force a blank verso page before each chapter (implies --odd-page-chapters)
    #[arg(long)]
    blank_verso: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut options = ConvertOptions::new();
    if cli.odd_page_chapters {
        options = options.with_odd_page_chapters();
    }
    if cli.blank_verso {
        options = options.with_forced_blank_verso();
    }

    match convert(&cli.input, &cli.output, &options) {
        Ok(report) => {
            if cli.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("error: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            } else if !cli.quiet {
                print_summary(&cli.output, &report);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_summary(output: &str, report: &Report) {
    println!("Document saved as {output}");
    println!("Paragraphs: {}", report.paragraphs);
    println!("Section breaks: {}", report.section_breaks);
    println!("Bookmarks: {}", report.bookmarks);
    println!("TOC references: {}", report.toc_references);
    if report.toc_seen {
        println!("Table of contents was processed");
    }
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
}

//! Additional tests for CLI and format parsing

use std::path::PathBuf;
use std::str::FromStr;

use clap::{CommandFactory, Parser};

use qqmerge::cli::{Args, OutputFormat};
use qqmerge::config::{DEFAULT_DATE_LABEL, DEFAULT_END_MARKER};
use qqmerge::format::OutputFormat as LibFormat;

#[test]
fn test_command_definition_is_valid() {
    Args::command().debug_assert();
}

#[test]
fn test_output_format_from_str_all_variants() {
    assert_eq!(LibFormat::from_str("html").unwrap(), LibFormat::Html);
    assert_eq!(LibFormat::from_str("pages").unwrap(), LibFormat::Pages);
    assert_eq!(LibFormat::from_str("mht").unwrap(), LibFormat::Mht);
    assert_eq!(LibFormat::from_str("json").unwrap(), LibFormat::Json);
    assert_eq!(LibFormat::from_str("csv").unwrap(), LibFormat::Csv);

    // Aliases and case variations
    assert_eq!(LibFormat::from_str("MHTML").unwrap(), LibFormat::Mht);
    assert_eq!(LibFormat::from_str("Html").unwrap(), LibFormat::Html);
    assert_eq!(LibFormat::from_str("CSV").unwrap(), LibFormat::Csv);
}

#[test]
fn test_output_format_from_str_errors() {
    assert!(LibFormat::from_str("").is_err());
    assert!(LibFormat::from_str("jsonl").is_err());
    assert!(LibFormat::from_str("pdf").is_err());

    let err = LibFormat::from_str("pdf").unwrap_err();
    assert!(err.to_string().contains("html, pages, mht, json, csv"));
}

#[test]
fn test_every_cli_format_converts() {
    let pairs = [
        (OutputFormat::Html, LibFormat::Html),
        (OutputFormat::Pages, LibFormat::Pages),
        (OutputFormat::Mht, LibFormat::Mht),
        (OutputFormat::Json, LibFormat::Json),
        (OutputFormat::Csv, LibFormat::Csv),
    ];
    for (cli, lib) in pairs {
        assert_eq!(LibFormat::from(cli), lib);
        assert_eq!(cli.to_string(), lib.to_string());
    }
}

#[test]
fn test_format_flag_values() {
    for (flag, expected) in [
        ("html", OutputFormat::Html),
        ("pages", OutputFormat::Pages),
        ("mht", OutputFormat::Mht),
        ("mhtml", OutputFormat::Mht),
        ("json", OutputFormat::Json),
        ("csv", OutputFormat::Csv),
    ] {
        let args = Args::parse_from(["qqmerge", "a.mht", "--format", flag]);
        assert_eq!(args.format, expected);
    }
    assert!(Args::try_parse_from(["qqmerge", "a.mht", "-f", "jsonl"]).is_err());
}

#[test]
fn test_inputs_keep_order() {
    let args = Args::parse_from(["qqmerge", "c.mht", "a.mht", "b.mht"]);
    assert_eq!(
        args.inputs,
        vec![
            PathBuf::from("c.mht"),
            PathBuf::from("a.mht"),
            PathBuf::from("b.mht")
        ]
    );
}

#[test]
fn test_reader_config_defaults() {
    let args = Args::parse_from(["qqmerge", "a.mht"]);
    let config = args.reader_config();
    assert_eq!(config.scratch_root, None);
    assert_eq!(config.date_label, DEFAULT_DATE_LABEL);
    assert_eq!(config.end_marker, DEFAULT_END_MARKER);
    assert!(!config.parallel);
    assert!(args.output_config().copy_images);
}

#[test]
fn test_verbosity_levels() {
    assert_eq!(Args::parse_from(["qqmerge", "a.mht"]).log_filter(), "qqmerge=warn");
    assert_eq!(Args::parse_from(["qqmerge", "a.mht", "-v"]).log_filter(), "qqmerge=info");
    assert_eq!(Args::parse_from(["qqmerge", "a.mht", "-vvv"]).log_filter(), "qqmerge=debug");
}

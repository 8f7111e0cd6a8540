//! Command-line interface for markconv
//!
//! Usage:
//!   markconv convert `<path>` --to `<format>` [--from `<format>`] [-o `<out>`] [--config `<file>`]
//!   markconv inspect `<path>` [--from `<format>`]    - Print the parsed tree as tags
//!   markconv list-formats [--json]                 - List registered parsers and converters
//!
//! `<path>` may be `-` to read standard input. Without `--from`, the source format is taken
//! from the file extension, falling back to markdown.

use clap::{Arg, ArgAction, ArgMatches, Command};
use markconv::ast::to_tag_string;
use markconv::config::Loader;
use markconv::{FormatKind, FormatRegistry};
use std::io::Read;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_SOURCE_FORMAT: &str = "markdown";

fn main() {
    let matches = Command::new("markconv")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert markdown into LaTeX or Typst")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .help("Log pipeline steps to stderr")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a file and write the result to stdout or --output")
                .arg(
                    Arg::new("path")
                        .help("Source file, or - for standard input")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .short('t')
                        .help("Target format (latex, tex, typst, typ)")
                        .required(true),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .short('f')
                        .help("Source format (default: from the file extension)"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Write to this file instead of stdout"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("TOML file layered over the built-in converter options"),
                )
                .arg(
                    Arg::new("fragment")
                        .long("fragment")
                        .help("Emit a LaTeX body without preamble")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the parsed document tree")
                .arg(
                    Arg::new("path")
                        .help("Source file, or - for standard input")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .short('f')
                        .help("Source format (default: from the file extension)"),
                ),
        )
        .subcommand(
            Command::new("list-formats")
                .about("List registered parsers and converters")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .get_matches();

    init_logging(matches.get_flag("verbose"));

    match matches.subcommand() {
        Some(("convert", convert_matches)) => handle_convert_command(convert_matches),
        Some(("inspect", inspect_matches)) => handle_inspect_command(inspect_matches),
        Some(("list-formats", list_matches)) => {
            handle_list_formats_command(list_matches.get_flag("json"))
        }
        _ => unreachable!("clap requires a subcommand"),
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with --verbose.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "markconv=debug" } else { "markconv=warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Handle the convert command
fn handle_convert_command(matches: &ArgMatches) {
    let path = matches
        .get_one::<String>("path")
        .expect("path is required");
    let target = matches.get_one::<String>("to").expect("--to is required");

    let mut loader = Loader::new();
    if let Some(config_path) = matches.get_one::<String>("config") {
        loader = loader.with_file(config_path);
    }
    if matches.get_flag("fragment") {
        loader = loader
            .set_override("latex.standalone", false)
            .unwrap_or_else(|e| fail(&format!("Invalid override: {e}")));
    }
    let config = loader
        .build()
        .unwrap_or_else(|e| fail(&format!("Configuration error: {e}")));
    let registry = FormatRegistry::with_config(&config);

    let source = read_source(path);
    let from = source_format(&registry, path, matches.get_one::<String>("from"));

    let output = markconv::convert_with(&registry, &source, &from, target).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        if e.is_unknown_format() {
            print_available(&registry);
        }
        std::process::exit(1);
    });

    match matches.get_one::<String>("output") {
        Some(out_path) => std::fs::write(out_path, output)
            .unwrap_or_else(|e| fail(&format!("Cannot write {out_path}: {e}"))),
        None => print!("{output}"),
    }
}

/// Handle the inspect command
fn handle_inspect_command(matches: &ArgMatches) {
    let path = matches
        .get_one::<String>("path")
        .expect("path is required");
    let registry = &*markconv::REGISTRY;
    let source = read_source(path);
    let from = source_format(registry, path, matches.get_one::<String>("from"));

    let doc = markconv::parse(&source, &from).unwrap_or_else(|e| fail(&format!("Error: {e}")));
    print!("{}", to_tag_string(&doc));
}

/// Handle the list-formats command
fn handle_list_formats_command(json: bool) {
    let formats = markconv::list_formats();
    if json {
        let text = serde_json::to_string_pretty(&formats)
            .unwrap_or_else(|e| fail(&format!("Error formatting formats: {e}")));
        println!("{text}");
        return;
    }

    for (kind, infos) in &formats {
        println!("{}s:", kind_label(*kind));
        for info in infos {
            if info.aliases.is_empty() {
                println!("  {}", info.name);
            } else {
                println!("  {} ({})", info.name, info.aliases.join(", "));
            }
            if !info.description.is_empty() {
                println!("    {}", info.description);
            }
        }
    }
}

fn kind_label(kind: FormatKind) -> &'static str {
    match kind {
        FormatKind::Parser => "Parser",
        FormatKind::Converter => "Converter",
    }
}

fn print_available(registry: &FormatRegistry) {
    eprintln!("\nAvailable formats:");
    for (kind, infos) in registry.list_formats() {
        let names: Vec<_> = infos.iter().map(|info| info.name.as_str()).collect();
        eprintln!("  {}: {}", kind, names.join(", "));
    }
}

fn read_source(path: &str) -> String {
    if path == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .unwrap_or_else(|e| fail(&format!("Cannot read standard input: {e}")));
        return source;
    }
    std::fs::read_to_string(path).unwrap_or_else(|e| fail(&format!("Cannot read {path}: {e}")))
}

fn source_format(registry: &FormatRegistry, path: &str, explicit: Option<&String>) -> String {
    if let Some(format) = explicit {
        return format.clone();
    }
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| registry.parser_for_extension(ext))
        .unwrap_or_else(|| DEFAULT_SOURCE_FORMAT.to_string())
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

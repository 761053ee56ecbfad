// Command-line interface for richtext
//
// A thin shell host around richtext-babel. Every subcommand reads one input (a path, or `-` for
// stdin) and writes the result to stdout or to the file given with -o.
//
// Usage:
//  richtext preprocess <input>            - Raw HTML <details> → <Details summary="..."> components
//  richtext postprocess <input>           - <Details> components → literal <details> HTML
//  richtext import <input>                - Raw text → document tree JSON
//  richtext export <input.json> [--html]  - Document tree JSON → Markdown
//
// Configuration:
//
// Built-in defaults are layered with ./richtext.toml (if present) and then with the file given
// by --config. Logging goes to stderr and is controlled with RUST_LOG (e.g. RUST_LOG=debug).

mod commands;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use commands::Toolchain;
use richtext_config::{Loader, RichTextConfig};
use std::fs;
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

fn input_arg(help: &'static str) -> Arg {
    Arg::new("input")
        .help(help)
        .long_help(format!("{help}\n\nUse - to read from stdin."))
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn build_cli() -> Command {
    Command::new("richtext")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert between rich-text documents and Markdown")
        .long_about(
            "richtext converts the review editor's rich-text documents to and from Markdown.\n\n\
            Collapsible blocks travel through Markdown as embedded components:\n\n  \
            <Details summary=\"Title\">\n\n  \
            Content\n\n  \
            </Details>\n\n\
            Examples:\n  \
            richtext preprocess comment.md          # Rewrite HTML <details> blocks\n  \
            richtext import comment.md > doc.json   # Build the document tree\n  \
            richtext export doc.json --html         # Markdown with literal <details>\n  \
            cat comment.md | richtext import -      # Read from stdin"
        )
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a richtext.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("PATH")
                .help("Output file path (defaults to stdout)")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("preprocess")
                .about("Rewrite HTML <details> blocks as <Details> components")
                .arg(input_arg("Raw text file")),
        )
        .subcommand(
            Command::new("postprocess")
                .about("Rewrite <Details> components as HTML <details> blocks")
                .arg(input_arg("Markdown file")),
        )
        .subcommand(
            Command::new("import")
                .about("Convert Markdown to a document tree (JSON)")
                .arg(input_arg("Markdown file")),
        )
        .subcommand(
            Command::new("export")
                .about("Convert a document tree (JSON) to Markdown")
                .arg(input_arg("Document tree JSON file"))
                .arg(
                    Arg::new("html")
                        .long("html")
                        .help("Write literal <details> HTML instead of components")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let matches = build_cli().get_matches();
    let (name, sub_matches) = match matches.subcommand() {
        Some(pair) => pair,
        None => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    };

    // Global args are visible on the subcommand's matches
    let config = load_cli_config(sub_matches.get_one::<String>("config").map(|s| s.as_str()));
    let tools = Toolchain::from_config(&config);
    let source = read_input(sub_matches);

    let output = match name {
        "preprocess" => tools.preprocess(&source),
        "postprocess" => tools.postprocess(&source),
        "import" => tools.import(&source).unwrap_or_else(|e| {
            eprintln!("Import error: {e}");
            std::process::exit(1);
        }),
        "export" => tools
            .export(&source, sub_matches.get_flag("html"))
            .unwrap_or_else(|e| {
                eprintln!("Export error: {e}");
                std::process::exit(1);
            }),
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    };

    write_output(sub_matches.get_one::<String>("output").map(|s| s.as_str()), &output);
}

fn read_input(matches: &ArgMatches) -> String {
    let Some(input) = matches.get_one::<String>("input") else {
        eprintln!("Error: missing input path");
        std::process::exit(1);
    };

    if input == "-" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source).unwrap_or_else(|e| {
            eprintln!("Error reading stdin: {e}");
            std::process::exit(1);
        });
        return source;
    }

    fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Error reading file '{input}': {e}");
        std::process::exit(1);
    })
}

fn write_output(path: Option<&str>, text: &str) {
    match path {
        Some(path) => fs::write(path, text).unwrap_or_else(|e| {
            eprintln!("Error writing file '{path}': {e}");
            std::process::exit(1);
        }),
        None => println!("{text}"),
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> RichTextConfig {
    let loader = Loader::new().with_optional_file("richtext.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of build_cli() in src/main.rs
// Build scripts can't reach src/ modules
fn input_arg(help: &'static str) -> Arg {
    Arg::new("input")
        .help(help)
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("richtext")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert between rich-text documents and Markdown")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(Command::new("preprocess").arg(input_arg("Raw text file")))
        .subcommand(Command::new("postprocess").arg(input_arg("Markdown file")))
        .subcommand(Command::new("import").arg(input_arg("Markdown file")))
        .subcommand(
            Command::new("export")
                .arg(input_arg("Document tree JSON file"))
                .arg(Arg::new("html").long("html").action(ArgAction::SetTrue)),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "richtext", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "richtext", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "richtext", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}

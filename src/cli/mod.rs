use std::path::PathBuf;

use crate::frontend::suggest::did_you_mean;
use crate::scan::{
    implied_boundary_indices, json_dump, render_diagnostics, scan_file, write_json_dump, Analysis,
};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Tokens,
    Boundaries,
    Split,
}

const MODES: [&str; 3] = ["tokens", "boundaries", "split"];

pub fn run_cli<I>(args: I) -> i32
where
    I: IntoIterator<Item = String>,
{
    crate::debug::init();
    let mut args = args.into_iter();
    let first = match args.next() {
        Some(arg) => arg,
        None => {
            print_usage();
            return 1;
        }
    };
    let mode = match first.as_str() {
        "tokens" => CliMode::Tokens,
        "boundaries" => CliMode::Boundaries,
        "split" => CliMode::Split,
        other => {
            eprintln!("unknown mode: {}", other);
            if let Some(suggestion) = did_you_mean(other, MODES.iter().copied()) {
                eprintln!("{}", suggestion);
            }
            print_usage();
            return 1;
        }
    };
    let input = match args.next() {
        Some(arg) => arg,
        None => {
            print_usage();
            return 1;
        }
    };
    let mut json = false;
    let mut output = None;
    while let Some(arg) = args.next() {
        if arg == "--json" {
            json = true;
        } else if arg == "-o" {
            match args.next() {
                Some(path) => output = Some(PathBuf::from(path)),
                None => {
                    eprintln!("expected output after -o");
                    return 1;
                }
            }
        } else {
            eprintln!("unknown argument: {}", arg);
            return 1;
        }
    }
    let input_path = PathBuf::from(&input);
    if input_path.extension().and_then(|s| s.to_str()) != Some("ql") {
        eprintln!("expected .ql source file");
        return 1;
    }
    let (source, analysis) = match scan_file(&input_path) {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("{}", err);
            return 1;
        }
    };
    if let Some(path) = &output {
        if let Err(err) = write_json_dump(path, &analysis) {
            eprintln!("{:#}", err);
            return 1;
        }
    }
    if json {
        match json_dump(&analysis) {
            Ok(dump) => println!("{}", dump),
            Err(err) => {
                eprintln!("{:#}", err);
                return 1;
            }
        }
    } else {
        match mode {
            CliMode::Tokens => print_tokens(&analysis),
            CliMode::Boundaries => print_boundaries(&analysis),
            CliMode::Split => print_statements(&analysis),
        }
    }
    if !analysis.diagnostics.is_empty() {
        eprint!("{}", render_diagnostics(&analysis, &source));
        return 1;
    }
    0
}

fn print_tokens(analysis: &Analysis) {
    for tok in &analysis.tokens {
        println!(
            "{:>4} {:>4}:{:<3} {:?} {:?}",
            tok.index, tok.span.line, tok.span.column, tok.channel, tok.kind
        );
    }
}

fn print_boundaries(analysis: &Analysis) {
    let indices = implied_boundary_indices(&analysis.tokens);
    for &index in &indices {
        let tok = &analysis.tokens[index];
        println!(
            "boundary implied before token {} at line {} ({:?})",
            index, tok.span.line, tok.kind
        );
    }
    println!("{} implied boundaries", indices.len());
}

fn print_statements(analysis: &Analysis) {
    for (n, stmt) in analysis.statements.iter().enumerate() {
        println!(
            "stmt {:>3} line {:>4} tokens {}..={}",
            n + 1,
            stmt.line,
            stmt.first,
            stmt.last
        );
    }
    println!("{} statements", analysis.statements.len());
}

fn print_usage() {
    eprintln!("usage: quill tokens <input.ql> [--json] [-o dump.json]");
    eprintln!("   or: quill boundaries <input.ql> [--json] [-o dump.json]");
    eprintln!("   or: quill split <input.ql> [--json] [-o dump.json]");
}

// Purpose: Provide default binary entry for scanner-oriented CLI execution.
// Inputs/Outputs: Reads process args and returns process exit code from CLI dispatcher.
// Invariants: Main must not bypass centralized CLI argument/diagnostic handling.
// Gotchas: Keep diagnostics on stderr so token dumps stay machine-readable on stdout.

fn main() {
    let code = quill::cli::run_cli(std::env::args().skip(1));
    std::process::exit(code);
}

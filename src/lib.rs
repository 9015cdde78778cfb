// Purpose: Define crate-level module surface for the Quill lexical frontend and tooling.
// Inputs/Outputs: Re-exports scanner, stream, boundary, and CLI entry points for the binary and tests.
// Invariants: Public module boundaries should remain stable for internal callers.
// Gotchas: Keep module wiring consistent with the src/main.rs entry path.

pub mod cli;
pub mod debug;
pub mod frontend;
pub mod scan;

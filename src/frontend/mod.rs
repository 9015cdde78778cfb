// Purpose: Frontend module hub that wires lexer/stream/boundary components together.
// Inputs/Outputs: Exposes frontend components used by the scan pipeline and tests.
// Invariants: Public frontend API should remain a thin composition over specialized modules.
// Gotchas: Keep exports minimal to avoid leaking unstable scanner-internal contracts.

pub mod boundary;
pub mod diagnostic;
pub mod lexer;
pub mod splitter;
pub mod stream;
pub mod suggest;

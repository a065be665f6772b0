//! Query compilation and execution.

mod compiler;
mod queryset;

pub use compiler::SqlCompiler;
pub use queryset::QuerySet;

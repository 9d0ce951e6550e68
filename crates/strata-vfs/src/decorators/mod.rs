//! Providers that wrap another provider.
//!
//! Decorators never modify the wrapped store's addressing; they rewrite or
//! refuse calls and delegate the rest.

mod read_only;
mod sub;

pub use read_only::ReadOnlyProvider;
pub use sub::SubProvider;

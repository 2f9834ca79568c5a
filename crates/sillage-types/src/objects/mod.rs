mod context;
mod measurements;
mod span;
mod transaction;

pub use context::*;
pub use measurements::*;
pub use span::*;
pub use transaction::*;

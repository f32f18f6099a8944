pub mod public;
mod router;
pub mod signature;

pub use router::router;

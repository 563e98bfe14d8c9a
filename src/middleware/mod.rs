pub mod cors;

pub use cors::{cors_gate, resolve_origin};

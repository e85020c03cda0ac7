//! Top-level facade crate for pollpulse.
//!
//! Re-exports the engine core and the server library so users can depend on
//! a single crate.

pub mod core {
    pub use pollpulse_core::*;
}

pub mod server {
    pub use pollpulse_server::*;
}

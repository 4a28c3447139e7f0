//! Route tables owned by the kernel itself.

pub mod system;

pub use system::system_routes;

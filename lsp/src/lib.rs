pub mod analyzer;
pub(crate) mod server;

pub use server::run;

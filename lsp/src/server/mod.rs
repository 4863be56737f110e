mod analysis;
mod cli;
mod config;
mod entry;
mod handlers;
mod library;
mod state;
mod text;

#[cfg(test)]
mod library_test;

pub use entry::run;

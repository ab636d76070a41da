//! Subcommand implementations.

pub mod api;
pub mod auth;

/// Wrap a client error so its normalized message leads the error chain.
pub fn reported(err: supplink_core::Error) -> anyhow::Error {
    let report = err.report();
    anyhow::Error::new(err).context(report.message)
}

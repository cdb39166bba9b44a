//! Lightweight stage timing.
//!
//! A [`Scope`] logs its elapsed time through `tracing` when dropped. Events
//! use the `mdv2ex::perf` target, so `RUST_LOG=mdv2ex::perf=debug` (or the
//! `--perf` flag) shows them without enabling the rest of the crate's logs.

use std::time::Instant;

#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Scope {
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        tracing::debug!(
            target: "mdv2ex::perf",
            stage = self.name,
            elapsed_ms = self.elapsed_ms(),
            "stage finished"
        );
    }
}

pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

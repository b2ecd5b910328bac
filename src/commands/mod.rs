//! UI-facing commands.
//!
//! Each command takes the shared `CoreState` and returns `Result<T, String>`
//! so any shell (IPC bridge, FFI, test harness) can forward the message
//! to the screen unchanged.

pub mod journal;

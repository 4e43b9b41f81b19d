//! Application layer use cases for the daemon.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure business rules) and the infrastructure (OS/network/storage).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a user goal (e.g., "run one
//!   client connection through authorization, handshake, and capture").
//! - **Depend on abstractions** (traits) rather than concrete implementations,
//!   so the infrastructure can be swapped without changing this code.
//! - **Contain no OS calls, no network I/O, no file system access**.
//!
//! # Sub-modules
//!
//! - **`session`** – Drives one client connection through the daemon's
//!   state machine (authorize, handshake, serve capture/simulation
//!   requests, close). This is the daemon's only use case.

pub mod session;

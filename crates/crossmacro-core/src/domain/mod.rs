//! Domain entities for CrossMacro.
//!
//! This module contains pure business logic with no infrastructure
//! dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers. The innermost
//! layer is called the **domain** (or "entities" layer). Domain code:
//!
//! - Contains the core business rules of the application.
//! - Has **no** imports from OS APIs, network libraries, device drivers, or
//!   UI frameworks.
//! - Can be compiled and tested on any platform without any external setup.
//! - Defines the data types and operations that make the system uniquely
//!   what it is: here, the shape of a recorded input event, a macro
//!   sequence, and a text-expansion dictionary entry.
//!
//! Code in outer layers (infrastructure, application) depends on the
//! domain, but the domain never depends on them.

pub mod macro_event;
pub mod raw_event;
pub mod schedule;
pub mod text_expansion;

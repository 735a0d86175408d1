//! flowrelay CLI library: command implementations shared by the
//! `flowrelay` binary and its integration tests.

pub mod commands;

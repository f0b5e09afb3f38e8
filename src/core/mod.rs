//! Core plotting components.
//!
//! This module contains everything needed to talk to gnuplot:
//!
//! - **pipe**: one-way command channel to the spawned plotting program
//! - **style**: plot styles accepted by `with <style>`
//! - **command**: pure formatting of command lines and data values
//! - **session**: high-level session combining the pipe and display state
//!
//! # Architecture
//!
//! ```text
//! Session
//! ├── CommandSink (GnuplotPipe: child stdin + private write buffer)
//! ├── PlotStyle
//! └── frame state (active plots, multiplot)
//! ```

pub mod pipe;
pub mod style;
pub mod command;
pub mod session;

//! gnupipe - drive gnuplot from Rust over a one-way pipe
//!
//! gnupipe launches gnuplot as a child process and streams commands and
//! inline data into its standard input. Nothing is read back: gnuplot's own
//! error messages go to its stderr, and the library cannot see them.
//!
//! # Quick Start
//!
//! ```no_run
//! use gnupipe::Session;
//!
//! # fn main() -> gnupipe::Result<()> {
//! let mut g = Session::start()?;
//! g.set_style("lines");
//! g.set_xlabel("x")?;
//! g.plot_xy(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0], Some("sq"))?;
//! g.plot_equation("x**2", Some("exact"))?;
//! g.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! The first draw of a frame is sent as `plot`, later ones as `replot`, until
//! [`Session::reset_plot`] starts a new frame.

pub mod config;
pub mod core;

pub use crate::config::{Config, ConfigError};
pub use crate::core::pipe::{CommandSink, GnuplotPipe, PipeError, Result};
pub use crate::core::session::Session;
pub use crate::core::style::{PlotStyle, UnknownStyle};

//! Session management
//!
//! A session owns the pipe to one plotting process together with the display
//! state (plot style, series in the current frame, multiplot mode) and turns
//! draw requests into gnuplot command lines.
//!
//! Validation failures never surface as errors: an empty series or an
//! oversized header is a logged no-op reported as `Ok(0)`. Only a failing
//! local write is an error, and it leaves the session unusable.

use std::fmt;

use tracing::{debug, error, warn};

use super::command::{
    equation_command, inline_header, multi_inline_header, resolve_title, resolve_titles,
    slope_command, PlotVerb, Scientific, END_OF_DATA, MAX_COMMAND_LEN,
};
use super::pipe::{CommandSink, GnuplotPipe, PipeError, Result};
use super::style::PlotStyle;
use crate::config::Config;

/// Send a `format!`-style command line to a session, flushed.
///
/// ```no_run
/// # fn demo(session: &mut gnupipe::Session) -> gnupipe::Result<()> {
/// gnupipe::gnuplot!(session, "set xrange [{}:{}]", -1.0, 1.0)?;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! gnuplot {
    ($session:expr, $($arg:tt)*) => {
        $session.send(format_args!($($arg)*))
    };
}

/// A gnuplot session
pub struct Session<S: CommandSink = GnuplotPipe> {
    /// Command channel
    sink: S,
    /// Style for subsequent draws
    style: PlotStyle,
    /// Series drawn since the last reset
    active_plots: usize,
    /// In multiplot mode every draw is a fresh `plot`
    multiplot: bool,
    /// Ceiling for combined multi-series headers
    max_command_len: usize,
    /// Set after a failed write
    broken: bool,
    /// Set once the sink has been closed
    closed: bool,
}

impl Session<GnuplotPipe> {
    /// Start a session with the default configuration
    pub fn start() -> Result<Self> {
        Self::start_with(&Config::default())
    }

    /// Start a session running `config.program`.
    ///
    /// A launch failure is logged and returned; no process or buffer is left
    /// behind in that case.
    pub fn start_with(config: &Config) -> Result<Self> {
        #[cfg(not(windows))]
        if config.check_display && std::env::var_os("DISPLAY").is_none() {
            warn!("cannot find DISPLAY variable: is it set?");
        }

        let pipe = GnuplotPipe::spawn(&config.program, &config.args, config.buffer_size)
            .map_err(|e| {
                warn!("error starting {}, is it in your PATH? ({})", config.program, e);
                e
            })?;
        debug!(program = %config.program, pid = pipe.id(), "plotting session started");

        let mut session = Session::with_sink(pipe)
            .with_style(config.style)
            .with_max_command_len(config.max_command_len);

        if let Some(terminal) = &config.terminal {
            session.send(format_args!("set terminal {}", terminal))?;
        }
        if let Some(output) = &config.output {
            session.send(format_args!("set output \"{}\"", output))?;
        }

        Ok(session)
    }
}

impl<S: CommandSink> Session<S> {
    /// Create a session over an already open sink
    pub fn with_sink(sink: S) -> Self {
        Self {
            sink,
            style: PlotStyle::default(),
            active_plots: 0,
            multiplot: false,
            max_command_len: MAX_COMMAND_LEN,
            broken: false,
            closed: false,
        }
    }

    /// Set the initial plot style
    pub fn with_style(mut self, style: PlotStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the ceiling for combined multi-series headers
    pub fn with_max_command_len(mut self, max_command_len: usize) -> Self {
        self.max_command_len = max_command_len;
        self
    }

    /// Underlying sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Current plot style
    pub fn style(&self) -> PlotStyle {
        self.style
    }

    /// Series drawn into the current frame
    pub fn active_plots(&self) -> usize {
        self.active_plots
    }

    pub fn is_multiplot(&self) -> bool {
        self.multiplot
    }

    /// True once a write has failed
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    fn write(&mut self, line: fmt::Arguments<'_>, flush: bool) -> Result<()> {
        if self.broken || self.closed {
            return Err(PipeError::Closed);
        }
        match self.sink.write_line(line, flush) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.broken = true;
                error!("write to plotting program failed: {}", e);
                Err(PipeError::Write(e))
            }
        }
    }

    /// Send one command line and flush.
    ///
    /// There is no way to know whether the command was accepted: the channel
    /// is one-way. An error here means the local write itself failed.
    pub fn send(&mut self, line: fmt::Arguments<'_>) -> Result<()> {
        self.write(line, true)
    }

    /// Send one line without flushing, for bulk data followed by a flushed
    /// terminator
    pub fn send_buffered(&mut self, line: fmt::Arguments<'_>) -> Result<()> {
        self.write(line, false)
    }

    /// Send a preformatted command line and flush
    pub fn cmd(&mut self, command: &str) -> Result<()> {
        self.send(format_args!("{}", command))
    }

    /// Change the plot style by name.
    ///
    /// Names must match exactly. An unknown name is logged and the current
    /// style is kept, which is `points` for a fresh session.
    pub fn set_style(&mut self, name: &str) {
        match name.parse::<PlotStyle>() {
            Ok(style) => self.style = style,
            Err(e) => warn!("{}: keeping {}", e, self.style),
        }
    }

    pub fn set_plot_style(&mut self, style: PlotStyle) {
        self.style = style;
    }

    /// Label text is sent verbatim; a `"` inside it breaks the command
    pub fn set_xlabel(&mut self, label: &str) -> Result<()> {
        self.send(format_args!("set xlabel \"{}\"", label))
    }

    pub fn set_ylabel(&mut self, label: &str) -> Result<()> {
        self.send(format_args!("set ylabel \"{}\"", label))
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        self.send(format_args!("set title \"{}\"", title))
    }

    /// Start a new frame: the next draw emits `plot` instead of `replot`
    pub fn reset_plot(&mut self) {
        self.active_plots = 0;
    }

    /// Enter multiplot mode, appending `options` to `set multiplot`
    pub fn begin_multiplot(&mut self, options: Option<&str>) -> Result<()> {
        if self.multiplot {
            debug!("already in multiplot mode");
            return Ok(());
        }
        match options {
            Some(options) => self.send(format_args!("set multiplot {}", options))?,
            None => self.send(format_args!("set multiplot"))?,
        }
        self.multiplot = true;
        Ok(())
    }

    /// Leave multiplot mode
    pub fn end_multiplot(&mut self) -> Result<()> {
        if !self.multiplot {
            return Ok(());
        }
        self.send(format_args!("unset multiplot"))?;
        self.multiplot = false;
        Ok(())
    }

    fn verb(&self) -> PlotVerb {
        if self.multiplot || self.active_plots == 0 {
            PlotVerb::Plot
        } else {
            PlotVerb::Replot
        }
    }

    fn write_values(&mut self, values: &[f64]) -> Result<()> {
        for value in values {
            self.send_buffered(format_args!("{}", Scientific::data(*value)))?;
        }
        self.send(format_args!("{}", END_OF_DATA))
    }

    fn write_pairs(&mut self, x: &[f64], y: &[f64]) -> Result<()> {
        for (xv, yv) in x.iter().zip(y) {
            self.send_buffered(format_args!(
                "{} {}",
                Scientific::data(*xv),
                Scientific::data(*yv)
            ))?;
        }
        self.send(format_args!("{}", END_OF_DATA))
    }

    /// Plot one series of values against their index.
    ///
    /// Returns the number of series drawn, 0 when `values` is empty.
    pub fn plot_x(&mut self, values: &[f64], title: Option<&str>) -> Result<usize> {
        if values.is_empty() {
            debug!("plot_x: empty series, nothing sent");
            return Ok(0);
        }

        let header = inline_header(self.verb(), resolve_title(title), self.style);
        self.cmd(&header)?;
        self.write_values(values)?;

        self.active_plots += 1;
        Ok(1)
    }

    /// Plot one series of (x, y) points.
    ///
    /// Only the first `min(x.len(), y.len())` pairs are sent.
    pub fn plot_xy(&mut self, x: &[f64], y: &[f64], title: Option<&str>) -> Result<usize> {
        if x.is_empty() || y.is_empty() {
            debug!("plot_xy: empty series, nothing sent");
            return Ok(0);
        }
        if x.len() != y.len() {
            debug!(x = x.len(), y = y.len(), "plot_xy: length mismatch, truncating");
        }

        let header = inline_header(self.verb(), resolve_title(title), self.style);
        self.cmd(&header)?;
        self.write_pairs(x, y)?;

        self.active_plots += 1;
        Ok(1)
    }

    /// Build the combined header for `count` series, or `None` to abort
    fn multi_header(&self, count: usize, titles: Option<&[Option<&str>]>) -> Option<String> {
        let titles = resolve_titles(titles, count);
        let header = multi_inline_header(self.verb(), &titles, self.style, self.max_command_len);
        if header.is_none() {
            warn!(
                series = count,
                limit = self.max_command_len,
                "combined plot command too long, nothing sent"
            );
        }
        header
    }

    /// Plot several value series in one command.
    ///
    /// Nothing is sent if there are no series, any series is empty, or the
    /// combined header is too long.
    pub fn plot_multi_x<V: AsRef<[f64]>>(
        &mut self,
        series: &[V],
        titles: Option<&[Option<&str>]>,
    ) -> Result<usize> {
        if series.is_empty() || series.iter().any(|s| s.as_ref().is_empty()) {
            debug!("plot_multi_x: empty series, nothing sent");
            return Ok(0);
        }
        let Some(header) = self.multi_header(series.len(), titles) else {
            return Ok(0);
        };

        self.cmd(&header)?;
        for values in series {
            self.write_values(values.as_ref())?;
        }

        self.active_plots += series.len();
        Ok(series.len())
    }

    /// Plot several y series against one shared x series
    pub fn plot_x_multi_y<V: AsRef<[f64]>>(
        &mut self,
        x: &[f64],
        ys: &[V],
        titles: Option<&[Option<&str>]>,
    ) -> Result<usize> {
        if x.is_empty() || ys.is_empty() || ys.iter().any(|y| y.as_ref().is_empty()) {
            debug!("plot_x_multi_y: empty series, nothing sent");
            return Ok(0);
        }
        let Some(header) = self.multi_header(ys.len(), titles) else {
            return Ok(0);
        };

        self.cmd(&header)?;
        for y in ys {
            self.write_pairs(x, y.as_ref())?;
        }

        self.active_plots += ys.len();
        Ok(ys.len())
    }

    /// Plot several independent (x, y) series; `xs[i]` pairs with `ys[i]`
    pub fn plot_multi_xy<X: AsRef<[f64]>, Y: AsRef<[f64]>>(
        &mut self,
        xs: &[X],
        ys: &[Y],
        titles: Option<&[Option<&str>]>,
    ) -> Result<usize> {
        if xs.is_empty() || xs.len() != ys.len() {
            debug!(
                xs = xs.len(),
                ys = ys.len(),
                "plot_multi_xy: series count mismatch, nothing sent"
            );
            return Ok(0);
        }
        let any_empty = xs
            .iter()
            .zip(ys)
            .any(|(x, y)| x.as_ref().is_empty() || y.as_ref().is_empty());
        if any_empty {
            debug!("plot_multi_xy: empty series, nothing sent");
            return Ok(0);
        }
        let Some(header) = self.multi_header(xs.len(), titles) else {
            return Ok(0);
        };

        self.cmd(&header)?;
        for (x, y) in xs.iter().zip(ys) {
            self.write_pairs(x.as_ref(), y.as_ref())?;
        }

        self.active_plots += xs.len();
        Ok(xs.len())
    }

    /// Plot the line `y = a*x + b`
    pub fn plot_slope(&mut self, a: f64, b: f64, title: Option<&str>) -> Result<usize> {
        let command = slope_command(self.verb(), a, b, resolve_title(title), self.style);
        self.cmd(&command)?;
        self.active_plots += 1;
        Ok(1)
    }

    /// Plot `y = expression`, e.g. `"sin(x) * exp(-x)"`.
    ///
    /// The expression is not checked; gnuplot's own complaints are not
    /// visible from here.
    pub fn plot_equation(&mut self, expression: &str, title: Option<&str>) -> Result<usize> {
        let command = equation_command(self.verb(), expression, resolve_title(title), self.style);
        self.cmd(&command)?;
        self.active_plots += 1;
        Ok(1)
    }

    /// Close the session.
    ///
    /// Resources are released whatever happens; a failure is logged and
    /// returned for information only.
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.sink.close().map_err(|e| {
            error!("problem closing communication to gnuplot: {}", e);
            e
        })
    }
}

impl<S: CommandSink> Drop for Session<S> {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

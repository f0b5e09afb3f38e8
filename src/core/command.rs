//! Command-line formatting for the gnuplot DSL
//!
//! Everything here is pure: numbers and titles go in, strings come out. The
//! session decides when and where the resulting lines are written.
//!
//! ```text
//! plot '-' title "a" with lines, '-' title "b" with lines
//! 0.000000e+00 1.000000e+00
//! e
//! 1.000000e+00 2.000000e+00
//! e
//! ```

use std::fmt;

use super::style::PlotStyle;

/// Title used when a series has none
pub const NO_TITLE: &str = "(none)";

/// Line that terminates an inline data block
pub const END_OF_DATA: &str = "e";

/// Default ceiling for a combined multi-series header line
pub const MAX_COMMAND_LEN: usize = 2047;

/// Inline data source marker
const INLINE_SOURCE: &str = "'-'";

/// Whether a draw starts a new frame or adds to the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotVerb {
    Plot,
    Replot,
}

impl PlotVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlotVerb::Plot => "plot",
            PlotVerb::Replot => "replot",
        }
    }
}

impl fmt::Display for PlotVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exponential number formatting compatible with C's `%e` family.
///
/// Rust's `{:e}` writes `1.5e-3`; gnuplot scripts conventionally carry
/// `1.500000e-03`, so the exponent is signed and at least two digits wide.
#[derive(Debug, Clone, Copy)]
pub struct Scientific {
    value: f64,
    precision: usize,
    width: usize,
}

impl Scientific {
    /// Data-line value, `%11le`
    pub fn data(value: f64) -> Self {
        Self {
            value,
            precision: 6,
            width: 11,
        }
    }

    /// Formula coefficient, `%.18e`
    pub fn coefficient(value: f64) -> Self {
        Self {
            value,
            precision: 18,
            width: 0,
        }
    }
}

impl fmt::Display for Scientific {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = if self.value.is_nan() {
            "nan".to_string()
        } else if self.value.is_infinite() {
            let text = if self.value < 0.0 { "-inf" } else { "inf" };
            text.to_string()
        } else {
            let raw = format!("{:.*e}", self.precision, self.value);
            match raw.split_once('e') {
                Some((mantissa, exp)) => {
                    let (sign, digits) = match exp.strip_prefix('-') {
                        Some(digits) => ('-', digits),
                        None => ('+', exp),
                    };
                    format!("{}e{}{:0>2}", mantissa, sign, digits)
                }
                None => raw,
            }
        };
        write!(f, "{:>width$}", text, width = self.width)
    }
}

/// Title for one series, falling back to the placeholder
pub fn resolve_title(title: Option<&str>) -> &str {
    title.unwrap_or(NO_TITLE)
}

/// Titles for `count` series.
///
/// `None` labels every series with the placeholder. Missing or `None`
/// entries get the placeholder and everything else is kept verbatim. The
/// caller's slice is only read.
pub fn resolve_titles<'a>(titles: Option<&[Option<&'a str>]>, count: usize) -> Vec<&'a str> {
    (0..count)
        .map(|i| {
            titles
                .and_then(|t| t.get(i).copied().flatten())
                .unwrap_or(NO_TITLE)
        })
        .collect()
}

/// Length of `'-' title "<title>" with <style>`
fn declaration_len(title: &str, style: PlotStyle) -> usize {
    INLINE_SOURCE.len() + " title \"".len() + title.len() + "\" with ".len() + style.as_str().len()
}

/// Header for a single inline data block
pub fn inline_header(verb: PlotVerb, title: &str, style: PlotStyle) -> String {
    format!("{} {} title \"{}\" with {}", verb, INLINE_SOURCE, title, style)
}

/// Header declaring one inline data block per title.
///
/// The full length is computed before anything is built. Returns `None` when
/// the line would reach `max_len`, or when `titles` is empty.
pub fn multi_inline_header(
    verb: PlotVerb,
    titles: &[&str],
    style: PlotStyle,
    max_len: usize,
) -> Option<String> {
    if titles.is_empty() {
        return None;
    }

    let total = verb.as_str().len()
        + 1
        + titles
            .iter()
            .map(|t| declaration_len(t, style))
            .sum::<usize>()
        + ", ".len() * (titles.len() - 1);
    if total >= max_len {
        return None;
    }

    let mut line = String::with_capacity(total);
    line.push_str(verb.as_str());
    line.push(' ');
    for (i, title) in titles.iter().enumerate() {
        if i > 0 {
            line.push_str(", ");
        }
        line.push_str(INLINE_SOURCE);
        line.push_str(" title \"");
        line.push_str(title);
        line.push_str("\" with ");
        line.push_str(style.as_str());
    }
    Some(line)
}

/// `y = a*x + b` as an inline formula
pub fn slope_command(verb: PlotVerb, a: f64, b: f64, title: &str, style: PlotStyle) -> String {
    format!(
        "{} {} * x + {} title \"{}\" with {}",
        verb,
        Scientific::coefficient(a),
        Scientific::coefficient(b),
        title,
        style
    )
}

/// `y = f(x)` with `expression` passed through untouched
pub fn equation_command(verb: PlotVerb, expression: &str, title: &str, style: PlotStyle) -> String {
    format!("{} {} title \"{}\" with {}", verb, expression, title, style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_format_matches_c() {
        assert_eq!(Scientific::data(0.0).to_string(), "0.000000e+00");
        assert_eq!(Scientific::data(4.0).to_string(), "4.000000e+00");
        assert_eq!(Scientific::data(-0.0015).to_string(), "-1.500000e-03");
        assert_eq!(Scientific::data(1.0e100).to_string(), "1.000000e+100");
        assert_eq!(Scientific::data(123456.789).to_string(), "1.234568e+05");
    }

    #[test]
    fn test_data_format_non_finite_is_padded() {
        assert_eq!(Scientific::data(f64::INFINITY).to_string(), "        inf");
        assert_eq!(Scientific::data(f64::NEG_INFINITY).to_string(), "       -inf");
        assert_eq!(Scientific::data(f64::NAN).to_string(), "        nan");
    }

    #[test]
    fn test_coefficient_format() {
        assert_eq!(
            Scientific::coefficient(2.0).to_string(),
            "2.000000000000000000e+00"
        );
        assert_eq!(
            Scientific::coefficient(-0.5).to_string(),
            "-5.000000000000000000e-01"
        );
    }

    #[test]
    fn test_resolve_titles() {
        assert_eq!(resolve_titles(None, 2), vec![NO_TITLE, NO_TITLE]);

        let titles = [Some("a"), None, Some("c")];
        assert_eq!(resolve_titles(Some(&titles[..]), 3), vec!["a", NO_TITLE, "c"]);
        // Caller data untouched
        assert_eq!(titles, [Some("a"), None, Some("c")]);

        // Short slice pads with the placeholder
        assert_eq!(resolve_titles(Some(&titles[..1]), 2), vec!["a", NO_TITLE]);
    }

    #[test]
    fn test_inline_header() {
        assert_eq!(
            inline_header(PlotVerb::Plot, "sq", PlotStyle::Lines),
            "plot '-' title \"sq\" with lines"
        );
        assert_eq!(
            inline_header(PlotVerb::Replot, NO_TITLE, PlotStyle::Points),
            "replot '-' title \"(none)\" with points"
        );
    }

    #[test]
    fn test_multi_inline_header() {
        let line =
            multi_inline_header(PlotVerb::Plot, &["a", "b"], PlotStyle::Steps, MAX_COMMAND_LEN);
        assert_eq!(
            line.as_deref(),
            Some("plot '-' title \"a\" with steps, '-' title \"b\" with steps")
        );
    }

    #[test]
    fn test_multi_inline_header_length_is_exact() {
        let titles = ["one", "two", "three"];
        let header = |max_len: usize| {
            multi_inline_header(PlotVerb::Replot, &titles, PlotStyle::Dots, max_len)
        };
        let line = header(MAX_COMMAND_LEN).unwrap();

        // Exactly at the ceiling is rejected, one past it is accepted
        assert!(header(line.len()).is_none());
        assert!(header(line.len() + 1).is_some());
    }

    #[test]
    fn test_multi_inline_header_overflow() {
        let long = "x".repeat(1024);
        let titles = [long.as_str(), long.as_str()];
        let header = |titles: &[&str]| {
            multi_inline_header(PlotVerb::Plot, titles, PlotStyle::Lines, MAX_COMMAND_LEN)
        };
        assert!(header(&titles).is_none());
        assert!(header(&[]).is_none());
    }

    #[test]
    fn test_function_commands() {
        assert_eq!(
            slope_command(PlotVerb::Plot, 2.0, 1.0, "fit", PlotStyle::Lines),
            "plot 2.000000000000000000e+00 * x + 1.000000000000000000e+00 title \"fit\" with lines"
        );
        assert_eq!(
            equation_command(PlotVerb::Replot, "sin(x)", "Sine wave", PlotStyle::Points),
            "replot sin(x) title \"Sine wave\" with points"
        );
    }
}

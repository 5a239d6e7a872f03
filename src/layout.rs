//! Fixed-width text layout with optional ANSI styling.
//!
//! Every line is padded the same way whether or not color is enabled, so a
//! colored report with its escape sequences stripped is byte-for-byte the
//! plain report. Source text is escaped before it is laid out, so the only
//! escape sequences in the output are the ones added here.

use std::borrow::Cow;
use std::sync::LazyLock;

use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use regex::Regex;
use serde::Deserialize;

use crate::model::{percent, ClassStat, FileReport, LineStatus, MethodStat, SuiteTotals};
use crate::threshold::{Thresholds, Tier};

/// Extra columns reserved after the widest source line of a file.
const SOURCE_PADDING: usize = 10;

static ESCAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Header,
    Tier(Tier),
    Covered,
    Uncovered,
    Uncoverable,
}

impl Style {
    fn apply(self, text: &str) -> ColoredString {
        match self {
            Style::Header => text.bold().white().on_black(),
            Style::Tier(Tier::High) | Style::Covered => text.black().on_green(),
            Style::Tier(Tier::Medium) => text.black().on_yellow(),
            Style::Tier(Tier::Low) | Style::Uncovered => text.white().on_red(),
            Style::Uncoverable => text.black().on_white(),
        }
    }
}

impl From<LineStatus> for Style {
    fn from(status: LineStatus) -> Self {
        match status {
            LineStatus::Covered { .. } => Style::Covered,
            LineStatus::Uncovered => Style::Uncovered,
            LineStatus::Uncoverable => Style::Uncoverable,
        }
    }
}

/// How each line of a source listing is prefixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerStyle {
    /// `[ 12] source`
    #[default]
    LineNumber,
    /// `  [y] source`, `  [!] source`, `  [/] source`
    Glyph,
}

impl MarkerStyle {
    fn marker(self, record_line: u32, status: LineStatus, number_width: usize) -> String {
        match self {
            MarkerStyle::LineNumber => format!("[{record_line:>number_width$}]"),
            MarkerStyle::Glyph => {
                let glyph = match status {
                    LineStatus::Covered { .. } => 'y',
                    LineStatus::Uncovered => '!',
                    LineStatus::Uncoverable => '/',
                };
                format!("  [{glyph}]")
            }
        }
    }
}

/// Remove every ANSI style sequence from `text`.
#[must_use]
pub fn strip_styles(text: &str) -> Cow<'_, str> {
    ESCAPE_RE.replace_all(text, "")
}

/// Replace control characters other than tab with visible stand-ins: C0 and
/// DEL by their Unicode control pictures (`\x1b` becomes `\u{241b}`), C1 by
/// U+FFFD. The character count is unchanged.
#[must_use]
pub fn escape_controls(text: &str) -> Cow<'_, str> {
    if !text.chars().any(needs_escape) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|c| match c {
                '\u{7f}' => '\u{2421}',
                c if c < ' ' && c != '\t' => {
                    char::from_u32(0x2400 + c as u32).unwrap_or('\u{fffd}')
                }
                c if needs_escape(c) => '\u{fffd}',
                c => c,
            })
            .collect(),
    )
}

fn needs_escape(c: char) -> bool {
    c.is_control() && c != '\t'
}

/// `NN.NN%`, with 0/0 rendered as `0.00%`.
#[must_use]
pub fn format_percent(covered: u64, total: u64) -> String {
    format!("{:.2}%", percent(covered, total))
}

fn format_counts(covered: u64, total: u64) -> String {
    format!("{} ({covered}/{total})", format_percent(covered, total))
}

/// The three suite summary lines, unstyled and unpadded.
#[must_use]
pub fn summary_lines(totals: &SuiteTotals) -> [String; 3] {
    let row = |label: &str, covered: u64, total: u64| {
        format!(
            "  {label:<8} {:>7} ({covered}/{total})",
            format_percent(covered, total)
        )
    };
    [
        row("Classes:", totals.tested_classes, totals.classes),
        row("Methods:", totals.tested_methods, totals.methods),
        row("Lines:", totals.executed_lines, totals.executable_lines),
    ]
}

#[derive(Debug, Clone, Copy)]
pub struct TextLayout {
    use_color: bool,
    thresholds: Thresholds,
}

impl TextLayout {
    /// A colored layout turns on `colored`'s global override; terminal
    /// detection is the caller's job.
    pub fn new(use_color: bool, thresholds: Thresholds) -> Self {
        if use_color {
            colored::control::set_override(true);
        }
        Self {
            use_color,
            thresholds,
        }
    }

    /// Wrap `text` in `style`, or return it untouched when color is off.
    #[must_use]
    pub fn paint(&self, style: Style, text: &str) -> String {
        if self.use_color {
            style.apply(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Pad `text` to `width` characters, style it and terminate the line.
    #[must_use]
    pub fn line(&self, style: Option<Style>, width: usize, text: &str) -> String {
        let padded = format!("{text:<width$}");
        let mut out = match style {
            Some(style) => self.paint(style, &padded),
            None => padded,
        };
        out.push('\n');
        out
    }

    fn tier_style(&self, covered: u64, total: u64) -> Style {
        Style::Tier(self.thresholds.tier(covered, total))
    }

    /// Header lines followed by the three summary lines, all padded to the
    /// widest of them.
    #[must_use]
    pub fn summary_block(&self, header: &[&str], totals: &SuiteTotals) -> String {
        let rows = summary_lines(totals);
        let width = header
            .iter()
            .map(|l| l.chars().count())
            .chain(rows.iter().map(|l| l.chars().count()))
            .max()
            .unwrap_or(0);

        let styles = [
            self.tier_style(totals.tested_classes, totals.classes),
            self.tier_style(totals.tested_methods, totals.methods),
            self.tier_style(totals.executed_lines, totals.executable_lines),
        ];

        let mut out = String::new();
        for text in header {
            out.push_str(&self.line(Some(Style::Header), width, text));
        }
        for (row, style) in rows.iter().zip(styles) {
            out.push_str(&self.line(Some(style), width, row));
        }
        out
    }

    /// `Name (Methods: P% (c/t) | Lines: P% (c/t))`, colored by method tier.
    #[must_use]
    pub fn class_header(&self, class: &ClassStat) -> String {
        let text = format!(
            "{} (Methods: {} | Lines: {})",
            class.qualified_name,
            format_counts(class.methods_covered, class.method_count),
            format_counts(class.statements_covered, class.statement_count),
        );
        let style = self.tier_style(class.methods_covered, class.method_count);
        self.line(Some(style), 0, &text)
    }

    #[must_use]
    pub fn method_line(&self, method: &MethodStat) -> String {
        let text = format!(
            "  - [{}:{}] {} (Coverage: {} | Cyclomatic complexity: {} | CRAP: {})",
            method.start_line,
            method.end_line,
            method.name,
            format_percent(method.executed_lines, method.executable_lines),
            method.ccn,
            method.crap,
        );
        let style = self.tier_style(method.executed_lines, method.executable_lines);
        self.line(Some(style), 0, &text)
    }

    /// Annotated listing of a file, or `None` if its source was unreadable.
    #[must_use]
    pub fn source_listing(&self, file: &FileReport, markers: MarkerStyle) -> Option<String> {
        let source: Vec<_> = file
            .source_lines
            .as_ref()?
            .iter()
            .map(|l| escape_controls(l))
            .collect();
        let widest = source
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
            + SOURCE_PADDING;
        let number_width = source.len().to_string().len();

        let mut out = String::new();
        for (text, record) in source.iter().zip(&file.records) {
            let marker = markers.marker(record.line_number, record.status, number_width);
            let body = format!("{marker} {text:<widest$}");
            out.push_str(&self.paint(Style::from(record.status), &body));
            out.push('\n');
        }
        Some(out)
    }
}

//! Rendering for `--output`: tables for people, JSON/YAML for tools, and
//! bare identifiers for shell pipelines.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use reefdesk_core::{PaymentStatus, RoomStatus};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Color is on for `always`, or for `auto` on a TTY without `NO_COLOR`.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

pub fn room_status(status: RoomStatus, color: bool) -> String {
    let text = status.to_string();
    if !color {
        return text;
    }
    match status {
        RoomStatus::Available => text.green().to_string(),
        RoomStatus::Occupied => text.blue().to_string(),
        RoomStatus::Cleaning => text.yellow().to_string(),
        RoomStatus::Maintenance => text.red().to_string(),
    }
}

pub fn payment_status(status: PaymentStatus, color: bool) -> String {
    let text = status.to_string();
    if !color {
        return text;
    }
    match status {
        PaymentStatus::Paid => text.green().to_string(),
        PaymentStatus::Partial => text.yellow().to_string(),
        PaymentStatus::Pending => text.red().to_string(),
    }
}

/// Thousands-separated amount, e.g. `$135.000`.
pub fn money(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

// ── Dispatch ─────────────────────────────────────────────────────────

/// Render a collection. Tables go through `to_row`; json and yaml serialize
/// `data` itself; plain prints `id_fn` of each item on its own line.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render one record.
///
/// Table rendering uses `detail_fn`, since single-item views are
/// key/value blocks rather than rows.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Write to stdout unless `--quiet` or there is nothing to say.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Status line on stderr, suppressed by `--quiet`.
pub fn notice(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{message}");
    }
}

// ── Renderers ────────────────────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    if rows.is_empty() {
        return "(none)".into();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    if compact {
        serde_json::to_string(data).expect("serialization should not fail")
    } else {
        serde_json::to_string_pretty(data).expect("serialization should not fail")
    }
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(0), "$0");
        assert_eq!(money(999), "$999");
        assert_eq!(money(45_000), "$45.000");
        assert_eq!(money(1_350_000), "$1.350.000");
    }

    #[test]
    fn plain_list_is_one_id_per_line() {
        let out = render_list(
            &OutputFormat::Plain,
            &[1_u32, 2, 3],
            |n| Row { n: *n },
            u32::to_string,
        );
        assert_eq!(out, "1\n2\n3");
    }

    #[derive(Tabled)]
    struct Row {
        n: u32,
    }

    #[test]
    fn uncolored_statuses_are_plain_text() {
        assert_eq!(room_status(RoomStatus::Cleaning, false), "cleaning");
        assert_eq!(payment_status(PaymentStatus::Partial, false), "partial");
    }
}

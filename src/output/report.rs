//! Plain-text score report.
//!
//! Layout follows `scorep-score`: the three size lines, the
//! `SCOREP_TOTAL_MEMORY` hint and a right-aligned column table.

use crate::estimator::{Estimator, RowMetrics, SizeSummary};
use crate::filter::{FilterStateEngine, TriState};
use crate::profile::Group;
use crate::utils::config::MAX_REPRESENTABLE_MEMORY;
use crate::utils::format::{number_with_commas, readable_bytes};
use std::fmt::Write;
use std::path::Path;

const TRACE_SIZE_LABEL: &str = "Estimated aggregate size of event trace:";
const MAX_BUF_LABEL: &str = "Estimated requirements for largest trace buffer (max_buf):";
const TOTAL_MEMORY_LABEL: &str = "Estimated memory requirements (SCOREP_TOTAL_MEMORY):";
const LABEL_WIDTH: usize = 60;
const VALUE_WIDTH: usize = 12;

/// One line of the column table
struct ReportRow<'a> {
    symbol: char,
    kind: &'a str,
    metrics: &'a RowMetrics,
    name: &'a str,
}

/// Column widths, at least as wide as the headers
struct Widths {
    kind: usize,
    bytes: usize,
    visits: usize,
    time: usize,
    time_per_visit: usize,
}

impl Widths {
    fn new() -> Self {
        Self {
            kind: "type".len(),
            bytes: "max_buf[B]".len(),
            visits: "visits".len(),
            time: "time[s]".len(),
            time_per_visit: "time/visit[us]".len(),
        }
    }

    fn update(&mut self, row: &ReportRow) {
        self.kind = self.kind.max(row.kind.len());
        self.bytes = self.bytes.max(number_with_commas(row.metrics.max_buf).len());
        self.visits = self.visits.max(number_with_commas(row.metrics.visits).len());
        self.time = self.time.max(format!("{:.2}", row.metrics.time_s).len());
        self.time_per_visit = self
            .time_per_visit
            .max(format!("{:.2}", row.metrics.time_per_visit).len());
    }
}

fn write_header(out: &mut String, w: &Widths) {
    let _ = writeln!(
        out,
        "flt {:>kind$} {:>bytes$} {:>visits$} {:>time$} time[%] {:>tpv$}  region",
        "type",
        "max_buf[B]",
        "visits",
        "time[s]",
        "time/visit[us]",
        kind = w.kind,
        bytes = w.bytes,
        visits = w.visits,
        time = w.time,
        tpv = w.time_per_visit,
    );
}

fn write_row(out: &mut String, w: &Widths, row: &ReportRow) {
    let _ = writeln!(
        out,
        " {}  {:>kind$} {:>bytes$} {:>visits$} {:>time$.2} {:>7.1} {:>tpv$.2}  {}",
        row.symbol,
        row.kind,
        number_with_commas(row.metrics.max_buf),
        number_with_commas(row.metrics.visits),
        row.metrics.time_s,
        row.metrics.time_percent,
        row.metrics.time_per_visit,
        row.name,
        kind = w.kind,
        bytes = w.bytes,
        visits = w.visits,
        time = w.time,
        tpv = w.time_per_visit,
    );
}

/// Filter column symbol of a group
pub fn state_symbol(state: TriState) -> char {
    match state {
        TriState::Included => '-',
        TriState::Excluded => '+',
        TriState::Partial => '*',
    }
}

/// Render the full score report
///
/// **Public** - output of `trace-score score` and `trace-score filter`
///
/// # Arguments
/// * `estimator` - Unfiltered tables
/// * `filter` - Active filter; its figures replace the size lines when regions are excluded
/// * `show_regions` - Append the region table
pub fn render_score_report(
    estimator: &Estimator,
    filter: Option<&FilterStateEngine>,
    show_regions: bool,
) -> String {
    let filter = filter.filter(|f| f.has_filtered());
    let sizes = filter.map_or_else(|| estimator.sizes(), |f| f.filtered_sizes());

    let groups = estimator.group_table();
    let filtered_groups = filter.map(|f| f.filtered_group_table()).unwrap_or_default();
    let regions = if show_regions && filter.is_none() {
        estimator.region_table()
    } else {
        Vec::new()
    };

    let group_rows: Vec<ReportRow> = groups
        .iter()
        .map(|g| ReportRow {
            symbol: ' ',
            kind: g.group.name(),
            metrics: &g.metrics,
            name: &g.name,
        })
        .collect();
    let filtered_rows: Vec<ReportRow> = match filter {
        Some(f) => filtered_groups
            .iter()
            .map(|g| ReportRow {
                symbol: match g.group {
                    Group::Flt => '+',
                    group => f.group_state(group).map_or('-', state_symbol),
                },
                kind: g.group.name(),
                metrics: &g.metrics,
                name: &g.name,
            })
            .collect(),
        None => Vec::new(),
    };
    let region_rows: Vec<ReportRow> = match filter {
        Some(f) if show_regions => f
            .regions()
            .iter()
            .map(|entry| ReportRow {
                symbol: if entry.included { '-' } else { '+' },
                kind: entry.row.group.name(),
                metrics: &entry.row.metrics,
                name: &entry.row.name,
            })
            .collect(),
        _ => regions
            .iter()
            .map(|r| ReportRow {
                symbol: ' ',
                kind: r.group.name(),
                metrics: &r.metrics,
                name: &r.name,
            })
            .collect(),
    };

    let mut widths = Widths::new();
    for row in group_rows.iter().chain(&filtered_rows).chain(&region_rows) {
        widths.update(row);
    }

    let mut out = String::new();
    out.push('\n');
    out.push_str(&render_sizes(&sizes));
    let _ = writeln!(
        out,
        "(hint: When tracing set SCOREP_TOTAL_MEMORY={} to avoid intermediate flushes\n or reduce requirements using USR regions filters.)",
        readable_bytes(sizes.total_memory)
    );
    out.push('\n');

    write_header(&mut out, &widths);
    for row in &group_rows {
        write_row(&mut out, &widths, row);
    }

    if !filtered_rows.is_empty() {
        out.push('\n');
        for row in &filtered_rows {
            write_row(&mut out, &widths, row);
        }
    }

    if !region_rows.is_empty() {
        out.push('\n');
        for row in &region_rows {
            write_row(&mut out, &widths, row);
        }
    }

    out
}

fn render_sizes(sizes: &SizeSummary) -> String {
    let mut out = String::new();
    for (label, bytes) in size_lines(sizes) {
        let _ = writeln!(out, "{:<width$}{}", label, readable_bytes(bytes), width = LABEL_WIDTH);
    }
    out
}

fn size_lines(sizes: &SizeSummary) -> [(&'static str, u64); 3] {
    [
        (TRACE_SIZE_LABEL, sizes.trace_size),
        (MAX_BUF_LABEL, sizes.max_buf),
        (TOTAL_MEMORY_LABEL, sizes.total_memory),
    ]
}

/// Size figures side by side, with a filtered column when given
pub fn render_size_table(unfiltered: &SizeSummary, filtered: Option<&SizeSummary>) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "{:<width$}{:>value$}",
        "",
        "unfiltered",
        width = LABEL_WIDTH,
        value = VALUE_WIDTH
    );
    if filtered.is_some() {
        let _ = write!(out, "{:>value$}", "filtered", value = VALUE_WIDTH);
    }
    out.push('\n');

    let filtered_lines = filtered.map(size_lines);
    for (index, (label, bytes)) in size_lines(unfiltered).into_iter().enumerate() {
        let _ = write!(
            out,
            "{:<width$}{:>value$}",
            label,
            readable_bytes(bytes),
            width = LABEL_WIDTH,
            value = VALUE_WIDTH
        );
        if let Some(lines) = &filtered_lines {
            let _ = write!(out, "{:>value$}", readable_bytes(lines[index].1), value = VALUE_WIDTH);
        }
        out.push('\n');
    }
    out
}

/// Where the filter went and which memory setting to use
///
/// **Public** - shown after a filter run
pub fn size_advisory(filter_path: Option<&Path>, total_memory: u64) -> String {
    let mut out = String::new();
    if let Some(path) = filter_path {
        let _ = writeln!(out, "Filter file written to: {}", path.display());
    }

    if total_memory > MAX_REPRESENTABLE_MEMORY {
        let _ = writeln!(
            out,
            "Warning: the memory requirement of {} cannot be set with SCOREP_TOTAL_MEMORY, filter more regions.",
            readable_bytes(total_memory)
        );
    } else {
        let _ = writeln!(
            out,
            "When tracing set SCOREP_TOTAL_MEMORY={}",
            readable_bytes(total_memory)
        );
    }
    out
}

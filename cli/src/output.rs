use std::fmt::Write as _;

use ledger_history::HistoryKind;
use ledger_history::LedgerEntry;
use ledger_pager::EdgeTriggers;
use ledger_pager::Order;
use ledger_pager::PagerRecord;
use owo_colors::OwoColorize;
use owo_colors::Style;
use serde::Serialize;

use crate::PagedHistory;

/// Plain-text rendering of a paged list, one line per record under its date
/// header.
pub struct HumanOutput {
    // ANSI escapes must only be added through these styles so that plain
    // output stays plain.
    bold: Style,
    dimmed: Style,
    green: Style,
    red: Style,
}

impl HumanOutput {
    pub fn create_with_ansi(with_ansi: bool) -> Self {
        if with_ansi {
            Self {
                bold: Style::new().bold(),
                dimmed: Style::new().dimmed(),
                green: Style::new().green(),
                red: Style::new().red(),
            }
        } else {
            Self {
                bold: Style::new(),
                dimmed: Style::new(),
                green: Style::new(),
                red: Style::new(),
            }
        }
    }

    pub fn render<R>(&self, paged: &PagedHistory<R>) -> String
    where
        R: PagerRecord + LedgerEntry,
    {
        let snapshot = &paged.snapshot;
        let mut out = String::new();
        for section in snapshot.sections() {
            if let Some(title) = &section.title {
                let _ = writeln!(out, "{}", title.style(self.bold));
            }
            for record in section.ids.iter().filter_map(|id| snapshot.record(id)) {
                self.render_record(&mut out, record, snapshot.order());
            }
        }
        let more = if paged.exhausted() {
            "end of history"
        } else {
            "more available"
        };
        let summary = format!(
            "{} rows, {} pages, {more}",
            snapshot.len(),
            paged.pages_loaded
        );
        let _ = writeln!(out, "{}", summary.style(self.dimmed));
        out
    }

    fn render_record<R: LedgerEntry>(&self, out: &mut String, record: &R, order: Order) {
        let amount = record.amount();
        let signed = if amount.is_sign_positive() && !amount.is_zero() {
            format!("+{amount}")
        } else {
            amount.to_string()
        };
        let signed = if amount.is_sign_negative() {
            signed.style(self.red).to_string()
        } else {
            signed.style(self.green).to_string()
        };
        // Value orders mix days, so they show the full date.
        let when = if order.is_chronological() {
            record.created_at().format("%H:%M").to_string()
        } else {
            record.created_at().format("%Y-%m-%d %H:%M").to_string()
        };
        let _ = write!(
            out,
            "  {}  {:<10} {signed} {}",
            when.style(self.dimmed),
            record.type_tag(),
            record.asset_id(),
        );
        if let Some(counterpart) = record.counterpart() {
            let _ = write!(out, "  {counterpart}");
        }
        out.push('\n');
    }
}

#[derive(Debug, Serialize)]
pub struct JsonSection<'a, R> {
    pub title: Option<&'a str>,
    pub records: Vec<&'a R>,
}

/// Machine-readable form of a paged list, printed with `--json`.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a, R> {
    pub kind: HistoryKind,
    pub order: Order,
    pub rows: usize,
    pub pages_loaded: usize,
    pub exhausted: bool,
    pub triggers: &'a EdgeTriggers,
    pub sections: Vec<JsonSection<'a, R>>,
}

impl<'a, R: PagerRecord> JsonReport<'a, R> {
    pub fn new(kind: HistoryKind, paged: &'a PagedHistory<R>) -> Self {
        let snapshot = &paged.snapshot;
        let sections = snapshot
            .sections()
            .iter()
            .map(|section| JsonSection {
                title: section.title.as_deref(),
                records: section
                    .ids
                    .iter()
                    .filter_map(|id| snapshot.record(id))
                    .collect(),
            })
            .collect();
        Self {
            kind,
            order: snapshot.order(),
            rows: snapshot.len(),
            pages_loaded: paged.pages_loaded,
            exhausted: paged.exhausted(),
            triggers: &paged.triggers,
            sections,
        }
    }
}

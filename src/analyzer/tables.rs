use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use super::counting::{
    count_bot_wise_status_tickets, count_tickets_for_unique_modes, normalize_problem_values,
    problem_reported_count_botwise, total_ticket_received_count,
    total_ticket_received_count_modewise, CountTable, NestedCountTable,
};
use super::partition::{bot_keys, split_by_bot_name};
use super::window::split_by_window;
use crate::config::ReportConfig;
use crate::error::AppError;
use crate::parser::columns::{BOT_NAME, MODE, PROBLEM_REPORTED, STATUS, TICKET_CREATION_DATE};
use crate::parser::types::RecordSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSummary {
    pub reference: NaiveDate,
    pub cutoff: NaiveDate,
    pub recent_rows: usize,
    pub archive_rows: usize,
    pub undated_rows: usize,
}

/// Every count table the report needs, for one cleaned export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTables {
    pub bots: Vec<String>,
    pub modes: Vec<String>,
    /// Mode → bot → tickets received in the current window.
    pub mode_wise: NestedCountTable,
    /// `"{bot}_{mode}"` → tickets received in the current window.
    pub received: CountTable,
    /// Status → `"total_{status}_ticket_{bot}_{mode}"` counts, current window.
    pub status_by_mode: IndexMap<String, CountTable>,
    /// Section title → bot → ticket count.
    pub sections: IndexMap<String, CountTable>,
    /// Problem text → bot → count, current window.
    pub problems: NestedCountTable,
    pub window: WindowSummary,
}

pub fn current_week_title(status: &str) -> String {
    format!("Total {} Tickets (Current Week)", status)
}

pub fn archive_title(status: &str) -> String {
    format!("Total Archive {} Tickets", status)
}

/// Runs the aggregation pipeline over a cleaned record set.
///
/// Bot keys and modes are taken from the full set, so a bot or mode with no
/// ticket in a window still gets explicit zero counts there.
pub fn build_report_tables(
    records: &RecordSet,
    config: &ReportConfig,
    reference: NaiveDate,
) -> Result<ReportTables, AppError> {
    let bots = bot_keys(records, BOT_NAME);
    let modes = records.distinct_text(MODE);
    log::info!("{} bot(s), {} mode(s) in export", bots.len(), modes.len());

    let split = split_by_window(records, TICKET_CREATION_DATE, Some(reference), config.window_days)?;
    let recent = split_by_bot_name(&split.recent, &bots, BOT_NAME)?;
    let archive = split_by_bot_name(&split.archive, &bots, BOT_NAME)?;

    let mode_wise = total_ticket_received_count_modewise(&recent, &bots, &modes, MODE);
    let received = total_ticket_received_count(&recent, &bots, &modes, MODE);

    let mut status_by_mode = IndexMap::new();
    let mut sections = IndexMap::new();
    for status in &config.current_week_statuses {
        status_by_mode.insert(
            status.clone(),
            count_tickets_for_unique_modes(&recent, &bots, &modes, STATUS, status),
        );
        sections.insert(
            current_week_title(status),
            count_bot_wise_status_tickets(&recent, &bots, &modes, STATUS, status),
        );
    }
    for status in &config.archive_statuses {
        sections.insert(
            archive_title(status),
            count_bot_wise_status_tickets(&archive, &bots, &modes, STATUS, status),
        );
    }

    let problems = if records.has_column(PROBLEM_REPORTED) {
        let values = normalize_problem_values(records, PROBLEM_REPORTED);
        problem_reported_count_botwise(&recent, &bots, &values, PROBLEM_REPORTED)
    } else {
        NestedCountTable::new()
    };

    Ok(ReportTables {
        bots,
        modes,
        mode_wise,
        received,
        status_by_mode,
        sections,
        problems,
        window: WindowSummary {
            reference,
            cutoff: split.cutoff,
            recent_rows: split.recent.len(),
            archive_rows: split.archive.len(),
            undated_rows: split.undated.len(),
        },
    })
}

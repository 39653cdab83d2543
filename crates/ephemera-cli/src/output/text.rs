//! Text and table output formatting for notes.

use chrono::{DateTime, Utc};
use comfy_table::{presets, Cell, ContentArrangement, Table};

use ephemera_core::accounts::AccountStats;
use ephemera_core::service::{DisclosedNote, NoteStatus, NoteSummary};
use ephemera_core::ExpirationType;

const TITLE_WIDTH: usize = 40;

fn timestamp(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", truncated)
}

/// Describe when a note stops being readable.
fn expiry_description(summary: &NoteSummary) -> String {
    match summary.expiration_type {
        ExpirationType::Never => "never".to_string(),
        ExpirationType::View => "after first view".to_string(),
        ExpirationType::Time => match summary.expires_at {
            Some(at) => format!("at {}", timestamp(&at)),
            None => "unknown".to_string(),
        },
    }
}

pub fn print_summary(summary: &NoteSummary) {
    println!("ID:        {}", summary.id);
    if let Some(title) = &summary.title {
        println!("Title:     {}", title);
    }
    println!("Expires:   {}", expiry_description(summary));
    println!(
        "Password:  {}",
        if summary.password_protected { "yes" } else { "no" }
    );
    println!("Created:   {}", timestamp(&summary.created));
    if summary.updated != summary.created {
        println!("Updated:   {}", timestamp(&summary.updated));
    }
}

pub fn print_status(status: &NoteStatus) {
    println!("Title:     {}", status.title.as_deref().unwrap_or("(untitled)"));
    println!(
        "Password:  {}",
        if status.is_password_protected {
            "required (use `ephemera unlock`)"
        } else {
            "none"
        }
    );
}

/// Print a disclosed note; the content goes last so it can be piped.
pub fn print_disclosed(note: &DisclosedNote, quiet: bool) {
    if !quiet {
        if let Some(title) = &note.title {
            println!("# {}", title);
            println!();
        }
    }
    print!("{}", note.content);
    if !note.content.ends_with('\n') {
        println!();
    }
}

pub fn print_note_list(summaries: &[NoteSummary]) {
    if summaries.is_empty() {
        println!("No notes.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID"),
        Cell::new("TITLE"),
        Cell::new("EXPIRES"),
        Cell::new("PASSWORD"),
        Cell::new("CREATED"),
    ]);
    for i in 0..5 {
        if let Some(column) = table.column_mut(i) {
            column.set_padding((0, 2));
        }
    }

    for summary in summaries {
        table.add_row(vec![
            summary.id.to_string(),
            truncate(summary.title.as_deref().unwrap_or("-"), TITLE_WIDTH),
            expiry_description(summary),
            if summary.password_protected { "yes" } else { "no" }.to_string(),
            timestamp(&summary.created),
        ]);
    }

    println!("{}", table);
}

pub fn print_account_stats(email: &str, stats: &AccountStats) {
    println!("Account:       {}", email);
    println!("Notes:         {}", stats.total_notes);
    println!("Member since:  {}", timestamp(&stats.member_since));
}

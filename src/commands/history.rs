use super::Host;
use crate::cli::HistoryCommand;
use crate::error::{CoachError, Result};
use crate::intervention::SavedIntervention;
use crate::storage::{JournalEntry, MoodJournal};
use colored::Colorize;
use prettytable::{format, Table};

/// Handle history commands
pub fn handle_history(host: &Host, command: HistoryCommand) -> Result<()> {
    let journal = host
        .journal
        .as_ref()
        .ok_or_else(|| CoachError::Command("The mood journal is unavailable".to_string()))?;

    match command {
        HistoryCommand::List { limit } => list(journal, limit)?,
        HistoryCommand::Show { id } => match journal.load(&id)? {
            Some(saved) => print_saved(&saved),
            None => println!("{}", format!("No saved check-in matches {}", id).yellow()),
        },
        HistoryCommand::Delete { id } => {
            let removed = journal.delete(&id)?;
            if removed == 0 {
                println!("{}", format!("No saved check-in matches {}", id).yellow());
            } else {
                println!("{}", format!("Deleted {} check-in(s)", removed).green());
            }
        }
    }

    Ok(())
}

fn list(journal: &MoodJournal, limit: usize) -> Result<()> {
    let entries = journal.list(limit)?;
    if entries.is_empty() {
        println!("{}", "No saved check-ins yet.".yellow());
        return Ok(());
    }

    println!("\nSaved Check-ins:");
    build_table(&entries).printstd();
    println!();
    println!(
        "Use {} to see everything from one check-in.",
        "coachkit history show <ID>".cyan()
    );
    println!();
    Ok(())
}

fn build_table(entries: &[JournalEntry]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Saved".bold(),
        "Mood".bold(),
        "Rating".bold(),
        "Shown".bold(),
        "Helped".bold(),
        "Note".bold()
    ]);

    for entry in entries {
        let id_short: String = entry.id.chars().take(10).collect();
        let note = if entry.note.chars().count() > 30 {
            format!("{}...", entry.note.chars().take(27).collect::<String>())
        } else {
            entry.note.clone()
        };
        table.add_row(prettytable::row![
            id_short.cyan(),
            entry.saved_at.format("%Y-%m-%d %H:%M"),
            entry.mood,
            entry.rating,
            entry.shown_count,
            entry.helped_count,
            note
        ]);
    }
    table
}

fn print_saved(saved: &SavedIntervention) {
    println!(
        "\n{} {}  rating {}  feeling {}",
        "Check-in".bold(),
        saved.entry.id.cyan(),
        saved.entry.rating,
        saved.mood
    );
    println!(
        "Reported {}, saved {}",
        saved.entry.timestamp.format("%Y-%m-%d %H:%M"),
        saved.saved_at.format("%Y-%m-%d %H:%M")
    );
    if !saved.entry.note.is_empty() {
        println!("Note: {}", saved.entry.note);
    }

    println!("\n{}", "Shown:".bold());
    for item in &saved.shown {
        println!("  [{}] {}", item.category, item.text);
    }

    let reactions: Vec<_> = saved
        .records
        .iter()
        .filter_map(|r| r.reaction.map(|reaction| (r, reaction)))
        .collect();
    if !reactions.is_empty() {
        println!("\n{}", "Reactions:".bold());
        for (record, reaction) in reactions {
            println!(
                "  {} [{}] {}",
                reaction.as_str().green(),
                record.item.category,
                record.item.text
            );
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Mood;
    use chrono::Utc;

    fn entry(id: &str, note: &str) -> JournalEntry {
        JournalEntry {
            id: id.to_string(),
            reported_at: Utc::now(),
            saved_at: Utc::now(),
            rating: 2,
            mood: Mood::Stressed,
            note: note.to_string(),
            shown_count: 4,
            helped_count: 1,
        }
    }

    #[test]
    fn test_build_table_has_header_and_rows() {
        let table = build_table(&[
            entry("01HZX0000000000000000000AA", "short"),
            entry("01HZX0000000000000000000BB", &"x".repeat(80)),
        ]);
        assert_eq!(table.len(), 3);
    }
}

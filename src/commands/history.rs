//! Table listings for conversations, todos and plan history

use crate::conversation::ConversationManager;
use crate::storage::types::truncate;
use crate::storage::{Conversation, TodoHistoryEntry, TodoItem};
use chrono::Local;
use colored::Colorize;
use prettytable::{format, Table};

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn local_stamp(stamp: &chrono::DateTime<chrono::Utc>) -> String {
    stamp.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Conversation table, favorites first, each group newest first
pub fn conversation_table(manager: &ConversationManager) -> Table {
    let listing = manager.listing();

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "",
        "ID".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Last Updated".bold()
    ]);

    for convo in listing.favorites.iter().chain(listing.others.iter()) {
        let marker = match (convo.id == manager.active_id(), convo.is_favorite) {
            (true, true) => "> *",
            (true, false) => ">",
            (false, true) => "  *",
            (false, false) => "",
        };
        table.add_row(prettytable::row![
            marker,
            short_id(&convo.id).cyan(),
            truncate(&convo.title, 40),
            convo.messages.len(),
            local_stamp(&convo.updated_at)
        ]);
    }

    table
}

pub fn print_conversations(manager: &ConversationManager) {
    println!("\nConversations:");
    conversation_table(manager).printstd();
    println!();
    println!(
        "Use {} to continue a conversation.",
        "/switch <ID>".cyan()
    );
    println!();
}

/// Print every message of a conversation
pub fn print_conversation(convo: &Conversation) {
    println!("\n{} {}", convo.title.bold(), short_id(&convo.id).cyan());
    if convo.messages.is_empty() {
        println!("{}", "No messages yet.".yellow());
        return;
    }
    for message in &convo.messages {
        let role = message.role.as_str().to_uppercase();
        let role = match message.role {
            crate::storage::Role::User => role.green(),
            crate::storage::Role::Assistant => role.cyan(),
        };
        println!("\n{}: {}", role, message.content);
    }
    println!();
}

pub fn todo_table(items: &[TodoItem]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "ID".bold(),
        "Due".bold(),
        "Task".bold(),
        "Status".bold()
    ]);

    for item in items {
        let status = if item.completed {
            "completed".green()
        } else {
            "pending".yellow()
        };
        table.add_row(prettytable::row![
            short_id(&item.id).cyan(),
            item.due_time,
            item.text,
            status
        ]);
    }

    table
}

pub fn print_todos(items: &[TodoItem]) {
    if items.is_empty() {
        println!("{}", "No todos yet. Add one with '<HH:MM> <task>'.".yellow());
        return;
    }
    println!("\nTodos:");
    todo_table(items).printstd();
    println!();
}

/// Print plan history, newest first; `show` expands the N-th entry
pub fn print_todo_history(history: &[TodoHistoryEntry], show: Option<usize>) {
    if history.is_empty() {
        println!("{}", "No plans generated yet.".yellow());
        return;
    }

    if let Some(n) = show {
        match n.checked_sub(1).and_then(|idx| history.get(idx)) {
            Some(entry) => {
                println!("\n{}\n", entry.title.bold());
                println!("{}", entry.summary_html);
            }
            None => println!(
                "{}",
                format!("No plan #{} (have {})", n, history.len()).red()
            ),
        }
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row!["#".bold(), "Title".bold(), "Saved".bold()]);
    for (idx, entry) in history.iter().enumerate() {
        table.add_row(prettytable::row![
            idx + 1,
            entry.title,
            local_stamp(&entry.timestamp)
        ]);
    }

    println!("\nPlan History:");
    table.printstd();
    println!();
}

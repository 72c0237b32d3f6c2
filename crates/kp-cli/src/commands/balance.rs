use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use super::Session;

pub fn show(session: &Session) -> Result<(), String> {
    let balance = session.economy.balance(session.key);
    println!("  Balance {}", balance.to_string().bold());
    Ok(())
}

pub fn top(session: &Session, limit: usize) -> Result<(), String> {
    let rows = session.economy.leaderboard(session.key.group, limit);
    if rows.is_empty() {
        println!("  Nobody in this group has any money yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Rank", "Player", "Balance"]);
    for (place, (player, balance)) in rows.iter().enumerate() {
        table.add_row(vec![
            (place + 1).to_string(),
            player.to_string(),
            balance.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

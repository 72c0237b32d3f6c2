use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use kp_core::humanize;

use super::Session;

pub fn produce(session: &Session, substance: &str) -> Result<(), String> {
    let made = match session.economy.produce(session.key, substance) {
        Ok(made) => made,
        Err(refusal) => return super::refused(&refusal),
    };
    session.save()?;

    println!(
        "  You cooked up {} of {}. You now hold {}g.",
        format!("{}g", made.grams).green(),
        made.substance.bold(),
        made.total
    );
    if let Some(cooldown) = session
        .economy
        .config()
        .substance(&made.substance)
        .map(|s| s.cooldown())
    {
        println!(
            "  {}",
            format!("next batch in {}", humanize(cooldown)).dimmed()
        );
    }
    Ok(())
}

pub fn sell(session: &Session) -> Result<(), String> {
    let report = session.economy.sell_all(session.key);
    session.save()?;

    if report.sale.grams == 0 {
        println!("  Your stash is empty. Nothing to sell.");
        return Ok(());
    }
    println!(
        "  Sold {}g for {}. Balance {}",
        report.sale.grams,
        report.sale.proceeds.to_string().green(),
        report.balance.to_string().bold()
    );
    if report.promotion.is_some() {
        println!(
            "  {} You are now a {}.",
            "Promoted!".bold(),
            report.rank_name.cyan()
        );
    }
    Ok(())
}

pub fn show(session: &Session) -> Result<(), String> {
    let view = session.economy.stash(session.key);

    println!(
        "  {} {}  (lifetime sales {})",
        "Rank".bold(),
        view.rank_name.cyan(),
        view.lifetime_proceeds
    );
    match &view.next_rank {
        Some((name, remaining)) => println!(
            "  {}",
            format!("sell {remaining} more to become a {name}").dimmed()
        ),
        None => println!("  {}", "top of the ladder".dimmed()),
    }

    if view.holdings.is_empty() {
        println!("  Your stash is empty.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Substance", "Grams", "Value"]);
    for holding in &view.holdings {
        table.add_row(vec![
            holding.substance.clone(),
            holding.grams.to_string(),
            holding.value.to_string(),
        ]);
    }
    println!("{table}");
    println!();
    println!("  total value {}", view.total_value.to_string().bold());
    Ok(())
}

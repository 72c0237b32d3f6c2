use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use kp_core::humanize;

use super::Session;

pub fn buy(session: &Session, index: usize) -> Result<(), String> {
    let receipt = match session.economy.purchase_property(session.key, index) {
        Ok(receipt) => receipt,
        Err(refusal) => return super::refused(&refusal),
    };
    session.save()?;

    println!(
        "  You bought the {} for {}. Balance {}",
        receipt.name.bold(),
        receipt.price,
        receipt.balance.to_string().bold()
    );
    Ok(())
}

pub fn collect(session: &Session) -> Result<(), String> {
    let got = match session.economy.collect(session.key) {
        Ok(got) => got,
        Err(refusal) => return super::refused(&refusal),
    };
    session.save()?;

    println!(
        "  Collected {} from {} propert{}. Balance {}",
        got.amount.to_string().green(),
        got.properties,
        if got.properties == 1 { "y" } else { "ies" },
        got.balance.to_string().bold()
    );
    let interval = session.economy.config().collect_interval();
    println!(
        "  {}",
        format!("come back in {}", humanize(interval)).dimmed()
    );
    Ok(())
}

pub fn owned(session: &Session) -> Result<(), String> {
    let owned = session.economy.list_owned(session.key);
    if owned.is_empty() {
        println!("  You don't own any properties yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Property", "Income"]);
    for (index, property) in &owned {
        table.add_row(vec![
            index.to_string(),
            property.name.clone(),
            property.collect_amount.to_string(),
        ]);
    }
    println!("{table}");
    println!();

    let income: kp_core::Money = owned.iter().map(|(_, p)| p.collect_amount).sum();
    println!(
        "  {} properties, {} per collection",
        owned.len(),
        income.to_string().bold()
    );
    Ok(())
}

pub fn catalog(session: &Session) -> Result<(), String> {
    let entries = session.economy.catalog(session.key);
    if entries.is_empty() {
        println!("  Nothing is for sale.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Property", "Price", "Income", ""]);
    for entry in &entries {
        table.add_row(vec![
            entry.index.to_string(),
            entry.property.name.clone(),
            entry.property.price.to_string(),
            entry.property.collect_amount.to_string(),
            if entry.owned { "owned" } else { "" }.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

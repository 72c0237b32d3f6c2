use colored::Colorize;
use kp_core::humanize;
use kp_economy::ActionKind;

use super::Session;

pub fn run(session: &Session, kind: ActionKind) -> Result<(), String> {
    let report = match session.economy.perform(session.key, kind) {
        Ok(report) => report,
        Err(refusal) => return super::refused(&refusal),
    };
    session.save()?;

    let delta = if report.applied.is_negative() {
        report.applied.to_string().red()
    } else if report.applied.is_zero() {
        report.applied.to_string().dimmed()
    } else {
        report.applied.to_string().green()
    };
    println!("  {}", report.message);
    println!("  {delta}  balance {}", report.balance.to_string().bold());

    let cooldown = session.economy.config().action(kind).cooldown();
    println!(
        "  {}",
        format!("you can {kind} again in {}", humanize(cooldown)).dimmed()
    );
    Ok(())
}

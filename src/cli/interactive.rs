//! Terminal rendering of the popup and interactive coupon selection

use crate::agents::{Notice, PopupState};
use crate::models::{Coupon, FetchStatus};
use crate::page::{CheckoutSignal, FieldSelector, InputField};
use crate::session::SessionOutcome;
use anyhow::Result;
use colored::*;
use dialoguer::{theme::ColorfulTheme, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while the content agent looks up coupons.
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn coupon_line(coupon: &Coupon) -> String {
    format!(
        "{:<12} {}  ({:.0}% success, tested {})",
        coupon.code, coupon.description, coupon.success_rate, coupon.last_tested
    )
}

/// Let the user click one coupon in the popup. `None` means they closed it.
pub fn select_coupon(coupons: &[Coupon]) -> Result<Option<String>> {
    let mut items: Vec<String> = coupons.iter().map(coupon_line).collect();
    items.push("Close popup".to_string());

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Available coupons")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(coupons.get(selection).map(|c| c.code.clone()))
}

pub fn print_detection(url: &str, signal: Option<CheckoutSignal>, field: Option<(&InputField, &FieldSelector)>) {
    println!("{}", "Checkout detection".bold().blue());
    println!("{}", "=".repeat(50).blue());
    println!("URL: {}", url);

    match signal {
        Some(signal) => println!("{} {}", "✅ Checkout page:".green().bold(), signal),
        None => println!("{}", "➖ Not a checkout page".yellow()),
    }

    println!();
    match field {
        Some((field, selector)) => {
            println!("{} {} via {}", "🎟️  Coupon field:".green().bold(), field.id, selector);
            if let Some(name) = &field.name {
                println!("  name: {}", name);
            }
            if let Some(id) = &field.element_id {
                println!("  id: {}", id);
            }
            if let Some(placeholder) = &field.placeholder {
                println!("  placeholder: {}", placeholder);
            }
        }
        None => println!("{}", "No coupon field found (apply would copy to clipboard)".dimmed()),
    }
}

pub fn print_popup(state: &PopupState) {
    println!("{}", "🏷️  CouponFinder".bold().blue());
    println!("{}", "=".repeat(50).blue());

    match state {
        PopupState::Loading => println!("{}", "Loading coupons...".dimmed()),
        PopupState::Failed(message) => println!("{}", message.red()),
        PopupState::Empty => println!("{}", "No coupons found for this site".yellow()),
        PopupState::Ready { coupons, notice } => {
            if let Some(notice) = notice {
                print_notice(notice);
            }
            for coupon in coupons {
                println!("  {}", coupon_line(coupon));
            }
        }
    }
}

pub fn print_notice(notice: &Notice) {
    match notice {
        Notice::Applied(_) => println!("{}", notice.message().green().bold()),
        Notice::Copied(_) => println!("{}", notice.message().yellow().bold()),
        Notice::Error(_) => println!("{}", notice.message().red().bold()),
    }
}

pub fn print_outcome(outcome: &SessionOutcome) {
    match outcome.signal {
        Some(signal) => println!("{} {}", "Checkout page:".bold(), signal),
        None => println!("{}", "Not a checkout page; no lookup was made".dimmed()),
    }
    if outcome.fetch == FetchStatus::Failed {
        println!("{}", "Coupon lookup failed".red());
    }
    println!();

    print_popup(&outcome.popup);

    let notice = match &outcome.notice {
        Some(notice) => notice,
        None => return,
    };

    println!();
    print_notice(notice);
    if let Some((field, value)) = &outcome.field {
        println!("  {} = {:?}", field.id, value);
    }
    if let Some(contents) = &outcome.clipboard {
        println!("  clipboard = {:?}", contents);
    }
}

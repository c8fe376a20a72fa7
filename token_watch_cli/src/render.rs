// Terminal rendering of dashboard snapshots

use colored::{ColoredString, Colorize};
use std::fmt::Write;
use token_watch_core::{DashboardSnapshot, PlTone, Theme, Wallet};
use token_watch_core::dashboard::{ERROR, LOADING, PRICE_LOADING, PRICE_UNAVAILABLE};
use token_watch_core::formatter::{format_usd, short_address};

const HEADERS: [&str; 6] = ["Name", "Address", "Cost", "Balance", "Value (USDT)", "P/L"];

fn header(text: String, theme: Theme) -> ColoredString {
    match theme {
        Theme::Light => text.bold(),
        Theme::Dark => text.bold().bright_white(),
    }
}

fn status_cell(text: String, raw: &str) -> ColoredString {
    match raw {
        ERROR => text.red(),
        LOADING | PRICE_LOADING => text.dimmed(),
        _ => text.normal(),
    }
}

fn tone_cell(text: String, tone: PlTone, theme: Theme) -> ColoredString {
    match (tone, theme) {
        (PlTone::Positive, Theme::Light) => text.green(),
        (PlTone::Positive, Theme::Dark) => text.bright_green(),
        (PlTone::Negative, Theme::Light) => text.red(),
        (PlTone::Negative, Theme::Dark) => text.bright_red(),
        (PlTone::Neutral, _) => text.dimmed(),
    }
}

/// Full dashboard: price line, wallet table, totals row and update status
pub fn dashboard(snapshot: &DashboardSnapshot) -> String {
    let theme = snapshot.theme;
    let mut out = String::new();

    let price = match snapshot.price.as_str() {
        PRICE_UNAVAILABLE => snapshot.price.yellow(),
        PRICE_LOADING => snapshot.price.dimmed(),
        _ => snapshot.price.bold(),
    };
    let _ = write!(out, "Token price: {}", price);
    if let Some(source) = &snapshot.price_source {
        let _ = write!(out, " {}", format!("via {}", source).dimmed());
    }
    out.push('\n');

    if snapshot.rows.is_empty() {
        out.push_str("No wallets added yet. Add a wallet address to start monitoring.\n");
        return out;
    }

    let name_width = snapshot
        .rows
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(HEADERS[0].len());
    let widths = [name_width, 13, 10, 18, 16, 10];

    for (title, width) in HEADERS.iter().zip(widths) {
        let _ = write!(out, "{} ", header(format!("{:<w$}", title, w = width), theme));
    }
    out.push('\n');
    out.push_str(&"-".repeat(widths.iter().sum::<usize>() + widths.len()));
    out.push('\n');

    for row in &snapshot.rows {
        let _ = writeln!(
            out,
            "{:<w0$} {:<w1$} {:>w2$} {} {} {}",
            row.name,
            row.short_address,
            row.cost,
            status_cell(format!("{:>w$}", row.balance, w = widths[3]), &row.balance),
            status_cell(format!("{:>w$}", row.usd_value, w = widths[4]), &row.usd_value),
            tone_cell(format!("{:>w$}", row.pl, w = widths[5]), row.pl_tone, theme),
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
        );
    }

    out.push_str(&"-".repeat(widths.iter().sum::<usize>() + widths.len()));
    out.push('\n');
    let _ = writeln!(
        out,
        "{} {:>w3$} {:>w4$}",
        header(
            format!("{:<w$}", "Total", w = widths[0] + widths[1] + widths[2] + 2),
            theme
        ),
        snapshot.total_balance.bold(),
        snapshot.total_usd_value.bold(),
        w3 = widths[3],
        w4 = widths[4],
    );

    let last_update = snapshot
        .last_update
        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    let _ = writeln!(
        out,
        "{}",
        format!(
            "Last update: {}  Next update in: {}s",
            last_update, snapshot.next_update_secs
        )
        .dimmed()
    );
    out
}

/// Stored wallets without balances
pub fn wallet_list(wallets: &[Wallet]) -> String {
    if wallets.is_empty() {
        return "No wallets added yet.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "{:<16} {:<44} {:>10}", "Name".bold(), "Address".bold(), "Cost".bold());
    for wallet in wallets {
        let _ = writeln!(
            out,
            "{:<16} {:<44} {:>10}",
            wallet.name,
            wallet.address,
            format_usd(wallet.cost)
        );
    }
    let _ = writeln!(out, "{} wallet(s)", wallets.len());
    out
}

/// One-line confirmation for an added wallet
pub fn added(wallet: &Wallet) -> String {
    format!(
        "{} {} ({})",
        "Added".green(),
        wallet.name,
        short_address(&wallet.address)
    )
}

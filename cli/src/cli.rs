use std::io::{BufRead, Write};

use anyhow::{Context, bail};
use clap::Parser;
use engine::PairRequest;
use market::{Interval, Window};

#[derive(Debug, Default, Parser)]
#[command(
    name = "pairwatch",
    version,
    about = "Continuously reports the Pearson correlation of two instruments' closing prices"
)]
pub struct Cli {
    /// First instrument symbol (e.g. AAPL). Prompted for when omitted.
    #[arg(long)]
    pub first: Option<String>,

    /// Second instrument symbol. Prompted for when omitted.
    #[arg(long)]
    pub second: Option<String>,

    /// Bar interval: 1m, 5m, 15m, 30m, 1h, 4h, 1d, 1wk, 1mo
    #[arg(long)]
    pub interval: Option<String>,

    /// Lookback window for daily-or-coarser intervals: 1d, 5d, 1mo, 3mo, 6mo,
    /// 1y, 2y, 5y, 10y, ytd, max
    #[arg(long)]
    pub window: Option<String>,
}

/// Fills in whatever the flags left out by prompting on `input`.
pub fn resolve_request<R, W>(cli: &Cli, input: &mut R, out: &mut W) -> anyhow::Result<PairRequest>
where
    R: BufRead,
    W: Write,
{
    if cli.first.is_none() || cli.second.is_none() {
        writeln!(out, "Stock Correlation Calculator - Continuous Monitoring")?;
        writeln!(out, "Enter stock symbols in uppercase (e.g., AAPL for Apple)")?;
    }

    let first = symbol(cli.first.as_deref(), "Enter first stock symbol: ", input, out)?;
    let second = symbol(cli.second.as_deref(), "Enter second stock symbol: ", input, out)?;

    let interval = match cli.interval.as_deref() {
        Some(raw) => interval_or_default(raw, out)?,
        None => {
            writeln!(out, "\nAvailable timeframes: {}", codes(&Interval::ALL))?;
            let raw = prompt("Enter timeframe (default is 1d): ", input, out)?;
            interval_or_default(&raw, out)?
        }
    };

    // Intraday lookbacks are decided by the provider limits; the window is nominal.
    let window = if !interval.is_daily_or_coarser() {
        Window::default()
    } else {
        match cli.window.as_deref() {
            Some(raw) => window_or_default(raw, out)?,
            None => {
                writeln!(out, "\nAvailable periods: {}", codes(&Window::ALL))?;
                let raw = prompt("Enter period (default is 1y): ", input, out)?;
                window_or_default(&raw, out)?
            }
        }
    };

    Ok(PairRequest::new(&first, &second, interval, window))
}

fn symbol<R: BufRead, W: Write>(
    given: Option<&str>,
    question: &str,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<String> {
    if let Some(given) = given.map(str::trim).filter(|s| !s.is_empty()) {
        return Ok(given.to_uppercase());
    }

    loop {
        let answer = prompt(question, input, out)?;
        if !answer.is_empty() {
            return Ok(answer.to_uppercase());
        }
    }
}

/// Empty input is the advertised default; anything unrecognized falls back to
/// it with a notice.
fn interval_or_default<W: Write>(raw: &str, out: &mut W) -> anyhow::Result<Interval> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Interval::default());
    }
    match raw.parse() {
        Ok(interval) => Ok(interval),
        Err(_) => {
            writeln!(out, "Invalid timeframe. Using default '{}'", Interval::default())?;
            Ok(Interval::default())
        }
    }
}

fn window_or_default<W: Write>(raw: &str, out: &mut W) -> anyhow::Result<Window> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Window::default());
    }
    match raw.parse() {
        Ok(window) => Ok(window),
        Err(_) => {
            writeln!(out, "Invalid period. Using default '{}'", Window::default())?;
            Ok(Window::default())
        }
    }
}

/// Writes `question`, reads one line and returns it trimmed. End of input is
/// an error.
fn prompt<R: BufRead, W: Write>(question: &str, input: &mut R, out: &mut W) -> anyhow::Result<String> {
    write!(out, "{question}")?;
    out.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("failed to read from stdin")?;
    if read == 0 {
        bail!("input closed before all values were entered");
    }
    Ok(line.trim().to_string())
}

fn codes<T: std::fmt::Display>(all: &[T]) -> String {
    all.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

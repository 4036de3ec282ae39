use std::io::{self, BufRead, Write};

use clap::Parser;
use serde_json::Value;

use reqlog::observability::{Formatter, LogFormat, LogLevel, Record};

#[derive(Parser)]
#[command(name = "reqlog-pretty")]
#[command(about = "Render JSON log lines from stdin as human-readable lines", long_about = None)]
struct Cli {
    /// Drop records below this level.
    #[arg(short, long)]
    min_level: Option<LogLevel>,

    /// Only show audit events.
    #[arg(short, long)]
    audit_only: bool,

    /// Disable ANSI colours.
    #[arg(long)]
    no_color: bool,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let mut formatter = Formatter::new(LogFormat::Pretty);
    if cli.no_color {
        formatter = formatter.without_ansi();
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        let record = serde_json::from_str::<Value>(&line)
            .ok()
            .and_then(Record::from_value);

        // Anything that is not a record passes through untouched.
        let Some(record) = record else {
            if !cli.audit_only {
                writeln!(out, "{line}")?;
            }
            continue;
        };

        if let Some(min) = cli.min_level {
            if record.level.weight() < min.weight() {
                continue;
            }
        }
        if cli.audit_only && !is_audit(&record) {
            continue;
        }
        writeln!(out, "{}", formatter.render(&record))?;
    }
    Ok(())
}

fn is_audit(record: &Record) -> bool {
    record.fields.contains_key("event")
        && record.msg().is_some_and(|msg| msg.starts_with("Audit event:"))
}

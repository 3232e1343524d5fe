//! Live clock display.

use std::time::Duration;

use chrono_tz::Tz;
use label_engine::clock::{format_clock, now_in, parse_timezone};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Current time in the configured zone, formatted for display.
pub fn clock_line(timezone: &str) -> String {
    format_clock(&now_in(parse_timezone(timezone)))
}

/// Print the time once per second, `ticks` times or until the task is dropped.
pub async fn run_clock<W>(tz: Tz, ticks: Option<u64>, writer: &mut W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    let mut shown = 0u64;
    tracing::debug!(timezone = tz.name(), ?ticks, "Clock started");

    while ticks.is_none_or(|limit| shown < limit) {
        interval.tick().await;
        let line = format!("\r{}", format_clock(&now_in(tz)));
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
        shown += 1;
    }
    writer.write_all(b"\n").await?;
    Ok(())
}

use anyhow::Result;
use chrono::{DateTime, Duration, Local, Timelike};
use pmset::{PowerManager, WAKE_TIME_FORMAT};
use tracing::{error, info, warn};

pub mod args;
pub mod pmset;

/// One wake event per hour for a full day.
pub const WAKE_COUNT: usize = 24;

/// Wakes land at :55 so the machine is up before jobs triggered on the hour.
const WAKE_MINUTE: u32 = 55;

#[derive(Debug, PartialEq, Eq)]
pub struct WakeScheduleSummary {
    pub scheduled: usize,
    pub failed: usize,
}

/// Returns the first wake slot at or after `now`: the next :55 boundary.
pub fn first_wake_slot(now: DateTime<Local>) -> DateTime<Local> {
    let mut candidate = now;
    if now.minute() >= WAKE_MINUTE {
        candidate += Duration::hours(1);
    }
    // :55 can land inside a DST gap, where the local time doesn't exist and
    // chrono yields None. Step forward an hour until the slot resolves.
    for _ in 0..3 {
        if let Some(slot) = candidate
            .with_minute(WAKE_MINUTE)
            .and_then(|v| v.with_second(0))
            .and_then(|v| v.with_nanosecond(0))
        {
            return slot;
        }
        candidate += Duration::hours(1);
    }
    candidate
}

/// Clears existing wake schedules and registers [WAKE_COUNT] hourly wakes.
/// The clear step is all-or-nothing; registration is best-effort, counting
/// failures without aborting.
pub async fn schedule_day_of_wakes(
    power: &dyn PowerManager,
    now: DateTime<Local>,
) -> Result<WakeScheduleSummary> {
    info!("Starting wake event scheduling for the next 24 hours");

    power
        .clear_all()
        .await
        .inspect_err(|e| error!("Failed to clear existing wake events, aborting: {e:#}"))?;
    info!("Cleared existing wake events");

    let start = first_wake_slot(now);
    info!(
        "Scheduling {WAKE_COUNT} wake events starting from {}",
        start.format(WAKE_TIME_FORMAT)
    );

    let mut summary = WakeScheduleSummary {
        scheduled: 0,
        failed: 0,
    };
    for hour in 0..WAKE_COUNT {
        let wake_time = start + Duration::hours(hour as i64);
        match power.schedule_wake(wake_time).await {
            Ok(()) => summary.scheduled += 1,
            Err(e) => {
                error!(
                    "Failed to schedule wake at {}: {e:#}",
                    wake_time.format(WAKE_TIME_FORMAT)
                );
                summary.failed += 1;
            }
        }
    }

    info!("Scheduled {} wake events", summary.scheduled);
    if summary.failed > 0 {
        warn!("Failed to schedule {} wake events", summary.failed);
    }
    info!("Wake event scheduling complete. Verify with: pmset -g sched");

    Ok(summary)
}

use tracing::info;

use super::usage::UsageSnapshot;

/// Decides whether a keepalive prompt is needed for an account. True when any
/// checked window has no recorded reset boundary, or when `force` is set.
/// Pure over the snapshot aside from logging.
pub fn should_send_keepalive(
    account: &str,
    usage: &UsageSnapshot,
    windows: &[String],
    force: bool,
) -> bool {
    if force {
        info!("[{account}] Force flag set - sending keepalive");
        return true;
    }

    let mut send = false;
    for window in windows {
        match usage.reset_boundary(window) {
            Some(resets_at) => {
                info!("[{account}] {window}: reset boundary exists: {resets_at}");
            }
            None => {
                info!("[{account}] {window}: no reset boundary - sending keepalive");
                send = true;
            }
        }
    }
    send
}

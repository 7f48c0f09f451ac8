use std::time::Duration;

use anyhow::Result;
use policy::should_send_keepalive;
use prompt::{KeepaliveSender, PromptSender};
use tracing::{error, info, warn};
use usage::{UsageFetcher, UsageSource};

use crate::{
    config::{Account, Config},
    utils::clock::{Clock, DefaultClock},
};

pub mod policy;
pub mod prompt;
pub mod usage;

/// Orchestrates fetch → decide → send for each account in turn. Accounts are
/// independent: a failure only skips the account it happened on.
pub struct AccountProcessor {
    usage: Box<dyn UsageSource>,
    sender: Box<dyn KeepaliveSender>,
    force: bool,
}

impl AccountProcessor {
    pub fn new(usage: Box<dyn UsageSource>, sender: Box<dyn KeepaliveSender>, force: bool) -> Self {
        Self {
            usage,
            sender,
            force,
        }
    }

    pub async fn run(&self, accounts: &[Account]) {
        for account in accounts {
            self.process_account(account).await;
        }
    }

    async fn process_account(&self, account: &Account) {
        let name = account.name.as_str();

        if account.org_id.is_empty() || account.session_key.is_empty() {
            warn!("[{name}] Missing org_id or session_key, skipping");
            return;
        }
        if !account.config_dir.exists() {
            warn!(
                "[{name}] Config directory missing: {:?}, skipping",
                account.config_dir
            );
            return;
        }

        let usage = match self
            .usage
            .fetch_usage(&account.org_id, &account.session_key)
            .await
        {
            Ok(usage) => usage,
            Err(e) => {
                error!("[{name}] Failed to fetch usage: {e:#}");
                return;
            }
        };

        if !should_send_keepalive(name, &usage, &account.windows, self.force) {
            return;
        }

        match self.sender.send_prompt(&account.config_dir).await {
            Ok(()) => info!("[{name}] Sent prompt: success"),
            Err(e) => error!("[{name}] Keepalive send failed: {e:#}"),
        }
    }
}

/// Entry point of the keepalive driver: waits out the optional
/// network-stabilization delay, then processes every configured account.
pub async fn run_keepalive(config: &Config, force: bool) -> Result<()> {
    let clock = DefaultClock;

    if config.startup_delay_secs > 0 {
        info!(
            "Waiting {}s for the network to stabilize",
            config.startup_delay_secs
        );
        clock
            .sleep(Duration::from_secs(config.startup_delay_secs))
            .await;
    }

    info!("Starting keepalive check");

    let fetcher = UsageFetcher::new(config.api_base_url.clone(), Box::new(DefaultClock))?;
    let sender = PromptSender::new(
        config.claude_bin.clone(),
        config.model.clone(),
        config.prompt.clone(),
    );
    let processor = AccountProcessor::new(Box::new(fetcher), Box::new(sender), force);
    processor.run(&config.accounts).await;

    info!("Keepalive complete");
    Ok(())
}

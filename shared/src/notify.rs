//! Fire-and-forget Telegram notifications.
//!
//! Delivery runs on a spawned task and failures are only logged; a lost
//! message never rolls back the state change it reports.

use teloxide::prelude::*;
use teloxide::types::ChatId;
use tracing::warn;

use crate::config::Config;
use crate::entity::{signal_generations, trades};

#[derive(Clone)]
pub struct Notifier {
    bot: Bot,
    chat_id: ChatId,
}

impl Notifier {
    /// Present only when both the token and the target chat are configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let token = config.bot_token.as_deref()?;
        let chat_id = config.notify_chat_id?;
        Some(Self {
            bot: Bot::new(token),
            chat_id: ChatId(chat_id),
        })
    }

    pub fn signal_promoted(&self, generation: &signal_generations::Model) {
        self.send(format!(
            "📈 Signal promoted: {} {} x{} @ {} (generation #{})",
            generation.side,
            generation.symbol,
            generation.quantity,
            generation.entry_price,
            generation.id
        ));
    }

    pub fn trade_created(&self, trade: &trades::Model) {
        self.send(format!(
            "✅ Trade #{} created: {} {} x{} @ {}",
            trade.id, trade.side, trade.symbol, trade.quantity, trade.entry_price
        ));
    }

    pub fn trade_failed(&self, symbol: &str, reason: &str) {
        self.send(format!("❌ Trade on {} not created: {}", symbol, reason));
    }

    fn send(&self, text: String) {
        let bot = self.bot.clone();
        let chat_id = self.chat_id;
        tokio::spawn(async move {
            if let Err(e) = bot.send_message(chat_id, text).await {
                warn!("Failed to deliver notification: {}", e);
            }
        });
    }
}

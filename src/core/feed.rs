use crate::core::bank::BankId;
use crate::core::entity::{EntityId, EntityStatus};
use crate::risk::scorer::Sentiment;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// A settled loan drawdown from a bank to a borrowing entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub lender: BankId,
    pub borrower: EntityId,
    pub amount: Decimal,
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} \u{2794} {}: \u{20b9}{} Cr (Settled)",
            self.lender, self.borrower, self.amount
        )
    }
}

/// One line of the live market feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogEntry {
    Settlement(Transaction),
    /// Nothing to settle: the active pool is empty.
    MarketQuiet,
    MarketUpdate { entered: EntityId, exited: EntityId },
    Sentiment { sentiment: Sentiment },
    AiAlert { entity: EntityId, recommended_margin_percent: f64 },
    Default { entity: EntityId },
    Recovery { entity: EntityId, outcome: EntityStatus, final_gap: Decimal },
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEntry::Settlement(tx) => write!(f, "{}", tx),
            LogEntry::MarketQuiet => write!(f, "Market Quiet..."),
            LogEntry::MarketUpdate { entered, .. } => {
                write!(f, "MARKET UPDATE: {} entered the market.", entered)
            }
            LogEntry::Sentiment { sentiment } => write!(f, "MARKET SENTIMENT: {}", sentiment),
            LogEntry::AiAlert {
                entity,
                recommended_margin_percent,
            } => write!(
                f,
                "AI ALERT: {} flagged, margin raised to {:.1}%. Simulation paused.",
                entity, recommended_margin_percent
            ),
            LogEntry::Default { entity } => write!(f, "DEFAULT: {} missed its loan payment.", entity),
            LogEntry::Recovery {
                entity,
                outcome,
                final_gap,
            } => match outcome {
                EntityStatus::SafeCcpFundUsed => write!(
                    f,
                    "RECOVERY: {} resolved, CCP default fund drew \u{20b9}{} Cr.",
                    entity, final_gap
                ),
                _ => write!(f, "RECOVERY: {} resolved by margin and assets.", entity),
            },
        }
    }
}

/// Bounded feed of recent log entries, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl MarketLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Insert at the front, dropping the oldest entry past capacity.
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Rendered feed lines, newest first.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn settlement(amount: u32) -> LogEntry {
        LogEntry::Settlement(Transaction {
            lender: BankId::new("Bank A"),
            borrower: EntityId::new("TechCorp"),
            amount: Decimal::from(amount),
        })
    }

    #[test]
    fn test_transaction_display() {
        let tx = Transaction {
            lender: BankId::new("Bank C"),
            borrower: EntityId::new("NanoMed"),
            amount: dec!(42),
        };
        assert_eq!(tx.to_string(), "Bank C \u{2794} NanoMed: \u{20b9}42 Cr (Settled)");
    }

    #[test]
    fn test_log_keeps_newest_first() {
        let mut log = MarketLog::new(10);
        log.push(settlement(20));
        log.push(LogEntry::MarketQuiet);
        assert_eq!(log.latest(), Some(&LogEntry::MarketQuiet));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_log_drops_oldest_past_capacity() {
        let mut log = MarketLog::new(10);
        for amount in 20..35 {
            log.push(settlement(amount));
        }
        assert_eq!(log.len(), 10);
        assert_eq!(log.latest(), Some(&settlement(34)));
        assert_eq!(log.entries().last(), Some(&settlement(25)));
    }

    #[test]
    fn test_recovery_line_mentions_fund_draw() {
        let entry = LogEntry::Recovery {
            entity: EntityId::new("TechCorp"),
            outcome: EntityStatus::SafeCcpFundUsed,
            final_gap: dec!(45.00),
        };
        assert!(entry.to_string().contains("45.00"));
    }

    #[test]
    fn test_log_entry_serializes_tagged() {
        let json = serde_json::to_value(LogEntry::MarketQuiet).unwrap();
        assert_eq!(json["kind"], "market_quiet");
    }
}

use crate::core::bank::BankId;
use crate::core::feed::{LogEntry, Transaction};
use crate::market::pool::EntityPool;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;

/// Smallest and largest simulated drawdown, in crore.
pub const MIN_SETTLEMENT: u32 = 20;
pub const MAX_SETTLEMENT: u32 = 100;

/// Produces synthetic settled drawdowns between banks and active entities.
///
/// Holds no state of its own beyond the bank list.
#[derive(Debug, Clone)]
pub struct TransactionGenerator {
    banks: Vec<BankId>,
}

impl TransactionGenerator {
    pub fn new(banks: Vec<BankId>) -> Self {
        Self { banks }
    }

    pub fn banks(&self) -> &[BankId] {
        &self.banks
    }

    /// One settlement line: a random bank lends a random active entity
    /// between 20 and 100 Cr. An empty pool yields `MarketQuiet`.
    pub fn generate<R: Rng + ?Sized>(&self, pool: &EntityPool, rng: &mut R) -> LogEntry {
        let lender = match self.banks.choose(rng) {
            Some(bank) => bank.clone(),
            None => return LogEntry::MarketQuiet,
        };
        let borrower = match pool.choose(rng) {
            Some(entity) => entity.id().clone(),
            None => return LogEntry::MarketQuiet,
        };
        let amount = Decimal::from(rng.gen_range(MIN_SETTLEMENT..=MAX_SETTLEMENT));

        LogEntry::Settlement(Transaction {
            lender,
            borrower,
            amount,
        })
    }
}

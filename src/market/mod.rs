pub mod pool;
pub mod transactions;

pub mod market_map;

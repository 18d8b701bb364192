pub mod predictor;
pub mod scorer;

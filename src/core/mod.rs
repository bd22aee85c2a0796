pub mod catalogue;
pub mod comparison;
pub mod evaluator;
pub mod payback;
pub mod pricing;
pub mod scenario;
pub mod units;

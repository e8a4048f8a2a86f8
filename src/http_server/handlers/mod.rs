pub mod stainless;
pub mod status;
pub mod transactions;

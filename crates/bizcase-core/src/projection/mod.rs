pub mod break_even;
pub mod cash_flow;
pub mod payback;

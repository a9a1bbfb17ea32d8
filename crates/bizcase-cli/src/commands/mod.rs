pub mod case;
pub mod scenarios;

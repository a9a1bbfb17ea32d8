pub mod engine;
pub mod scenario;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

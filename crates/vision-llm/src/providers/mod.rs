pub mod common;
pub mod qubrid;

pub use qubrid::QubridProvider;

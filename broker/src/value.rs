//! The result shape a broker [`crate::Operation`] produces.

use fxplc_core::Number;

/// Whatever a PLC operation hands back to its caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(Number),
    Bytes(Vec<u8>),
    /// A write that has no meaningful echo value of its own (the facade
    /// re-derives what to report from the request it issued).
    Unit,
}

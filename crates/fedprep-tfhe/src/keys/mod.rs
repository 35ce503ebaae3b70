//! TFHE key types

pub mod client;
pub mod evaluation;

pub use client::TfheClientKey;
pub use evaluation::TfheEvaluationKey;

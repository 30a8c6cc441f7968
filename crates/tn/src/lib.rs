//! Tensor-network primitives: site tensors, matrix product states, canonical
//! forms, compression and the small dense linear algebra they rest on.

pub mod error;
pub mod linalg;
pub mod mps;
pub mod truncation;

pub use error::{TnError, TnResult};

pub mod energy;
pub mod hamiltonian;
pub mod operators;
pub mod states;
mod env;

pub use hamiltonian::{Hamiltonian, LocalTerm, Mpo, TermSum};

//! Synthesis of quantum circuits that prepare a matrix product state from
//! the reference product state, and replay of those circuits on arbitrary
//! states.
//!
//! A chain is first cut into [`Segment`]s, the maximal runs of sites joined
//! by non-trivial bonds. Each segment gets a staircase of gates, two-site
//! gates from its first site up to the last one, which closes the staircase
//! with a single-site gate. The gates of every segment of one snapshot form
//! a [`GateLayer`]; a [`LayerStack`] composes layers built from successive
//! snapshots.

pub mod apply;
pub mod config;
pub mod dense;
pub mod driver;
pub mod error;
pub mod gate;
pub mod layer;
pub mod segment;
pub mod synth;

pub use apply::{apply_inverse_layer, apply_layer};
pub use config::SynthesisConfig;
pub use driver::LayerStack;
pub use error::{CircuitError, CircuitResult};
pub use gate::{Gate, GateRole, GateSupport};
pub use layer::{GateLayer, LayerStats, SegmentGates};
pub use segment::{segments, Segment};
pub use synth::generate_unitaries;

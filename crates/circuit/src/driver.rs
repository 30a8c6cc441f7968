use crate::apply::{apply_inverse_layer, apply_layer};
use crate::config::SynthesisConfig;
use crate::error::CircuitResult;
use crate::layer::{GateLayer, LayerStats};
use crate::synth::generate_unitaries;
use tn::mps::MPS;
use tn::truncation::Truncation;
use tracing::debug;

/// Ordered circuit layers, one per snapshot of a schedule.
///
/// Layer `i` is synthesized against snapshot `i`. [`LayerStack::apply`] runs
/// the most recent layer first; [`LayerStack::apply_inverse`] undoes that
/// exactly, starting from layer 0.
#[derive(Clone, Debug, Default)]
pub struct LayerStack {
    layers: Vec<GateLayer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_layers(layers: Vec<GateLayer>) -> Self {
        Self { layers }
    }

    /// One layer per snapshot, in snapshot order.
    pub fn synthesize(snapshots: &[MPS], config: &SynthesisConfig) -> CircuitResult<Self> {
        let layers = snapshots
            .iter()
            .map(|psi| generate_unitaries(psi, config))
            .collect::<CircuitResult<Vec<_>>>()?;
        Ok(Self { layers })
    }

    pub fn push(&mut self, layer: GateLayer) {
        self.layers.push(layer);
    }

    pub fn layers(&self) -> &[GateLayer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn apply(&self, psi: &MPS, trunc: Truncation) -> CircuitResult<MPS> {
        let mut out = psi.clone();
        for (i, layer) in self.layers.iter().enumerate().rev() {
            out = apply_layer(layer, &out, trunc)?;
            debug!(layer = i, max_bond = out.max_bond(), "applied stacked layer");
        }
        Ok(out)
    }

    /// Exact inverse of [`LayerStack::apply`]; see [`apply_inverse_layer`].
    pub fn apply_inverse(&self, psi: &MPS) -> CircuitResult<MPS> {
        let mut out = psi.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            out = apply_inverse_layer(layer, &out)?;
            debug!(layer = i, max_bond = out.max_bond(), "undid stacked layer");
        }
        Ok(out)
    }

    pub fn stats(&self) -> Vec<LayerStats> {
        self.layers.iter().map(GateLayer::stats).collect()
    }
}

//! Fixed-voltage nodes.

/// A voltage-ratio transformer (substation).
///
/// When reachable from the generator, the transformer node is held at
/// `ratio * V_src`. It always scales the primary source voltage, never the
/// voltage of whatever feeds it, so chained transformers do not compound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformer {
    pub ratio: f64,
}

impl Transformer {
    /// Create a new transformer. `ratio` must already be validated as positive.
    pub fn new(ratio: f64) -> Self {
        Self { ratio }
    }

    /// Voltage held at the transformer node.
    pub fn output_voltage(&self, source_voltage: f64) -> f64 {
        self.ratio * source_voltage
    }
}

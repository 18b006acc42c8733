use serde::{Deserialize, Serialize};

/// Toy feedforward network: 2 inputs (action, romance) → 2 hidden → 1 output.
/// Stack-allocated, no biases. 6 weights total.
///
/// Inputs:  action(1) + romance(1) = 2
/// Output:  predicted appreciation in (0, 1)
pub const INPUT_SIZE: usize = 2;
pub const HIDDEN_SIZE: usize = 2;

/// Hidden-neuron-major: `row i` holds the weights feeding hidden neuron `i`,
/// `column j` the weight from input `j`.
pub type HiddenWeights = [[f64; INPUT_SIZE]; HIDDEN_SIZE];
pub type OutputWeights = [f64; HIDDEN_SIZE];

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Nonlinearity applied at both layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// `sigmoid(z)`
    #[default]
    Plain,
    /// `sigmoid(z * k)` with `k = 5` below zero and `k = 3` otherwise,
    /// which sharpens the response around the midpoint.
    Steep,
}

impl Activation {
    const STEEP_NEGATIVE: f64 = 5.0;
    const STEEP_POSITIVE: f64 = 3.0;

    pub fn apply(self, z: f64) -> f64 {
        match self {
            Activation::Plain => sigmoid(z),
            Activation::Steep => {
                let factor = if z < 0.0 {
                    Self::STEEP_NEGATIVE
                } else {
                    Self::STEEP_POSITIVE
                };
                sigmoid(z * factor)
            }
        }
    }
}

/// Result of one forward pass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Activations {
    pub hidden: [f64; HIDDEN_SIZE],
    pub output: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TasteNet {
    pub w_ih: HiddenWeights,
    pub w_ho: OutputWeights,
}

impl TasteNet {
    pub const WEIGHT_COUNT: usize = INPUT_SIZE * HIDDEN_SIZE + HIDDEN_SIZE;

    pub fn new(w_ih: HiddenWeights, w_ho: OutputWeights) -> Self {
        Self { w_ih, w_ho }
    }

    /// Forward pass. Inputs are not range-checked.
    pub fn forward(&self, input: &[f64; INPUT_SIZE], activation: Activation) -> Activations {
        let mut hidden = [0.0f64; HIDDEN_SIZE];
        for (h, row) in hidden.iter_mut().zip(self.w_ih.iter()) {
            let z: f64 = row.iter().zip(input.iter()).map(|(w, x)| w * x).sum();
            *h = activation.apply(z);
        }

        let zo: f64 = hidden.iter().zip(self.w_ho.iter()).map(|(h, w)| h * w).sum();

        Activations {
            hidden,
            output: activation.apply(zo),
        }
    }

    /// Move every weight a fraction `factor` of the way toward `target`.
    pub fn approach(&mut self, target: &TasteNet, factor: f64) {
        for (row, target_row) in self.w_ih.iter_mut().zip(target.w_ih.iter()) {
            for (w, &t) in row.iter_mut().zip(target_row.iter()) {
                *w += (t - *w) * factor;
            }
        }
        for (w, &t) in self.w_ho.iter_mut().zip(target.w_ho.iter()) {
            *w += (t - *w) * factor;
        }
    }

    /// Flattened as w_ih row-major followed by w_ho.
    pub fn to_weight_vec(&self) -> Vec<f64> {
        self.w_ih
            .iter()
            .flatten()
            .chain(self.w_ho.iter())
            .copied()
            .collect()
    }
}

impl Default for TasteNet {
    fn default() -> Self {
        Self {
            w_ih: [[0.6, -0.3], [-0.2, 0.8]],
            w_ho: [0.7, 0.6],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_midpoint_and_range() {
        assert_eq!(sigmoid(0.0), 0.5);
        for x in [-30.0, -5.0, -0.1, 0.1, 5.0, 30.0] {
            let y = sigmoid(x);
            assert!(y > 0.0 && y < 1.0, "sigmoid({x}) = {y} escaped (0, 1)");
        }
    }

    #[test]
    fn sigmoid_is_strictly_increasing() {
        let xs: Vec<f64> = (-100..=100).map(|i| i as f64 * 0.1).collect();
        for pair in xs.windows(2) {
            assert!(sigmoid(pair[0]) < sigmoid(pair[1]));
        }
    }

    #[test]
    fn plain_forward_matches_worked_example() {
        let net = TasteNet::default();
        let out = net.forward(&[0.9, 0.2], Activation::Plain);
        assert!((out.hidden[0] - sigmoid(0.48)).abs() < 1e-12);
        assert!((out.hidden[1] - sigmoid(-0.02)).abs() < 1e-12);
        assert!((out.hidden[0] - 0.6177).abs() < 1e-4);
        assert!((out.hidden[1] - 0.4950).abs() < 1e-4);
        assert!((out.output - 0.6747).abs() < 1e-4);
    }

    #[test]
    fn forward_is_pure() {
        let net = TasteNet::new([[0.9, -0.4], [-0.3, 0.2]], [0.8, 0.2]);
        let a = net.forward(&[0.3, 0.7], Activation::Steep);
        let b = net.forward(&[0.3, 0.7], Activation::Steep);
        assert_eq!(a, b);
    }

    #[test]
    fn steep_activation_uses_asymmetric_factor() {
        assert!((Activation::Steep.apply(0.2) - sigmoid(0.6)).abs() < 1e-12);
        assert!((Activation::Steep.apply(-0.2) - sigmoid(-1.0)).abs() < 1e-12);
        assert_eq!(Activation::Steep.apply(0.0), 0.5);
    }

    #[test]
    fn out_of_range_inputs_are_accepted() {
        let out = TasteNet::default().forward(&[4.0, -2.0], Activation::Plain);
        assert!(out.output.is_finite() && out.output > 0.0 && out.output < 1.0);
    }

    #[test]
    fn approach_closes_a_fraction_of_the_gap() {
        let mut net = TasteNet::new([[0.0, 0.0], [0.0, 0.0]], [0.0, 0.0]);
        let target = TasteNet::new([[1.0, -1.0], [2.0, -2.0]], [0.5, -0.5]);
        net.approach(&target, 0.1);
        assert_eq!(net.to_weight_vec().len(), TasteNet::WEIGHT_COUNT);
        let expected = [0.1, -0.1, 0.2, -0.2, 0.05, -0.05];
        for (got, want) in net.to_weight_vec().iter().zip(expected) {
            assert!((got - want).abs() < 1e-12);
        }
    }
}

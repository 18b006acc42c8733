//! Cosmetic "training": weights slide toward a profile over a fixed number
//! of ticks while a decaying random error curve is recorded for display.
//! Nothing here is learned.

use crate::cancellation::CancellationToken;
use crate::catalog::ViewerProfile;
use crate::config::VizConfig;
use crate::nn::{Activations, TasteNet};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub iteration: usize,
    pub error: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Running,
}

/// Identifies one transition run so a stale driver cannot tick a newer run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RunId(pub(crate) u64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("no viewer profile selected")]
    NoProfileSelected,
    #[error("a transition is already running")]
    AlreadyRunning,
    #[error("failed to spawn ticker thread: {0}")]
    Spawn(String),
}

/// `amplitude * U(0, 1) * e^(-iteration / decay)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyntheticError {
    pub amplitude: f64,
    pub decay: f64,
}

impl SyntheticError {
    pub fn envelope(&self, iteration: usize) -> f64 {
        self.amplitude * (-(iteration as f64) / self.decay).exp()
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, iteration: usize) -> f64 {
        rng.random::<f64>() * self.envelope(iteration)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub iteration: usize,
    pub error: f64,
    pub activations: Activations,
    pub remaining: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    /// No run active; nothing changed.
    Idle,
    Advanced(TickReport),
    /// The last tick of the run was applied and the phase is back to idle.
    Completed(TickReport),
}

impl TickOutcome {
    pub fn report(&self) -> Option<&TickReport> {
        match self {
            TickOutcome::Idle => None,
            TickOutcome::Advanced(r) | TickOutcome::Completed(r) => Some(r),
        }
    }
}

/// An active run. The target is captured at start; later profile
/// selections do not redirect it.
#[derive(Clone, Debug)]
pub(crate) struct Transition {
    pub(crate) id: RunId,
    target: TasteNet,
    pub(crate) target_name: &'static str,
    next_iteration: usize,
    tick_count: usize,
    step_factor: f64,
    noise: SyntheticError,
    /// Set when a background driver owns the run. Cancelling it releases
    /// the run without the driver taking the session lock.
    driver: Option<CancellationToken>,
}

impl Transition {
    pub(crate) fn new(id: RunId, target: &'static ViewerProfile, config: &VizConfig) -> Self {
        Self {
            id,
            target: target.net(),
            target_name: target.name,
            next_iteration: 0,
            tick_count: config.tick_count,
            step_factor: config.step_factor,
            noise: SyntheticError {
                amplitude: config.error_amplitude,
                decay: config.error_decay,
            },
            driver: None,
        }
    }

    pub(crate) fn with_driver(mut self, driver: CancellationToken) -> Self {
        self.driver = Some(driver);
        self
    }

    /// The driver that owned this run has gone away.
    pub(crate) fn is_abandoned(&self) -> bool {
        self.driver.as_ref().is_some_and(|d| d.is_cancelled())
    }

    /// Applies one interpolation step to `net` and draws that tick's error.
    pub(crate) fn advance<R: Rng + ?Sized>(
        &mut self,
        net: &mut TasteNet,
        rng: &mut R,
    ) -> TrainingSample {
        let iteration = self.next_iteration;
        net.approach(&self.target, self.step_factor);
        self.next_iteration += 1;
        TrainingSample {
            iteration,
            error: self.noise.sample(rng, iteration),
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.tick_count.saturating_sub(self.next_iteration)
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CLASSIC_PROFILES;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn synthetic_error_stays_under_decaying_envelope() {
        let noise = SyntheticError {
            amplitude: 0.5,
            decay: 10.0,
        };
        let mut rng = ChaCha12Rng::seed_from_u64(11);
        for iteration in 0..20 {
            let e = noise.sample(&mut rng, iteration);
            assert!(e >= 0.0 && e < noise.envelope(iteration));
        }
        assert_eq!(noise.envelope(0), 0.5);
        assert!((noise.envelope(10) - 0.5 * (-1.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn transition_counts_down_to_completion() {
        let config = VizConfig::default();
        let mut t = Transition::new(RunId(1), &CLASSIC_PROFILES[0], &config);
        let mut net = TasteNet::default();
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        for expected in 0..config.tick_count {
            assert!(!t.is_complete());
            let sample = t.advance(&mut net, &mut rng);
            assert_eq!(sample.iteration, expected);
        }
        assert!(t.is_complete());
        assert_eq!(t.remaining(), 0);
    }

    #[test]
    fn only_driven_runs_can_be_abandoned() {
        let config = VizConfig::default();
        let free = Transition::new(RunId(1), &CLASSIC_PROFILES[0], &config);
        assert!(!free.is_abandoned());

        let token = CancellationToken::new();
        let driven =
            Transition::new(RunId(2), &CLASSIC_PROFILES[0], &config).with_driver(token.clone());
        assert!(!driven.is_abandoned());
        token.cancel();
        assert!(driven.is_abandoned());
    }

    #[test]
    fn error_series_is_deterministic_for_fixed_seed() {
        let config = VizConfig::default();
        let run = |seed| {
            let mut t = Transition::new(RunId(1), &CLASSIC_PROFILES[1], &config);
            let mut net = TasteNet::default();
            let mut rng = ChaCha12Rng::seed_from_u64(seed);
            (0..config.tick_count)
                .map(|_| t.advance(&mut net, &mut rng).error)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }
}


use crate::cancellation::CancellationToken;
use crate::catalog::{MovieExample, ProfileSet, ViewerProfile};
use crate::config::{ConfigError, VizConfig};
use crate::display::{appreciation_percent, Recommendation};
use crate::nn::{Activation, Activations, TasteNet};
use crate::transition::{
    Phase, RunId, TickOutcome, TickReport, TrainingSample, Transition, TransitionError,
};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// The host of the visualization: network state, selections and the
/// transition run. Every mutator recomputes the activations before it
/// returns, so `activations()` never lags the inputs or weights.
pub struct Session {
    config: VizConfig,
    inputs: [f64; 2],
    net: TasteNet,
    activations: Activations,
    profile: Option<&'static ViewerProfile>,
    transition: Option<Transition>,
    samples: Vec<TrainingSample>,
    rng: ChaCha12Rng,
    next_run_id: u64,
}

/// Serializable view of a session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub inputs: [f64; 2],
    pub weights1: [[f64; 2]; 2],
    pub weights2: [f64; 2],
    pub hidden: [f64; 2],
    pub output: f64,
    pub appreciation: String,
    pub recommendation: Recommendation,
    pub activation: Activation,
    pub profile: Option<String>,
    pub phase: Phase,
    pub samples: Vec<TrainingSample>,
}

impl Session {
    pub fn new(config: VizConfig) -> Self {
        Self::try_new(config).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(config: VizConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::from_rng(&mut rand::rng()),
        };
        let inputs = config.initial_inputs;
        let net = config.initial_net();
        let activations = net.forward(&inputs, config.activation);
        Ok(Self {
            config,
            inputs,
            net,
            activations,
            profile: None,
            transition: None,
            samples: Vec::new(),
            rng,
            next_run_id: 0,
        })
    }

    pub fn config(&self) -> &VizConfig {
        &self.config
    }

    pub fn profile_set(&self) -> ProfileSet {
        self.config.profile_set
    }

    pub fn inputs(&self) -> [f64; 2] {
        self.inputs
    }

    pub fn weights(&self) -> &TasteNet {
        &self.net
    }

    pub fn activations(&self) -> Activations {
        self.activations
    }

    pub fn output(&self) -> f64 {
        self.activations.output
    }

    pub fn recommendation(&self) -> Recommendation {
        Recommendation::from_score(self.activations.output)
    }

    pub fn current_profile(&self) -> Option<&'static ViewerProfile> {
        self.profile
    }

    /// The run in progress, ignoring one whose driver has been released.
    fn active(&self) -> Option<&Transition> {
        self.transition.as_ref().filter(|t| !t.is_abandoned())
    }

    fn owns_run(&self, run: RunId) -> bool {
        self.active().is_some_and(|t| t.id == run)
    }

    fn reap_abandoned(&mut self) {
        if self.transition.as_ref().is_some_and(Transition::is_abandoned) {
            if let Some(t) = self.transition.take() {
                info!(
                    profile = t.target_name,
                    remaining = t.remaining(),
                    "transition driver released"
                );
            }
        }
    }

    pub fn phase(&self) -> Phase {
        if self.active().is_some() {
            Phase::Running
        } else {
            Phase::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.active().is_some()
    }

    /// Whether the training trigger should be enabled.
    pub fn can_start_transition(&self) -> bool {
        self.profile.is_some() && !self.is_running()
    }

    pub fn samples(&self) -> &[TrainingSample] {
        &self.samples
    }

    fn recompute(&mut self) -> Activations {
        self.activations = self.net.forward(&self.inputs, self.config.activation);
        self.activations
    }

    pub fn set_inputs(&mut self, inputs: [f64; 2]) -> Activations {
        self.inputs = inputs;
        self.recompute()
    }

    pub fn set_action(&mut self, action: f64) -> Activations {
        self.set_inputs([action, self.inputs[1]])
    }

    pub fn set_romance(&mut self, romance: f64) -> Activations {
        self.set_inputs([self.inputs[0], romance])
    }

    pub fn set_weights(&mut self, net: TasteNet) -> Activations {
        self.net = net;
        self.recompute()
    }

    /// Overwrites the inputs with the movie's scores and nothing else.
    pub fn select_movie(&mut self, movie: &MovieExample) -> Activations {
        debug!(movie = movie.name, "movie selected");
        self.set_inputs(movie.inputs())
    }

    /// Copies the profile's weights in and marks it current. A running
    /// transition keeps heading for the target it started with.
    pub fn select_profile(&mut self, profile: &'static ViewerProfile) -> Activations {
        debug!(profile = profile.name, "profile selected");
        self.profile = Some(profile);
        self.set_weights(profile.net())
    }

    /// Begins a run toward the current profile. Clears previous samples.
    pub fn start_transition(&mut self) -> Result<RunId, TransitionError> {
        self.reap_abandoned();
        let Some(target) = self.profile else {
            warn!("transition requested with no profile selected");
            return Err(TransitionError::NoProfileSelected);
        };
        if self.transition.is_some() {
            warn!("transition requested while one is running");
            return Err(TransitionError::AlreadyRunning);
        }

        self.next_run_id += 1;
        let id = RunId(self.next_run_id);
        self.samples.clear();
        self.transition = Some(Transition::new(id, target, &self.config));
        info!(
            profile = target.name,
            ticks = self.config.tick_count,
            "transition started"
        );
        Ok(id)
    }

    /// Starts a run owned by a background driver. Cancelling `driver`
    /// releases the run even if the driver never touches the session again.
    pub(crate) fn start_driven_transition(
        &mut self,
        driver: CancellationToken,
    ) -> Result<RunId, TransitionError> {
        let run = self.start_transition()?;
        self.transition = self.transition.take().map(|t| t.with_driver(driver));
        Ok(run)
    }

    /// Applies one tick of whichever run is active.
    pub fn tick(&mut self) -> TickOutcome {
        self.reap_abandoned();
        let Some(transition) = self.transition.as_mut() else {
            return TickOutcome::Idle;
        };

        let sample = transition.advance(&mut self.net, &mut self.rng);
        let remaining = transition.remaining();
        let complete = transition.is_complete();
        let target_name = transition.target_name;
        self.samples.push(sample);
        let activations = self.recompute();

        debug!(
            iteration = sample.iteration,
            error = sample.error,
            output = activations.output,
            "transition tick"
        );

        let report = TickReport {
            iteration: sample.iteration,
            error: sample.error,
            activations,
            remaining,
        };
        if complete {
            self.transition = None;
            info!(profile = target_name, "transition finished");
            TickOutcome::Completed(report)
        } else {
            TickOutcome::Advanced(report)
        }
    }

    /// Ticks only if `run` is still the active run.
    pub fn tick_run(&mut self, run: RunId) -> TickOutcome {
        if self.owns_run(run) {
            self.tick()
        } else {
            TickOutcome::Idle
        }
    }

    /// Drops the active run, if any. Weights and samples stay as they are.
    pub fn stop_transition(&mut self) -> bool {
        self.reap_abandoned();
        match self.transition.take() {
            Some(t) => {
                info!(
                    profile = t.target_name,
                    remaining = t.remaining(),
                    "transition stopped"
                );
                true
            }
            None => false,
        }
    }

    /// Stops `run` if it is still the active run.
    pub fn stop_run(&mut self, run: RunId) -> bool {
        self.owns_run(run) && self.stop_transition()
    }

    /// Starts a run and ticks it to completion without waiting.
    pub fn run_transition_to_end(&mut self) -> Result<Vec<TickReport>, TransitionError> {
        let run = self.start_transition()?;
        let mut reports = Vec::with_capacity(self.config.tick_count);
        loop {
            match self.tick_run(run) {
                TickOutcome::Advanced(report) => reports.push(report),
                TickOutcome::Completed(report) => {
                    reports.push(report);
                    break;
                }
                TickOutcome::Idle => break,
            }
        }
        Ok(reports)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            inputs: self.inputs,
            weights1: self.net.w_ih,
            weights2: self.net.w_ho,
            hidden: self.activations.hidden,
            output: self.activations.output,
            appreciation: appreciation_percent(self.activations.output),
            recommendation: self.recommendation(),
            activation: self.config.activation,
            profile: self.profile.map(|p| p.name.to_string()),
            phase: self.phase(),
            samples: self.samples.clone(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(VizConfig::default())
    }
}

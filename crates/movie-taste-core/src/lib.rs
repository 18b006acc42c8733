//! Toy 2-2-1 sigmoid network predicting how much a viewer will enjoy a movie
//! from its action and romance scores, with preset viewer profiles, preset
//! movies and an animated (cosmetic) weight transition.

pub mod cancellation;
pub mod catalog;
pub mod config;
pub mod display;
pub mod nn;
pub mod session;
pub mod ticker;
pub mod transition;

pub use cancellation::CancellationToken;
pub use catalog::{find_movie, CatalogError, MovieExample, ProfileSet, ViewerProfile, MOVIES};
pub use config::{ConfigError, VizConfig};
pub use display::{ConnectionStyle, NeuronColor, Recommendation};
pub use nn::{sigmoid, Activation, Activations, TasteNet};
pub use session::{Session, SessionSnapshot};
pub use ticker::{TickerExit, TransitionTicker};
pub use transition::{Phase, TickOutcome, TickReport, TrainingSample, TransitionError};

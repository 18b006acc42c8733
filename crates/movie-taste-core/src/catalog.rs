//! Compiled-in viewer profiles and movie examples.

use crate::nn::{HiddenWeights, OutputWeights, TasteNet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug)]
pub struct ViewerProfile {
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub weights1: HiddenWeights,
    pub weights2: OutputWeights,
}

impl ViewerProfile {
    pub fn net(&self) -> TasteNet {
        TasteNet::new(self.weights1, self.weights2)
    }
}

#[derive(Debug)]
pub struct MovieExample {
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub action: f64,
    pub romance: f64,
}

impl MovieExample {
    pub fn inputs(&self) -> [f64; 2] {
        [self.action, self.romance]
    }
}

/// Which set of profile weights is offered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSet {
    #[default]
    Classic,
    /// Stronger opposing weights, tuned for [`crate::nn::Activation::Steep`].
    Recalibrated,
}

impl ProfileSet {
    pub fn profiles(self) -> &'static [ViewerProfile] {
        match self {
            ProfileSet::Classic => &CLASSIC_PROFILES,
            ProfileSet::Recalibrated => &RECALIBRATED_PROFILES,
        }
    }

    pub fn find_profile(self, name: &str) -> Result<&'static ViewerProfile, CatalogError> {
        self.profiles()
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| CatalogError::UnknownProfile(name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("unknown viewer profile: {0}")]
    UnknownProfile(String),
    #[error("unknown movie: {0}")]
    UnknownMovie(String),
}

pub static CLASSIC_PROFILES: [ViewerProfile; 4] = [
    ViewerProfile {
        name: "Action Fan",
        description: "Loves action movies, barely interested in romance",
        icon: "🎬",
        weights1: [[0.9, -0.4], [-0.3, 0.2]],
        weights2: [0.8, 0.2],
    },
    ViewerProfile {
        name: "Romantic",
        description: "Passionate about love stories",
        icon: "💝",
        weights1: [[-0.2, 0.3], [0.1, 0.9]],
        weights2: [0.3, 0.9],
    },
    ViewerProfile {
        name: "Balanced",
        description: "Enjoys a good mix of genres",
        icon: "⭐",
        weights1: [[0.6, 0.5], [0.5, 0.6]],
        weights2: [0.7, 0.7],
    },
    ViewerProfile {
        name: "Demanding Critic",
        description: "Expects a high level on both counts",
        icon: "🎭",
        weights1: [[0.8, 0.7], [0.7, 0.8]],
        weights2: [0.9, 0.9],
    },
];

pub static RECALIBRATED_PROFILES: [ViewerProfile; 4] = [
    ViewerProfile {
        name: "Action Fan",
        description: "Loves action movies, rejects romance",
        icon: "🎬",
        weights1: [[0.9, -0.8], [-0.7, 0.2]],
        weights2: [0.9, 0.1],
    },
    ViewerProfile {
        name: "Romantic",
        description: "Passionate about love stories",
        icon: "💝",
        weights1: [[-0.8, 0.9], [-0.7, 0.9]],
        weights2: [0.1, 0.9],
    },
    ViewerProfile {
        name: "Balanced",
        description: "Enjoys a good mix of genres",
        icon: "⭐",
        weights1: [[0.7, 0.6], [0.6, 0.7]],
        weights2: [0.5, 0.5],
    },
    ViewerProfile {
        name: "Demanding Critic",
        description: "Expects a high level on both counts",
        icon: "🎭",
        weights1: [[0.9, 0.8], [0.8, 0.9]],
        weights2: [0.9, 0.9],
    },
];

pub static MOVIES: [MovieExample; 5] = [
    MovieExample {
        name: "Fast & Furious",
        description: "Pure action",
        icon: "🏎️",
        action: 0.9,
        romance: 0.2,
    },
    MovieExample {
        name: "Titanic",
        description: "Classic romance",
        icon: "🚢",
        action: 0.3,
        romance: 0.9,
    },
    MovieExample {
        name: "Mr. & Mrs. Smith",
        description: "Balanced",
        icon: "🔫",
        action: 0.7,
        romance: 0.7,
    },
    MovieExample {
        name: "Notebook",
        description: "Pure romance",
        icon: "📓",
        action: 0.1,
        romance: 1.0,
    },
    MovieExample {
        name: "Die Hard",
        description: "Pure action",
        icon: "💥",
        action: 1.0,
        romance: 0.1,
    },
];

pub fn find_movie(name: &str) -> Result<&'static MovieExample, CatalogError> {
    MOVIES
        .iter()
        .find(|m| m.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| CatalogError::UnknownMovie(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_sizes() {
        assert_eq!(ProfileSet::Classic.profiles().len(), 4);
        assert_eq!(ProfileSet::Recalibrated.profiles().len(), 4);
        assert_eq!(MOVIES.len(), 5);
    }

    #[test]
    fn editions_share_profile_names() {
        let classic: Vec<_> = CLASSIC_PROFILES.iter().map(|p| p.name).collect();
        let recal: Vec<_> = RECALIBRATED_PROFILES.iter().map(|p| p.name).collect();
        assert_eq!(classic, recal);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let p = ProfileSet::Classic.find_profile("  romantic ").unwrap();
        assert_eq!(p.weights2, [0.3, 0.9]);
        let m = find_movie("die hard").unwrap();
        assert_eq!(m.inputs(), [1.0, 0.1]);
    }

    #[test]
    fn unknown_names_are_reported() {
        assert_eq!(
            ProfileSet::Classic.find_profile("Cinephile").unwrap_err(),
            CatalogError::UnknownProfile("Cinephile".into())
        );
        assert!(matches!(
            find_movie("Casablanca"),
            Err(CatalogError::UnknownMovie(_))
        ));
    }

    #[test]
    fn movie_scores_stay_in_unit_range() {
        assert!(MOVIES
            .iter()
            .all(|m| (0.0..=1.0).contains(&m.action) && (0.0..=1.0).contains(&m.romance)));
    }
}

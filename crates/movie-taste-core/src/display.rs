//! Read-only values derived from the network state for display.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Recommendation bucket for an output score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    WillLove,
    ShouldLike,
    MightLike,
    MightNotLike,
    WillNotLike,
}

impl Recommendation {
    /// Each bucket's lower bound is exclusive: a score of exactly 0.8 is
    /// `ShouldLike`, not `WillLove`.
    pub fn from_score(score: f64) -> Self {
        if score > 0.8 {
            Recommendation::WillLove
        } else if score > 0.6 {
            Recommendation::ShouldLike
        } else if score > 0.4 {
            Recommendation::MightLike
        } else if score > 0.2 {
            Recommendation::MightNotLike
        } else {
            Recommendation::WillNotLike
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Recommendation::WillLove => "Will love it! 🤩",
            Recommendation::ShouldLike => "Should like it 😊",
            Recommendation::MightLike => "Might like it 🤔",
            Recommendation::MightNotLike => "Might not like it 😕",
            Recommendation::WillNotLike => "Won't like it 😬",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Activation shaded from blue (0) toward white (1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeuronColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl NeuronColor {
    pub fn for_activation(value: f64) -> Self {
        let intensity = (value * 255.0).floor().clamp(0.0, 255.0) as u8;
        Self {
            r: intensity,
            g: intensity,
            b: 255,
        }
    }

    pub fn to_css(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Drawn blue.
    Positive,
    /// Drawn red. Zero weights fall here.
    Negative,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStyle {
    pub polarity: Polarity,
    pub width: f64,
}

impl ConnectionStyle {
    const WIDTH_SCALE: f64 = 3.0;

    pub fn for_weight(weight: f64) -> Self {
        let polarity = if weight > 0.0 {
            Polarity::Positive
        } else {
            Polarity::Negative
        };
        Self {
            polarity,
            width: weight.abs() * Self::WIDTH_SCALE,
        }
    }

    pub fn css_color(&self) -> &'static str {
        match self.polarity {
            Polarity::Positive => "blue",
            Polarity::Negative => "red",
        }
    }
}

/// Output score as a percentage with one decimal, e.g. `"67.5%"`.
pub fn appreciation_percent(output: f64) -> String {
    format!("{:.1}%", output * 100.0)
}

pub const SLIDER_MIN: f64 = 0.0;
pub const SLIDER_MAX: f64 = 1.0;
pub const SLIDER_STEP: f64 = 0.01;

/// Clamp to the slider range and snap to its step.
pub fn slider_value(raw: f64) -> f64 {
    if raw.is_nan() {
        return SLIDER_MIN;
    }
    let clamped = raw.clamp(SLIDER_MIN, SLIDER_MAX);
    ((clamped / SLIDER_STEP).round() * SLIDER_STEP).clamp(SLIDER_MIN, SLIDER_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_buckets_have_exclusive_lower_bounds() {
        assert_eq!(Recommendation::from_score(0.81), Recommendation::WillLove);
        assert_eq!(Recommendation::from_score(0.8), Recommendation::ShouldLike);
        assert_eq!(Recommendation::from_score(0.6), Recommendation::MightLike);
        assert_eq!(Recommendation::from_score(0.4), Recommendation::MightNotLike);
        assert_eq!(Recommendation::from_score(0.2), Recommendation::WillNotLike);
        assert_eq!(Recommendation::from_score(0.0), Recommendation::WillNotLike);
        assert_eq!(Recommendation::from_score(1.0), Recommendation::WillLove);
    }

    #[test]
    fn neuron_color_spans_blue_to_white() {
        assert_eq!(NeuronColor::for_activation(0.0).to_css(), "rgb(0, 0, 255)");
        assert_eq!(NeuronColor::for_activation(1.0).to_css(), "rgb(255, 255, 255)");
        assert_eq!(NeuronColor::for_activation(0.5).r, 127);
        assert_eq!(NeuronColor::for_activation(1.7).r, 255);
    }

    #[test]
    fn connection_style_encodes_sign_and_magnitude() {
        let pos = ConnectionStyle::for_weight(0.6);
        assert_eq!(pos.css_color(), "blue");
        assert!((pos.width - 1.8).abs() < 1e-12);

        let neg = ConnectionStyle::for_weight(-0.3);
        assert_eq!(neg.polarity, Polarity::Negative);
        assert!((neg.width - 0.9).abs() < 1e-12);

        assert_eq!(ConnectionStyle::for_weight(0.0).css_color(), "red");
    }

    #[test]
    fn appreciation_is_formatted_with_one_decimal() {
        assert_eq!(appreciation_percent(0.67468), "67.5%");
        assert_eq!(appreciation_percent(1.0), "100.0%");
    }

    #[test]
    fn slider_clamps_and_snaps() {
        assert_eq!(slider_value(-0.3), 0.0);
        assert_eq!(slider_value(1.4), 1.0);
        assert!((slider_value(0.456) - 0.46).abs() < 1e-12);
        assert_eq!(slider_value(f64::NAN), 0.0);
    }
}

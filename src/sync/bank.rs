use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::resolver::FrameSnapshot;
use super::smoother::Smoother;

/// Responsiveness used for keys without an override
pub const DEFAULT_RESPONSIVENESS: f32 = 0.1;

/// Responsiveness of the per-band energy smoother
pub const DEFAULT_BAND_RESPONSIVENESS: f32 = 0.2;

/// Responsiveness of the chroma smoother
pub const DEFAULT_CHROMA_RESPONSIVENESS: f32 = 0.08;

fn assert_responsiveness(responsiveness: f32) {
    assert!(
        responsiveness > 0.0 && responsiveness <= 1.0,
        "Responsiveness must be in (0, 1], got {responsiveness}"
    );
}

/// Scalar features a sketch can smooth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Rms,
    Centroid,
    Contrast,
    Onset,
    Harmonic,
    Percussive,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Feature::Rms,
        Feature::Centroid,
        Feature::Contrast,
        Feature::Onset,
        Feature::Harmonic,
        Feature::Percussive,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::Rms => "rms",
            Feature::Centroid => "centroid",
            Feature::Contrast => "contrast",
            Feature::Onset => "onset",
            Feature::Harmonic => "harmonic",
            Feature::Percussive => "percussive",
        }
    }

    pub fn value_of(self, snapshot: &FrameSnapshot) -> f32 {
        match self {
            Feature::Rms => snapshot.rms,
            Feature::Centroid => snapshot.centroid,
            Feature::Contrast => snapshot.contrast,
            Feature::Onset => snapshot.onset,
            Feature::Harmonic => snapshot.harmonic,
            Feature::Percussive => snapshot.percussive,
        }
    }

    /// Tuned per category: transients track fast, mood features slowly.
    pub fn default_responsiveness(self) -> f32 {
        match self {
            Feature::Onset => 0.4,
            Feature::Percussive => 0.3,
            Feature::Rms => 0.15,
            Feature::Contrast => 0.08,
            Feature::Harmonic => 0.05,
            Feature::Centroid => 0.05,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|feature| feature.name() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Feature::ALL.iter().map(|f| f.name()).collect();
                format!("Unknown feature '{}'. Known features: {}", s, known.join(", "))
            })
    }
}

/// Independent smoothers created lazily, one per key.
#[derive(Clone, Debug)]
pub struct SmootherBank<K> {
    default_responsiveness: f32,
    overrides: HashMap<K, f32>,
    smoothers: HashMap<K, Smoother>,
}

pub type FeatureBank = SmootherBank<Feature>;

impl<K: Eq + Hash + Copy> SmootherBank<K> {
    /// # Panics
    /// Panics if `default_responsiveness` is not in `(0, 1]`.
    pub fn new(default_responsiveness: f32) -> Self {
        assert_responsiveness(default_responsiveness);
        Self {
            default_responsiveness,
            overrides: HashMap::new(),
            smoothers: HashMap::new(),
        }
    }

    /// Set the responsiveness for `key`. Only affects a key that has not
    /// been smoothed yet; responsiveness is fixed once a smoother exists.
    ///
    /// # Panics
    /// Panics if `responsiveness` is not in `(0, 1]`.
    pub fn with_override(mut self, key: K, responsiveness: f32) -> Self {
        assert_responsiveness(responsiveness);
        if self.smoothers.contains_key(&key) {
            log::warn!("Ignoring responsiveness override for a key already in use");
            return self;
        }
        self.overrides.insert(key, responsiveness);
        self
    }

    pub fn responsiveness_for(&self, key: K) -> f32 {
        self.overrides
            .get(&key)
            .copied()
            .unwrap_or(self.default_responsiveness)
    }

    pub fn smooth(&mut self, key: K, target: f32) -> f32 {
        let responsiveness = self.responsiveness_for(key);
        self.smoothers
            .entry(key)
            .or_insert_with(|| Smoother::new(responsiveness))
            .smooth(target)
    }

    /// Smooth a bundle of keyed inputs, returning outputs in input order.
    pub fn smooth_all<I>(&mut self, inputs: I) -> Vec<(K, f32)>
    where
        I: IntoIterator<Item = (K, f32)>,
    {
        inputs
            .into_iter()
            .map(|(key, target)| (key, self.smooth(key, target)))
            .collect()
    }

    /// Last smoothed value for `key`, if it has been seen
    pub fn get(&self, key: K) -> Option<f32> {
        self.smoothers.get(&key).and_then(Smoother::value)
    }

    /// Number of keys seen so far
    pub fn len(&self) -> usize {
        self.smoothers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.smoothers.is_empty()
    }
}

impl SmootherBank<Feature> {
    /// A bank where every feature uses its category default.
    pub fn tuned() -> Self {
        Feature::ALL
            .into_iter()
            .fold(Self::new(DEFAULT_RESPONSIVENESS), |bank, feature| {
                bank.with_override(feature, feature.default_responsiveness())
            })
    }

    /// Smooth every feature of `snapshot`.
    pub fn smooth_snapshot(&mut self, snapshot: &FrameSnapshot) -> SmoothedScalars {
        let mut out = SmoothedScalars::default();
        for feature in Feature::ALL {
            out.set(feature, self.smooth(feature, feature.value_of(snapshot)));
        }
        out
    }
}

impl<K: Eq + Hash + Copy> Default for SmootherBank<K> {
    fn default() -> Self {
        Self::new(DEFAULT_RESPONSIVENESS)
    }
}

/// Smoothed values for the full feature set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SmoothedScalars {
    pub rms: f32,
    pub centroid: f32,
    pub contrast: f32,
    pub onset: f32,
    pub harmonic: f32,
    pub percussive: f32,
}

impl SmoothedScalars {
    pub fn get(&self, feature: Feature) -> f32 {
        match feature {
            Feature::Rms => self.rms,
            Feature::Centroid => self.centroid,
            Feature::Contrast => self.contrast,
            Feature::Onset => self.onset,
            Feature::Harmonic => self.harmonic,
            Feature::Percussive => self.percussive,
        }
    }

    fn set(&mut self, feature: Feature, value: f32) {
        let slot = match feature {
            Feature::Rms => &mut self.rms,
            Feature::Centroid => &mut self.centroid,
            Feature::Contrast => &mut self.contrast,
            Feature::Onset => &mut self.onset,
            Feature::Harmonic => &mut self.harmonic,
            Feature::Percussive => &mut self.percussive,
        };
        *slot = value;
    }
}

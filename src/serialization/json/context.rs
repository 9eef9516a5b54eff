/// Optional behaviours of the GeoJSON encoder
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Leave the `crs` member out of every serialized geometry
    SuppressCrsSerialization,
}

impl Feature {
    fn mask(self) -> u32 {
        1 << (self as u32)
    }
}

/// Read-only set of encoder features, fixed for the duration of one encode call.
///
/// Examples
/// ```rust
/// use geoser::serialization::{Feature, SerializationContext};
///
/// let ctx = SerializationContext::new().with_feature(Feature::SuppressCrsSerialization);
/// assert!(ctx.is_feature_set(Feature::SuppressCrsSerialization));
/// assert!(!SerializationContext::default().is_feature_set(Feature::SuppressCrsSerialization));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SerializationContext {
    features: u32,
}

impl SerializationContext {
    /// A context with no feature set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feature(self, feature: Feature) -> Self {
        Self {
            features: self.features | feature.mask(),
        }
    }

    pub fn is_feature_set(&self, feature: Feature) -> bool {
        self.features & feature.mask() != 0
    }
}

impl FromIterator<Feature> for SerializationContext {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |ctx, feature| ctx.with_feature(feature))
    }
}

//! Fixed length classes for street centreline segments.

/// Increasing bucket boundaries in metres. Bucket `i` spans
/// `(BOUNDARIES[i], BOUNDARIES[i + 1]]`; the first bucket also includes
/// zero and the last one is open-ended so no measured length falls
/// outside every bucket.
pub const LENGTH_BUCKET_BOUNDARIES: [f64; 11] = [
    0.0, 56.0, 90.0, 117.0, 150.0, 195.0, 251.0, 331.0, 450.0, 708.0, 42_587.0,
];

/// One of the ten centreline length classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LengthBucket(u8);

impl LengthBucket {
    /// Number of buckets.
    pub const COUNT: usize = LENGTH_BUCKET_BOUNDARIES.len() - 1;

    /// All buckets, shortest first.
    pub fn all() -> impl Iterator<Item = Self> {
        #[allow(clippy::cast_possible_truncation)]
        (0..Self::COUNT).map(|i| Self(i as u8))
    }

    /// Returns the bucket at `index`, if in range.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        #[allow(clippy::cast_possible_truncation)]
        (index < Self::COUNT).then(|| Self(index as u8))
    }

    /// Zero-based position of this bucket.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Classifies a ground length in metres.
    ///
    /// Returns `None` only for negative or non-finite lengths.
    #[must_use]
    pub fn classify(length_m: f64) -> Option<Self> {
        if !length_m.is_finite() || length_m < 0.0 {
            return None;
        }
        let index = LENGTH_BUCKET_BOUNDARIES[1..Self::COUNT]
            .iter()
            .position(|upper| length_m <= *upper)
            .unwrap_or(Self::COUNT - 1);
        Self::from_index(index)
    }

    /// Whether `length_m` lies inside this bucket's range.
    #[must_use]
    pub fn contains(self, length_m: f64) -> bool {
        let lower = LENGTH_BUCKET_BOUNDARIES[self.index()];
        let upper = LENGTH_BUCKET_BOUNDARIES[self.index() + 1];
        let above_lower = if self.index() == 0 {
            length_m >= lower
        } else {
            length_m > lower
        };
        let below_upper = self.index() == Self::COUNT - 1 || length_m <= upper;
        above_lower && below_upper
    }

    /// Display label, e.g. `"57–90m"`.
    #[must_use]
    pub fn label(self) -> String {
        let lower = LENGTH_BUCKET_BOUNDARIES[self.index()];
        let upper = LENGTH_BUCKET_BOUNDARIES[self.index() + 1];
        format!("{}–{}m", lower + 1.0, upper)
    }

    /// Parses a label produced by [`Self::label`].
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().find(|bucket| bucket.label() == label)
    }
}

impl std::fmt::Display for LengthBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

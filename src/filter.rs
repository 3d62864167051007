//! Context dimensions that filter expressions can test

/// A filter key. `Other` stands for everything the style context does not
/// cache or forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Other,
    Zoom,
    Geometry,
}

impl FilterKey {
    /// Number of keys; sizes the style context's cache
    pub const COUNT: usize = 3;

    pub const ALL: [FilterKey; FilterKey::COUNT] =
        [FilterKey::Other, FilterKey::Zoom, FilterKey::Geometry];

    /// Slot in a `[_; FilterKey::COUNT]` cache
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            FilterKey::Other => "other",
            FilterKey::Zoom => "zoom",
            FilterKey::Geometry => "geometry",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_dense() {
        for (i, key) in FilterKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
        }
    }
}

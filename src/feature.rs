//! Map features as the style context sees them: a geometry tag and a bag of
//! scalar properties.

use std::fmt;

/// Geometry type of a feature. The integer codes are what gets cached as the
/// `geometry` filter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GeometryType {
    #[default]
    Unknown = 0,
    Points = 1,
    Lines = 2,
    Polygons = 3,
}

impl GeometryType {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<GeometryType> {
        match code {
            0 => Some(GeometryType::Unknown),
            1 => Some(GeometryType::Points),
            2 => Some(GeometryType::Lines),
            3 => Some(GeometryType::Polygons),
            _ => None,
        }
    }

    /// Name visible to scripts (`$geometry` / `geometry`)
    pub fn script_name(self) -> &'static str {
        match self {
            GeometryType::Unknown => "unknown",
            GeometryType::Points => "point",
            GeometryType::Lines => "line",
            GeometryType::Polygons => "polygon",
        }
    }
}

/// A property value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropValue {
    #[default]
    None,
    String(String),
    Number(f64),
}

impl PropValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::String(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::String(s)
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Number(n)
    }
}

impl From<i32> for PropValue {
    fn from(n: i32) -> Self {
        PropValue::Number(n as f64)
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::None => write!(f, "none"),
            PropValue::String(s) => write!(f, "{s:?}"),
            PropValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Feature properties, kept sorted by key. Keys are unique.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Properties {
    props: Vec<(String, PropValue)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, key: &str) -> Result<usize, usize> {
        self.props.binary_search_by(|(k, _)| k.as_str().cmp(key))
    }

    /// Insert or replace `key`
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        let key = key.into();
        let value = value.into();
        match self.find(&key) {
            Ok(i) => self.props[i].1 = value,
            Err(i) => self.props.insert(i, (key, value)),
        }
    }

    /// Value for `key`, `PropValue::None` when absent
    pub fn get(&self, key: &str) -> &PropValue {
        static NONE: PropValue = PropValue::None;
        match self.find(key) {
            Ok(i) => &self.props[i].1,
            Err(_) => &NONE,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key).as_str()
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key).as_number()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_ok()
    }

    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.find(key).ok().map(|i| self.props.remove(i).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn clear(&mut self) {
        self.props.clear();
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Properties::new();
        for (k, v) in iter {
            props.set(k, v);
        }
        props
    }
}

/// A map feature
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Feature {
    pub geometry_type: GeometryType,
    pub props: Properties,
}

impl Feature {
    pub fn new(geometry_type: GeometryType) -> Self {
        Feature {
            geometry_type,
            props: Properties::new(),
        }
    }

    pub fn with_props(geometry_type: GeometryType, props: Properties) -> Self {
        Feature { geometry_type, props }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_existing_key() {
        let mut props = Properties::new();
        props.set("kind", "park");
        props.set("kind", "forest");
        assert_eq!(props.len(), 1);
        assert_eq!(props.get_string("kind"), Some("forest"));
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let a: Properties = [("b", 2), ("a", 1)].into_iter().collect();
        let b: Properties = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(a, b);
        let keys: Vec<_> = a.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn typed_getters() {
        let mut props = Properties::new();
        props.set("name", "Main St");
        props.set("lanes", 4);
        assert_eq!(props.get_number("lanes"), Some(4.0));
        assert_eq!(props.get_string("lanes"), None);
        assert_eq!(props.get_string("name"), Some("Main St"));
        assert_eq!(props.get("missing"), &PropValue::None);
        assert!(!props.contains("missing"));
    }

    #[test]
    fn remove_returns_value() {
        let mut props = Properties::new();
        props.set("a", 1.5);
        assert_eq!(props.remove("a"), Some(PropValue::Number(1.5)));
        assert!(props.is_empty());
        assert_eq!(props.remove("a"), None);
    }

    #[test]
    fn geometry_codes_round_trip() {
        for geom in [
            GeometryType::Unknown,
            GeometryType::Points,
            GeometryType::Lines,
            GeometryType::Polygons,
        ] {
            assert_eq!(GeometryType::from_code(geom.code()), Some(geom));
        }
        assert_eq!(GeometryType::from_code(7), None);
        assert_eq!(GeometryType::Polygons.script_name(), "polygon");
    }
}

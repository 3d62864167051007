//! The typed style value every evaluation collapses into

use std::fmt;

use glam::Vec2;

use crate::types::{Color, SizeValue, Width};

/// Result of evaluating a style parameter.
///
/// `None` means nothing usable was produced. `Undefined` is a real answer:
/// the rule explicitly leaves the parameter unset.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StyleValue {
    #[default]
    None,
    Undefined,
    String(String),
    Bool(bool),
    Vec2(Vec2),
    Color(Color),
    Width(Width),
    Size(SizeValue),
    Float(f32),
    Uint(u32),
}

impl StyleValue {
    pub fn is_none(&self) -> bool {
        matches!(self, StyleValue::None)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, StyleValue::Undefined)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StyleValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<Vec2> {
        match self {
            StyleValue::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            StyleValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u32> {
        match self {
            StyleValue::Uint(u) => Some(*u),
            _ => None,
        }
    }
}

impl From<String> for StyleValue {
    fn from(s: String) -> Self {
        StyleValue::String(s)
    }
}

impl From<bool> for StyleValue {
    fn from(b: bool) -> Self {
        StyleValue::Bool(b)
    }
}

impl From<Vec2> for StyleValue {
    fn from(v: Vec2) -> Self {
        StyleValue::Vec2(v)
    }
}

impl From<Color> for StyleValue {
    fn from(c: Color) -> Self {
        StyleValue::Color(c)
    }
}

impl From<Width> for StyleValue {
    fn from(w: Width) -> Self {
        StyleValue::Width(w)
    }
}

impl From<SizeValue> for StyleValue {
    fn from(s: SizeValue) -> Self {
        StyleValue::Size(s)
    }
}

/// Stable textual form, e.g. `vec2(10, 20)` or `color(#ff0000ff)`
impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::None => write!(f, "none"),
            StyleValue::Undefined => write!(f, "undefined"),
            StyleValue::String(s) => write!(f, "{s:?}"),
            StyleValue::Bool(b) => write!(f, "{b}"),
            StyleValue::Vec2(v) => write!(f, "vec2({}, {})", v.x, v.y),
            StyleValue::Color(c) => write!(f, "color({c})"),
            StyleValue::Width(w) => write!(f, "width({w})"),
            StyleValue::Size(s) => write!(f, "size({s})"),
            StyleValue::Float(v) => write!(f, "float({v})"),
            StyleValue::Uint(u) => write!(f, "uint({u})"),
        }
    }
}

//! Style parameters: keys, typed values, and their string forms

pub mod key;
pub mod parse;
pub mod value;

pub use key::{ParamKind, StyleParamKey, UnknownStyleParam};
pub use parse::{parse_color, parse_string};
pub use value::StyleValue;

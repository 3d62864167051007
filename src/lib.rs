//! Scripted feature styling for tiled map renderers.
//!
//! A scene supplies small functions (`function () { return feature.kind == 'park'; }`)
//! that decide, per map feature, whether a draw rule applies and what a style
//! parameter should be. [`StyleContext`] runs those functions on an embedded
//! script engine and decodes whatever comes back into a typed [`StyleValue`].
//!
//! Two engines can sit behind the same interface, chosen by cargo feature:
//! `boa` (JavaScript) and `rhai`.
//!
//! ```ignore
//! use tilestyle::{Feature, GeometryType, StyleContext, StyleParamKey, StyleValue};
//!
//! let mut ctx = StyleContext::new()?;
//! ctx.set_functions(&["function () { return feature.name; }".to_string()]);
//!
//! let mut feature = Feature::new(GeometryType::Points);
//! feature.props.set("name", "Hello World!");
//! ctx.set_feature(&feature);
//!
//! let mut value = StyleValue::None;
//! assert!(ctx.eval_style(0, StyleParamKey::TextSource, &mut value));
//! ```

use pest_derive::Parser;

pub mod context;
pub mod defaults;
pub mod errors;
pub mod feature;
pub mod filter;
pub mod log;
pub mod scene;
pub mod script;
pub mod style;
pub mod types;

#[derive(Parser)]
#[grammar = "style.pest"]
pub struct StyleParser;

pub use context::{BackendKind, DynamicStyleContext, StyleContext, StyleContextBuilder};
pub use errors::{ScriptError, StyleContextError, StyleParseError};
pub use feature::{Feature, GeometryType, PropValue, Properties};
pub use filter::FilterKey;
pub use scene::{Scene, SceneNode};
pub use script::{FunctionIndex, ScriptContext};
pub use style::{StyleParamKey, StyleValue};
pub use types::{Color, ColorF, SizeValue, Unit, Width};

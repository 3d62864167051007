//! The style context: the one entry point the renderer talks to.
//!
//! [`StyleContext`] owns exactly one backend behind [`DynamicStyleContext`],
//! caches filter-key state so unchanged keys never reach the backend, and
//! keeps the zoom-derived pixel area scale used by area filters.

mod base;
pub mod decode;
pub mod globals;

pub use base::StyleContextBase;

use crate::defaults::{TILE_SIZE, meters_per_pixel};
use crate::errors::StyleContextError;
use crate::feature::Feature;
use crate::filter::FilterKey;
use crate::log::{error, info};
use crate::scene::{Scene, SceneNode};
use crate::script::FunctionIndex;
use crate::style::{StyleParamKey, StyleValue};

/// What the façade needs from a backend, independent of the engine
pub trait DynamicStyleContext {
    /// Seed globals and install functions for `scene`, once per scene id
    fn init_functions(&mut self, scene: &Scene);
    /// Replace all functions. True only if every one compiled.
    fn set_functions(&mut self, functions: &[String]) -> bool;
    /// Append one function at the next index
    fn add_function(&mut self, source: &str) -> bool;
    fn set_scene_globals(&mut self, globals: Option<&SceneNode>);
    fn set_filter_key(&mut self, key: FilterKey, value: i32);
    fn set_feature(&mut self, feature: &Feature);
    /// Detach the current feature
    fn clear(&mut self);
    fn eval_filter(&mut self, id: FunctionIndex) -> bool;
    /// Evaluate and decode into `value`; false iff `value` ends up `None`
    fn eval_style(&mut self, id: FunctionIndex, key: StyleParamKey, value: &mut StyleValue) -> bool;
}

/// Scripting engines that can back a style context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// JavaScript via Boa
    Boa,
    Rhai,
}

impl BackendKind {
    /// Kinds compiled into this build, preferred first
    pub const fn available() -> &'static [BackendKind] {
        &[
            #[cfg(feature = "boa")]
            BackendKind::Boa,
            #[cfg(feature = "rhai")]
            BackendKind::Rhai,
        ]
    }

    pub fn is_available(self) -> bool {
        Self::available().contains(&self)
    }

    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Boa => "boa",
            BackendKind::Rhai => "rhai",
        }
    }

    fn instantiate(self) -> Option<Box<dyn DynamicStyleContext>> {
        match self {
            #[cfg(feature = "boa")]
            BackendKind::Boa => Some(Box::new(
                StyleContextBase::<crate::script::boa::BoaContext>::default(),
            )),
            #[cfg(feature = "rhai")]
            BackendKind::Rhai => Some(Box::new(
                StyleContextBase::<crate::script::rhai::RhaiContext>::default(),
            )),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boa" => Ok(BackendKind::Boa),
            "rhai" => Ok(BackendKind::Rhai),
            _ => Err(format!("unknown backend: {s}")),
        }
    }
}

/// Configures a [`StyleContext`]
#[derive(Debug, Clone)]
pub struct StyleContextBuilder {
    backend: Option<BackendKind>,
    tile_size: f64,
}

impl Default for StyleContextBuilder {
    fn default() -> Self {
        StyleContextBuilder {
            backend: None,
            tile_size: TILE_SIZE,
        }
    }
}

impl StyleContextBuilder {
    /// Ask for a specific backend. If it is not compiled in, the build logs
    /// an error and uses the default one.
    pub fn backend(mut self, kind: BackendKind) -> Self {
        self.backend = Some(kind);
        self
    }

    /// Tile size in pixels for the pixel area scale
    pub fn tile_size(mut self, tile_size: f64) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn build(self) -> Result<StyleContext, StyleContextError> {
        let default = BackendKind::available().first().copied();
        let kind = match self.backend {
            Some(kind) if kind.is_available() => kind,
            Some(_kind) => {
                error!(backend = _kind.name(), "backend not compiled in, falling back");
                default.ok_or(StyleContextError::NoBackend)?
            }
            None => default.ok_or(StyleContextError::NoBackend)?,
        };
        let backend = kind.instantiate().ok_or(StyleContextError::NoBackend)?;
        info!(backend = kind.name(), "style context created");

        let mut ctx = StyleContext::from_backend(backend);
        ctx.backend_kind = Some(kind);
        ctx.tile_size = self.tile_size;
        Ok(ctx)
    }
}

/// Evaluates scene style functions against map features
pub struct StyleContext {
    backend: Box<dyn DynamicStyleContext>,
    backend_kind: Option<BackendKind>,
    /// `None` until a key is first set
    filter_keys: [Option<i32>; FilterKey::COUNT],
    zoom_level: i32,
    pixel_area_scale: f64,
    tile_size: f64,
}

impl StyleContext {
    /// Context on the default backend
    pub fn new() -> Result<Self, StyleContextError> {
        Self::builder().build()
    }

    pub fn builder() -> StyleContextBuilder {
        StyleContextBuilder::default()
    }

    /// Wrap an existing backend
    pub fn from_backend(backend: Box<dyn DynamicStyleContext>) -> Self {
        StyleContext {
            backend,
            backend_kind: None,
            filter_keys: [None; FilterKey::COUNT],
            zoom_level: 0,
            pixel_area_scale: 1.0,
            tile_size: TILE_SIZE,
        }
    }

    /// The engine in use, `None` for a backend passed to `from_backend`
    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.backend_kind
    }

    /// Install `feature` and update the geometry filter key from it
    pub fn set_feature(&mut self, feature: &Feature) {
        self.backend.set_feature(feature);
        self.set_filter_key(FilterKey::Geometry, feature.geometry_type.code());
    }

    pub fn set_filter_key(&mut self, key: FilterKey, value: i32) {
        if key == FilterKey::Other {
            return;
        }
        let slot = &mut self.filter_keys[key.index()];
        if *slot == Some(value) {
            return;
        }
        *slot = Some(value);

        if key == FilterKey::Zoom {
            self.zoom_level = value;
            // Area filters compare against pixels squared
            let mpp = meters_per_pixel(f64::from(value), self.tile_size);
            self.pixel_area_scale = mpp * mpp;
        }
        self.backend.set_filter_key(key, value);
    }

    /// Last value set for `key`
    pub fn get_filter_key(&self, key: FilterKey) -> Option<i32> {
        self.filter_keys[key.index()]
    }

    pub fn zoom_level(&self) -> i32 {
        self.zoom_level
    }

    pub fn pixel_area_scale(&self) -> f64 {
        self.pixel_area_scale
    }

    pub fn eval_filter(&mut self, id: FunctionIndex) -> bool {
        self.backend.eval_filter(id)
    }

    pub fn eval_style(&mut self, id: FunctionIndex, key: StyleParamKey, value: &mut StyleValue) -> bool {
        self.backend.eval_style(id, key, value)
    }

    pub fn init_functions(&mut self, scene: &Scene) {
        self.backend.init_functions(scene);
    }

    pub fn set_functions(&mut self, functions: &[String]) -> bool {
        self.backend.set_functions(functions)
    }

    pub fn add_function(&mut self, source: &str) -> bool {
        self.backend.add_function(source)
    }

    pub fn set_scene_globals(&mut self, globals: Option<&SceneNode>) {
        self.backend.set_scene_globals(globals);
    }

    pub fn clear(&mut self) {
        self.backend.clear();
    }
}

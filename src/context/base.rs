use super::DynamicStyleContext;
use super::decode::decode_value;
use super::globals::install_scene_globals;
use crate::feature::Feature;
use crate::filter::FilterKey;
use crate::log::{debug, warn};
use crate::scene::{Scene, SceneNode};
use crate::script::{FunctionIndex, ScriptContext, ScriptScope};
use crate::style::{StyleParamKey, StyleValue};

/// Style evaluation over any [`ScriptContext`]
pub struct StyleContextBase<C> {
    scene_id: Option<i32>,
    function_count: FunctionIndex,
    script: C,
}

impl<C: ScriptContext + Default> Default for StyleContextBase<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C: ScriptContext> StyleContextBase<C> {
    pub fn new(script: C) -> Self {
        StyleContextBase {
            scene_id: None,
            function_count: 0,
            script,
        }
    }

    pub fn script(&mut self) -> &mut C {
        &mut self.script
    }

    pub fn function_count(&self) -> FunctionIndex {
        self.function_count
    }
}

impl<C: ScriptContext> DynamicStyleContext for StyleContextBase<C> {
    fn init_functions(&mut self, scene: &Scene) {
        if self.scene_id == Some(scene.id) {
            return;
        }
        self.scene_id = Some(scene.id);
        debug!(scene = scene.id, functions = scene.functions.len(), "initializing scene functions");

        self.set_scene_globals(scene.global());
        self.set_functions(&scene.functions);
    }

    fn set_functions(&mut self, functions: &[String]) -> bool {
        let mut success = true;
        let mut index: FunctionIndex = 0;
        for source in functions {
            if let Err(_err) = self.script.set_function(index, source) {
                warn!(index, error = %_err, "failed to compile style function");
                success = false;
            }
            index += 1;
        }
        self.script.truncate_functions(index);
        self.function_count = index;
        success
    }

    fn add_function(&mut self, source: &str) -> bool {
        let index = self.function_count;
        self.function_count += 1;
        match self.script.set_function(index, source) {
            Ok(()) => true,
            Err(_err) => {
                warn!(index, error = %_err, "failed to compile style function");
                false
            }
        }
    }

    fn set_scene_globals(&mut self, globals: Option<&SceneNode>) {
        install_scene_globals(&mut self.script, globals);
    }

    fn set_filter_key(&mut self, key: FilterKey, value: i32) {
        self.script.set_filter_key(key, value);
    }

    fn set_feature(&mut self, feature: &Feature) {
        self.script.set_current_feature(Some(feature));
    }

    fn clear(&mut self) {
        self.script.set_current_feature(None);
    }

    fn eval_filter(&mut self, id: FunctionIndex) -> bool {
        let mut scope = ScriptScope::new(&mut self.script);
        scope.evaluate_boolean_function(id).unwrap_or_else(|_err| {
            warn!(function = id, error = %_err, "filter evaluation failed");
            false
        })
    }

    fn eval_style(&mut self, id: FunctionIndex, key: StyleParamKey, value: &mut StyleValue) -> bool {
        let mut scope = ScriptScope::new(&mut self.script);

        *value = match scope.function_result(id) {
            Ok(result) => decode_value(&mut *scope, result, key),
            Err(_err) => {
                warn!(function = id, key = key.name(), error = %_err, "style evaluation failed");
                StyleValue::None
            }
        };
        !value.is_none()
    }
}

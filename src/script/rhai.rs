//! Rhai backend.
//!
//! Scripts see the current feature as the object map `feature` and the filter
//! keys as `zoom` and `geometry`. `global` is a Rhai keyword, so scene globals
//! are bound to `globals` instead.
//!
//! A style function written as `function (...) { body }` runs `body` as a
//! script, which lets simple rule bodies work unchanged on both backends.
//! Function values in scene globals become named Rhai functions that every
//! style function compiled afterwards can reach through its `Fn` pointer.

use rhai::{AST, Array, Dynamic, Engine, INT, Map, Scope};

use super::{
    FunctionIndex, ScopeMarker, ScriptContext, ValueHandle, ValueKind, ValueStack,
    split_function_source,
};
use crate::defaults::{FEATURE_NAME, GLOBAL_NAME};
use crate::errors::ScriptError;
use crate::feature::{Feature, GeometryType, PropValue};
use crate::filter::FilterKey;

const SCENE_GLOBALS: &str = "globals";
const ZOOM: &str = "zoom";
const GEOMETRY: &str = "geometry";

/// Scope variable a global name is bound to
fn scope_name(name: &str) -> &str {
    if name == GLOBAL_NAME { SCENE_GLOBALS } else { name }
}

fn truthy(value: &Dynamic) -> bool {
    if let Ok(b) = value.as_bool() {
        b
    } else if value.is_unit() {
        false
    } else if let Ok(i) = value.as_int() {
        i != 0
    } else if let Ok(f) = value.as_float() {
        f != 0.0 && !f.is_nan()
    } else if value.is_string() {
        !value.clone().into_string().unwrap_or_default().is_empty()
    } else {
        true
    }
}

/// A Rhai engine with a persistent scope, the value stack and the compiled
/// style functions
pub struct RhaiContext {
    engine: Engine,
    scope: Scope<'static>,
    values: ValueStack<Dynamic>,
    functions: Vec<Option<AST>>,
    /// Definitions behind the installed scene globals' function values
    library: AST,
    /// Definitions created since the last install, keyed by the value
    /// holding their `Fn` pointer
    pending: Vec<(ValueHandle, AST)>,
    next_library_fn: usize,
}

impl Default for RhaiContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RhaiContext {
    pub fn new() -> Self {
        let mut scope = Scope::new();
        scope.push_dynamic(FEATURE_NAME, Dynamic::UNIT);
        scope.push_dynamic(ZOOM, Dynamic::UNIT);
        scope.push_dynamic(GEOMETRY, Dynamic::UNIT);
        scope.push_dynamic(SCENE_GLOBALS, Dynamic::UNIT);

        RhaiContext {
            engine: Engine::new(),
            scope,
            values: ValueStack::new(),
            functions: Vec::new(),
            library: AST::empty(),
            pending: Vec::new(),
            next_library_fn: 0,
        }
    }

    fn value(&self, handle: ValueHandle) -> Dynamic {
        self.values.get(handle).cloned().unwrap_or(Dynamic::UNIT)
    }

    /// Compile a style function; the result runs with the persistent scope
    fn compile_style_function(&self, source: &str) -> Result<AST, String> {
        let script = match split_function_source(source) {
            Some(function) => function.body,
            None => source,
        };
        let ast = self.engine.compile(script).map_err(|e| e.to_string())?;
        Ok(self.library.merge(&ast))
    }

    fn eval(&mut self, ast: &AST) -> Result<Dynamic, ScriptError> {
        let base = self.scope.len();
        let result = self.engine.eval_ast_with_scope::<Dynamic>(&mut self.scope, ast);
        self.scope.rewind(base);
        result.map_err(|e| ScriptError::Runtime {
            message: e.to_string(),
        })
    }
}

impl ScriptContext for RhaiContext {
    fn new_null(&mut self) -> ValueHandle {
        self.values.push(Dynamic::UNIT)
    }

    fn new_boolean(&mut self, value: bool) -> ValueHandle {
        self.values.push(Dynamic::from(value))
    }

    fn new_number(&mut self, value: f64) -> ValueHandle {
        self.values.push(Dynamic::from(value))
    }

    fn new_string(&mut self, value: &str) -> ValueHandle {
        self.values.push(Dynamic::from(value.to_string()))
    }

    fn new_array(&mut self) -> ValueHandle {
        self.values.push(Dynamic::from_array(Array::new()))
    }

    fn new_object(&mut self) -> ValueHandle {
        self.values.push(Dynamic::from_map(Map::new()))
    }

    fn new_function(&mut self, source: &str) -> Result<ValueHandle, ScriptError> {
        let function = split_function_source(source).ok_or(ScriptError::NotAFunction)?;
        let name = format!("scene_fn_{}", self.next_library_fn);
        let script = format!(
            "fn {name}({}) {{ {} }}\nFn(\"{name}\")",
            function.params, function.body
        );
        let ast = self
            .engine
            .compile(&script)
            .map_err(|e| ScriptError::Runtime {
                message: e.to_string(),
            })?;
        let pointer = self
            .engine
            .eval_ast::<Dynamic>(&ast)
            .map_err(|e| ScriptError::Runtime {
                message: e.to_string(),
            })?;
        if !pointer.is_fnptr() {
            return Err(ScriptError::NotAFunction);
        }
        self.next_library_fn += 1;
        let handle = self.values.push(pointer);
        self.pending.push((handle, ast.clone_functions_only()));
        Ok(handle)
    }

    fn set_value_at_index(&mut self, array: ValueHandle, index: usize, value: ValueHandle) {
        let value = self.value(value);
        let Some(array) = self.values.get_mut(array) else {
            return;
        };
        if let Some(mut array) = array.write_lock::<Array>() {
            if array.len() <= index {
                array.resize(index + 1, Dynamic::UNIT);
            }
            array[index] = value;
        }
    }

    fn set_value_for_property(&mut self, object: ValueHandle, name: &str, value: ValueHandle) {
        let value = self.value(value);
        let Some(object) = self.values.get_mut(object) else {
            return;
        };
        if let Some(mut map) = object.write_lock::<Map>() {
            map.insert(name.into(), value);
        }
    }

    fn kind(&mut self, value: ValueHandle) -> ValueKind {
        let value = self.value(value);
        if value.is_unit() {
            ValueKind::Undefined
        } else if value.is_bool() {
            ValueKind::Boolean
        } else if value.is_int() || value.is_float() {
            ValueKind::Number
        } else if value.is_string() || value.is_char() {
            ValueKind::String
        } else if value.is_array() {
            ValueKind::Array
        } else if value.is_fnptr() {
            ValueKind::Function
        } else {
            ValueKind::Object
        }
    }

    fn to_bool(&mut self, value: ValueHandle) -> bool {
        truthy(&self.value(value))
    }

    fn to_double(&mut self, value: ValueHandle) -> f64 {
        let value = self.value(value);
        if let Ok(f) = value.as_float() {
            f
        } else if let Ok(i) = value.as_int() {
            i as f64
        } else if let Ok(b) = value.as_bool() {
            if b { 1.0 } else { 0.0 }
        } else {
            f64::NAN
        }
    }

    fn to_string(&mut self, value: ValueHandle) -> String {
        let value = self.value(value);
        if value.is_string() {
            value.into_string().unwrap_or_default()
        } else {
            value.to_string()
        }
    }

    fn length(&mut self, value: ValueHandle) -> usize {
        self.values
            .get(value)
            .and_then(|v| v.read_lock::<Array>().map(|a| a.len()))
            .unwrap_or(0)
    }

    fn value_at_index(&mut self, array: ValueHandle, index: usize) -> ValueHandle {
        let element = self
            .values
            .get(array)
            .and_then(|v| v.read_lock::<Array>().and_then(|a| a.get(index).cloned()))
            .unwrap_or(Dynamic::UNIT);
        self.values.push(element)
    }

    fn set_global_value(&mut self, name: &str, value: ValueHandle) {
        if name == GLOBAL_NAME {
            // New scene globals replace the previous scene's definitions
            self.library = self
                .pending
                .drain(..)
                .fold(AST::empty(), |library, (_, ast)| library.merge(&ast));
            self.next_library_fn = 0;
        }
        let value = self.value(value);
        self.scope.set_value(scope_name(name).to_string(), value);
    }

    fn global_value(&mut self, name: &str) -> ValueHandle {
        let value = self
            .scope
            .get_value::<Dynamic>(scope_name(name))
            .unwrap_or(Dynamic::UNIT);
        self.values.push(value)
    }

    fn set_function(&mut self, index: FunctionIndex, source: &str) -> Result<(), ScriptError> {
        let slot = index as usize;
        if self.functions.len() <= slot {
            self.functions.resize(slot + 1, None);
        }
        self.functions[slot] = None;
        let ast = self
            .compile_style_function(source)
            .map_err(|message| ScriptError::Compile { index, message })?;
        self.functions[slot] = Some(ast);
        Ok(())
    }

    fn truncate_functions(&mut self, len: FunctionIndex) {
        self.functions.truncate(len as usize);
    }

    fn evaluate_boolean_function(&mut self, index: FunctionIndex) -> Result<bool, ScriptError> {
        let handle = self.function_result(index)?;
        Ok(truthy(&self.value(handle)))
    }

    fn function_result(&mut self, index: FunctionIndex) -> Result<ValueHandle, ScriptError> {
        let slot = index as usize;
        let ast = self
            .functions
            .get_mut(slot)
            .and_then(Option::take)
            .ok_or(ScriptError::UnknownFunction { index })?;
        let result = self.eval(&ast);
        self.functions[slot] = Some(ast);
        Ok(self.values.push(result?))
    }

    fn set_current_feature(&mut self, feature: Option<&Feature>) {
        let value = match feature {
            Some(feature) => {
                let map: Map = feature
                    .props
                    .iter()
                    .map(|(key, value)| {
                        let value = match value {
                            PropValue::None => Dynamic::UNIT,
                            PropValue::String(s) => Dynamic::from(s.clone()),
                            PropValue::Number(n) => Dynamic::from(*n),
                        };
                        (key.into(), value)
                    })
                    .collect();
                Dynamic::from_map(map)
            }
            None => Dynamic::UNIT,
        };
        self.scope.set_value(FEATURE_NAME, value);
    }

    fn set_filter_key(&mut self, key: FilterKey, value: i32) {
        match key {
            FilterKey::Zoom => {
                self.scope.set_value(ZOOM, value as INT);
            }
            FilterKey::Geometry => {
                let geometry = GeometryType::from_code(value).unwrap_or_default();
                self.scope
                    .set_value(GEOMETRY, geometry.script_name().to_string());
            }
            FilterKey::Other => {}
        }
    }

    fn scope_marker(&mut self) -> ScopeMarker {
        self.values.marker()
    }

    fn reset_to_scope_marker(&mut self, marker: ScopeMarker) {
        self.values.truncate(marker);
        self.pending.retain(|(handle, _)| handle.index() < marker.0);
    }
}

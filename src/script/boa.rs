//! JavaScript backend on top of Boa.
//!
//! The current feature is the global object `feature`, scene globals live
//! under `global`, and filter keys are the globals `$zoom` and `$geometry`.

use boa_engine::object::builtins::JsArray;
use boa_engine::{Context, JsError, JsObject, JsString, JsValue, Source, js_string};

use super::{FunctionIndex, ScopeMarker, ScriptContext, ValueHandle, ValueKind, ValueStack};
use crate::defaults::FEATURE_NAME;
use crate::errors::ScriptError;
use crate::feature::{Feature, GeometryType, PropValue};
use crate::filter::FilterKey;
use crate::log::warn;

fn runtime(err: JsError) -> ScriptError {
    ScriptError::Runtime {
        message: err.to_string(),
    }
}

/// A Boa context plus the value stack and function table the style context
/// addresses by index
pub struct BoaContext {
    context: Context,
    values: ValueStack<JsValue>,
    functions: Vec<Option<JsObject>>,
}

impl Default for BoaContext {
    fn default() -> Self {
        Self::new()
    }
}

impl BoaContext {
    pub fn new() -> Self {
        let mut ctx = BoaContext {
            context: Context::default(),
            values: ValueStack::new(),
            functions: Vec::new(),
        };
        ctx.set_global(FEATURE_NAME, JsValue::null());
        ctx
    }

    fn value(&self, handle: ValueHandle) -> JsValue {
        self.values
            .get(handle)
            .cloned()
            .unwrap_or_else(JsValue::undefined)
    }

    fn set_global(&mut self, name: &str, value: JsValue) {
        let global = self.context.global_object();
        if let Err(_err) = global.set(JsString::from(name), value, false, &mut self.context) {
            warn!(name, error = %_err, "failed to set global");
        }
    }

    /// Evaluate a function expression and return the callable object
    fn compile_function(&mut self, source: &str) -> Result<JsObject, ScriptError> {
        let value = self
            .context
            .eval(Source::from_bytes(&format!("({source})")))
            .map_err(runtime)?;
        if !value.is_callable() {
            return Err(ScriptError::NotAFunction);
        }
        value.to_object(&mut self.context).map_err(runtime)
    }

    fn array_object(&mut self, value: &JsValue) -> Option<JsObject> {
        if !value.is_object() {
            return None;
        }
        let object = value.to_object(&mut self.context).ok()?;
        object.is_array().then_some(object)
    }

    fn as_array(&mut self, handle: ValueHandle) -> Option<JsObject> {
        let value = self.value(handle);
        self.array_object(&value)
    }

    fn feature_object(&mut self, feature: &Feature) -> JsValue {
        let object = JsObject::with_object_proto(self.context.intrinsics());
        for (key, value) in feature.props.iter() {
            let value = match value {
                PropValue::None => JsValue::null(),
                PropValue::String(s) => JsValue::from(JsString::from(s.as_str())),
                PropValue::Number(n) => JsValue::from(*n),
            };
            if let Err(_err) = object.set(JsString::from(key), value, false, &mut self.context) {
                warn!(key, error = %_err, "failed to set feature property");
            }
        }
        JsValue::from(object)
    }
}

impl ScriptContext for BoaContext {
    fn new_null(&mut self) -> ValueHandle {
        self.values.push(JsValue::null())
    }

    fn new_boolean(&mut self, value: bool) -> ValueHandle {
        self.values.push(JsValue::from(value))
    }

    fn new_number(&mut self, value: f64) -> ValueHandle {
        self.values.push(JsValue::from(value))
    }

    fn new_string(&mut self, value: &str) -> ValueHandle {
        self.values.push(JsValue::from(JsString::from(value)))
    }

    fn new_array(&mut self) -> ValueHandle {
        let array = JsArray::new(&mut self.context);
        self.values.push(JsValue::from(array))
    }

    fn new_object(&mut self) -> ValueHandle {
        let object = JsObject::with_object_proto(self.context.intrinsics());
        self.values.push(JsValue::from(object))
    }

    fn new_function(&mut self, source: &str) -> Result<ValueHandle, ScriptError> {
        let function = self.compile_function(source)?;
        Ok(self.values.push(JsValue::from(function)))
    }

    fn set_value_at_index(&mut self, array: ValueHandle, index: usize, value: ValueHandle) {
        let value = self.value(value);
        if let Some(array) = self.as_array(array) {
            if let Err(_err) = array.set(index as u32, value, false, &mut self.context) {
                warn!(index, error = %_err, "failed to set array element");
            }
        }
    }

    fn set_value_for_property(&mut self, object: ValueHandle, name: &str, value: ValueHandle) {
        let value = self.value(value);
        let Ok(object) = self.value(object).to_object(&mut self.context) else {
            return;
        };
        if let Err(_err) = object.set(JsString::from(name), value, false, &mut self.context) {
            warn!(name, error = %_err, "failed to set object property");
        }
    }

    fn kind(&mut self, value: ValueHandle) -> ValueKind {
        let value = self.value(value);
        if value.is_undefined() {
            ValueKind::Undefined
        } else if value.is_null() {
            ValueKind::Null
        } else if value.is_boolean() {
            ValueKind::Boolean
        } else if value.is_number() {
            ValueKind::Number
        } else if value.is_string() {
            ValueKind::String
        } else if value.is_callable() {
            ValueKind::Function
        } else if self.array_object(&value).is_some() {
            ValueKind::Array
        } else {
            ValueKind::Object
        }
    }

    fn to_bool(&mut self, value: ValueHandle) -> bool {
        self.value(value).to_boolean()
    }

    fn to_double(&mut self, value: ValueHandle) -> f64 {
        self.value(value)
            .to_number(&mut self.context)
            .unwrap_or(f64::NAN)
    }

    fn to_string(&mut self, value: ValueHandle) -> String {
        self.value(value)
            .to_string(&mut self.context)
            .map(|s| s.to_std_string_escaped())
            .unwrap_or_default()
    }

    fn length(&mut self, value: ValueHandle) -> usize {
        let Some(array) = self.as_array(value) else {
            return 0;
        };
        array
            .get(js_string!("length"), &mut self.context)
            .and_then(|len| len.to_number(&mut self.context))
            .map(|len| len as usize)
            .unwrap_or(0)
    }

    fn value_at_index(&mut self, array: ValueHandle, index: usize) -> ValueHandle {
        let element = match self.as_array(array) {
            Some(array) => array
                .get(index as u32, &mut self.context)
                .unwrap_or_else(|_| JsValue::undefined()),
            None => JsValue::undefined(),
        };
        self.values.push(element)
    }

    fn set_global_value(&mut self, name: &str, value: ValueHandle) {
        let value = self.value(value);
        self.set_global(name, value);
    }

    fn global_value(&mut self, name: &str) -> ValueHandle {
        let global = self.context.global_object();
        let value = global
            .get(JsString::from(name), &mut self.context)
            .unwrap_or_else(|_| JsValue::undefined());
        self.values.push(value)
    }

    fn set_function(&mut self, index: FunctionIndex, source: &str) -> Result<(), ScriptError> {
        let slot = index as usize;
        if self.functions.len() <= slot {
            self.functions.resize(slot + 1, None);
        }
        self.functions[slot] = None;
        let function = self.compile_function(source).map_err(|err| match err {
            ScriptError::Runtime { message } => ScriptError::Compile { index, message },
            other => other,
        })?;
        self.functions[slot] = Some(function);
        Ok(())
    }

    fn truncate_functions(&mut self, len: FunctionIndex) {
        self.functions.truncate(len as usize);
    }

    fn evaluate_boolean_function(&mut self, index: FunctionIndex) -> Result<bool, ScriptError> {
        let handle = self.function_result(index)?;
        let result = self.value(handle).to_boolean();
        Ok(result)
    }

    fn function_result(&mut self, index: FunctionIndex) -> Result<ValueHandle, ScriptError> {
        let function = self
            .functions
            .get(index as usize)
            .cloned()
            .flatten()
            .ok_or(ScriptError::UnknownFunction { index })?;
        let result = function
            .call(&JsValue::undefined(), &[], &mut self.context)
            .map_err(runtime)?;
        Ok(self.values.push(result))
    }

    fn set_current_feature(&mut self, feature: Option<&Feature>) {
        let value = match feature {
            Some(feature) => self.feature_object(feature),
            None => JsValue::null(),
        };
        self.set_global(FEATURE_NAME, value);
    }

    fn set_filter_key(&mut self, key: FilterKey, value: i32) {
        match key {
            FilterKey::Zoom => self.set_global("$zoom", JsValue::from(value)),
            FilterKey::Geometry => {
                let geometry = GeometryType::from_code(value).unwrap_or_default();
                self.set_global("$geometry", JsValue::from(JsString::from(geometry.script_name())));
            }
            FilterKey::Other => {}
        }
    }

    fn scope_marker(&mut self) -> ScopeMarker {
        self.values.marker()
    }

    fn reset_to_scope_marker(&mut self, marker: ScopeMarker) {
        self.values.truncate(marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ScriptScope;

    #[test]
    fn function_sees_feature_properties() {
        let mut ctx = BoaContext::new();
        ctx.set_function(0, "function () { return feature.kind + '!'; }")
            .unwrap();

        let mut feature = Feature::new(GeometryType::Polygons);
        feature.props.set("kind", "park");
        ctx.set_current_feature(Some(&feature));

        let result = ctx.function_result(0).unwrap();
        assert_eq!(ctx.kind(result), ValueKind::String);
        assert_eq!(ctx.to_string(result), "park!");
    }

    #[test]
    fn compile_errors_name_the_index() {
        let mut ctx = BoaContext::new();
        let err = ctx.set_function(3, "function ( {").unwrap_err();
        assert!(matches!(err, ScriptError::Compile { index: 3, .. }));
        assert_eq!(
            ctx.set_function(4, "42").unwrap_err(),
            ScriptError::NotAFunction
        );
        assert_eq!(
            ctx.function_result(3).unwrap_err(),
            ScriptError::UnknownFunction { index: 3 }
        );
    }

    #[test]
    fn filter_globals() {
        let mut ctx = BoaContext::new();
        ctx.set_filter_key(FilterKey::Zoom, 14);
        ctx.set_filter_key(FilterKey::Geometry, GeometryType::Lines.code());
        ctx.set_function(0, "function () { return $zoom > 10 && $geometry == 'line'; }")
            .unwrap();
        assert_eq!(ctx.evaluate_boolean_function(0), Ok(true));
    }

    #[test]
    fn arrays_and_scopes() {
        let mut ctx = BoaContext::new();
        let outer = ctx.scope_marker();
        {
            let mut scope = ScriptScope::new(&mut ctx);
            let array = scope.new_array();
            let a = scope.new_number(10.0);
            let b = scope.new_string("x");
            scope.set_value_at_index(array, 0, a);
            scope.set_value_at_index(array, 1, b);
            assert_eq!(scope.kind(array), ValueKind::Array);
            assert_eq!(scope.length(array), 2);
            let first = scope.value_at_index(array, 0);
            assert_eq!(scope.to_double(first), 10.0);
        }
        assert_eq!(ctx.scope_marker(), outer);
    }
}

//! The contract a scripting engine must satisfy to run style functions.
//!
//! Backends hand out [`ValueHandle`]s into a [`ValueStack`] instead of
//! engine-native references. A [`ScopeMarker`] records the stack height;
//! resetting to it invalidates everything created since, which is what
//! [`ScriptScope`] does on drop.

use crate::errors::ScriptError;
use crate::feature::Feature;
use crate::filter::FilterKey;

#[cfg(feature = "boa")]
pub mod boa;
#[cfg(feature = "rhai")]
pub mod rhai;
mod scope;

pub use scope::ScriptScope;

/// Position of a function in the scene's function list
pub type FunctionIndex = u32;

/// A value living in a backend's value stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueHandle(u32);

impl ValueHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Stack height captured by [`ScriptContext::scope_marker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScopeMarker(usize);

/// Runtime type of a script value, as far as decoding cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
    Function,
}

/// Arena of engine values addressed by [`ValueHandle`]
#[derive(Debug)]
pub struct ValueStack<T> {
    values: Vec<T>,
}

impl<T> Default for ValueStack<T> {
    fn default() -> Self {
        ValueStack { values: Vec::new() }
    }
}

impl<T> ValueStack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: T) -> ValueHandle {
        let handle = ValueHandle(self.values.len() as u32);
        self.values.push(value);
        handle
    }

    /// `None` once the handle has been invalidated by a scope reset
    pub fn get(&self, handle: ValueHandle) -> Option<&T> {
        self.values.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: ValueHandle) -> Option<&mut T> {
        self.values.get_mut(handle.index())
    }

    pub fn marker(&self) -> ScopeMarker {
        ScopeMarker(self.values.len())
    }

    pub fn truncate(&mut self, marker: ScopeMarker) {
        self.values.truncate(marker.0);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Capabilities the style context needs from a scripting engine.
///
/// Accessors take `&mut self` because engines commonly need their context to
/// convert or inspect values. Reading through an invalidated handle yields
/// the engine's undefined value.
pub trait ScriptContext {
    fn new_null(&mut self) -> ValueHandle;
    fn new_boolean(&mut self, value: bool) -> ValueHandle;
    fn new_number(&mut self, value: f64) -> ValueHandle;
    fn new_string(&mut self, value: &str) -> ValueHandle;
    fn new_array(&mut self) -> ValueHandle;
    fn new_object(&mut self) -> ValueHandle;
    /// Compile `source` into a function value
    fn new_function(&mut self, source: &str) -> Result<ValueHandle, ScriptError>;

    fn set_value_at_index(&mut self, array: ValueHandle, index: usize, value: ValueHandle);
    fn set_value_for_property(&mut self, object: ValueHandle, name: &str, value: ValueHandle);

    fn kind(&mut self, value: ValueHandle) -> ValueKind;
    /// Script truthiness
    fn to_bool(&mut self, value: ValueHandle) -> bool;
    fn to_double(&mut self, value: ValueHandle) -> f64;
    fn to_string(&mut self, value: ValueHandle) -> String;
    /// Element count of an array, 0 for anything else
    fn length(&mut self, value: ValueHandle) -> usize;
    fn value_at_index(&mut self, array: ValueHandle, index: usize) -> ValueHandle;

    fn set_global_value(&mut self, name: &str, value: ValueHandle);
    fn global_value(&mut self, name: &str) -> ValueHandle;

    /// Compile `source` and bind it to `index`, replacing whatever was there
    fn set_function(&mut self, index: FunctionIndex, source: &str) -> Result<(), ScriptError>;
    /// Drop every function at `len` and beyond
    fn truncate_functions(&mut self, len: FunctionIndex);
    fn evaluate_boolean_function(&mut self, index: FunctionIndex) -> Result<bool, ScriptError>;
    fn function_result(&mut self, index: FunctionIndex) -> Result<ValueHandle, ScriptError>;

    /// Expose `feature` to scripts, or remove it with `None`
    fn set_current_feature(&mut self, feature: Option<&Feature>);
    fn set_filter_key(&mut self, key: FilterKey, value: i32);

    fn scope_marker(&mut self) -> ScopeMarker;
    fn reset_to_scope_marker(&mut self, marker: ScopeMarker);
}

/// Shape of a `function (args) { body }` source, split into its parts
pub(crate) struct FunctionSource<'a> {
    pub params: &'a str,
    pub body: &'a str,
}

/// Split a JavaScript style function expression. Returns `None` when
/// `source` is not of the form `function [name] (params) { body }`.
pub(crate) fn split_function_source(source: &str) -> Option<FunctionSource<'_>> {
    let rest = source.trim().strip_prefix("function")?;
    if !rest.starts_with(|c: char| c.is_whitespace() || c == '(') {
        return None;
    }
    let open = rest.find('(')?;
    if !rest[..open].trim().chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    let close = open + rest[open..].find(')')?;
    let params = rest[open + 1..close].trim();
    let body = rest[close + 1..].trim();
    let body = body.strip_prefix('{')?.strip_suffix('}')?;
    Some(FunctionSource { params, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_stack_truncates_to_marker() {
        let mut stack = ValueStack::new();
        let kept = stack.push("kept");
        let marker = stack.marker();
        let dropped = stack.push("dropped");
        assert_eq!(stack.get(dropped), Some(&"dropped"));

        stack.truncate(marker);
        assert_eq!(stack.get(kept), Some(&"kept"));
        assert_eq!(stack.get(dropped), None);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn split_anonymous_function() {
        let f = split_function_source("function () { return feature.name; }").unwrap();
        assert_eq!(f.params, "");
        assert_eq!(f.body.trim(), "return feature.name;");
    }

    #[test]
    fn split_named_function_with_params() {
        let f = split_function_source("function scale(a, b) {a * b}").unwrap();
        assert_eq!(f.params, "a, b");
        assert_eq!(f.body, "a * b");
    }

    #[test]
    fn split_rejects_non_functions() {
        assert!(split_function_source("feature.name").is_none());
        assert!(split_function_source("functional() { 1 }").is_none());
        assert!(split_function_source("function () return 1").is_none());
    }
}

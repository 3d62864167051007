use std::ops::{Deref, DerefMut};

use super::{ScopeMarker, ScriptContext};

/// Bracket around a run of value constructions.
///
/// Takes a scope marker on creation and resets the context to it when
/// dropped, on every exit path. Values created through the guard must not be
/// used after it goes away.
pub struct ScriptScope<'a, C: ScriptContext + ?Sized> {
    context: &'a mut C,
    marker: ScopeMarker,
}

impl<'a, C: ScriptContext + ?Sized> ScriptScope<'a, C> {
    pub fn new(context: &'a mut C) -> Self {
        let marker = context.scope_marker();
        ScriptScope { context, marker }
    }
}

impl<C: ScriptContext + ?Sized> Deref for ScriptScope<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.context
    }
}

impl<C: ScriptContext + ?Sized> DerefMut for ScriptScope<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.context
    }
}

impl<C: ScriptContext + ?Sized> Drop for ScriptScope<'_, C> {
    fn drop(&mut self) {
        self.context.reset_to_scope_marker(self.marker);
    }
}

//! Scene globals: the declarative `global` tree turned into script values

use crate::defaults::GLOBAL_NAME;
use crate::log::debug;
use crate::scene::SceneNode;
use crate::script::{ScriptContext, ScriptScope, ValueHandle};

/// Scalars with this prefix are tried as function sources first
const FUNCTION_PREFIX: &str = "function";

fn push_scalar<C: ScriptContext + ?Sized>(
    ctx: &mut C,
    node: &SceneNode,
    scalar: &str,
) -> ValueHandle {
    if scalar.starts_with(FUNCTION_PREFIX) {
        return match ctx.new_function(scalar) {
            Ok(function) => function,
            Err(_err) => {
                debug!(error = %_err, "scene global kept as string");
                ctx.new_string(scalar)
            }
        };
    }
    if let Some(b) = node.as_bool() {
        ctx.new_boolean(b)
    } else if let Some(n) = node.as_f64() {
        ctx.new_number(n)
    } else {
        ctx.new_string(scalar)
    }
}

/// Convert `node` into a native value. Children are complete before they
/// are attached to their parent.
pub fn push_scene_node<C: ScriptContext + ?Sized>(ctx: &mut C, node: &SceneNode) -> ValueHandle {
    match node {
        SceneNode::Scalar(scalar) => push_scalar(ctx, node, scalar),
        SceneNode::Sequence(items) => {
            let array = ctx.new_array();
            for (i, item) in items.iter().enumerate() {
                let value = push_scene_node(ctx, item);
                ctx.set_value_at_index(array, i, value);
            }
            array
        }
        SceneNode::Map(entries) => {
            let object = ctx.new_object();
            for (key, value) in entries {
                // Only scalar keys can name a property
                let Some(key) = key.as_scalar() else {
                    continue;
                };
                let value = push_scene_node(ctx, value);
                ctx.set_value_for_property(object, key, value);
            }
            object
        }
        SceneNode::Null => ctx.new_null(),
    }
}

/// Install `globals` under the global name. Absent or null trees are ignored.
pub fn install_scene_globals<C: ScriptContext + ?Sized>(
    ctx: &mut C,
    globals: Option<&SceneNode>,
) {
    let Some(globals) = globals.filter(|g| !g.is_null()) else {
        return;
    };
    let mut scope = ScriptScope::new(ctx);
    let value = push_scene_node(&mut *scope, globals);
    scope.set_global_value(GLOBAL_NAME, value);
}

//! Scene references: an id, the declarative config tree, and the ordered list
//! of function sources whose positions are their function indices.

use std::sync::atomic::{AtomicI32, Ordering};

use pest::Parser;

use crate::{Rule, StyleParser};

/// A node of the declarative scene config.
///
/// Scalars are kept as written; interpretation (boolean, number, function,
/// string) happens when they are handed to a script backend.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SceneNode {
    #[default]
    Null,
    Scalar(String),
    Sequence(Vec<SceneNode>),
    /// Entries in document order. Keys may be any node; only scalar keys can
    /// become script object properties.
    Map(Vec<(SceneNode, SceneNode)>),
}

impl SceneNode {
    pub fn scalar(s: impl Into<String>) -> Self {
        SceneNode::Scalar(s.into())
    }

    pub fn sequence(items: impl IntoIterator<Item = SceneNode>) -> Self {
        SceneNode::Sequence(items.into_iter().collect())
    }

    /// Map with scalar keys
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, SceneNode)>) -> Self {
        SceneNode::Map(
            entries
                .into_iter()
                .map(|(k, v)| (SceneNode::Scalar(k.into()), v))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SceneNode::Null)
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            SceneNode::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a scalar key in a map node
    pub fn get(&self, key: &str) -> Option<&SceneNode> {
        match self {
            SceneNode::Map(entries) => entries
                .iter()
                .find(|(k, _)| k.as_scalar() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// The scalar read as a boolean literal (`true`, `no`, `On`, ...)
    pub fn as_bool(&self) -> Option<bool> {
        let scalar = self.as_scalar()?;
        let pair = StyleParser::parse(Rule::yaml_bool, scalar).ok()?.next()?;
        let word = pair.into_inner().next()?;
        Some(word.as_rule() == Rule::true_word)
    }

    /// The scalar read as a numeric literal
    pub fn as_f64(&self) -> Option<f64> {
        let scalar = self.as_scalar()?;
        StyleParser::parse(Rule::number_literal, scalar).ok()?;
        scalar.trim().parse().ok()
    }
}

impl From<&str> for SceneNode {
    fn from(s: &str) -> Self {
        SceneNode::Scalar(s.to_string())
    }
}

static NEXT_SCENE_ID: AtomicI32 = AtomicI32::new(0);

/// A loaded scene, as far as styling is concerned
#[derive(Debug, Clone)]
pub struct Scene {
    pub id: i32,
    pub config: SceneNode,
    pub functions: Vec<String>,
}

impl Scene {
    /// New scene with a process-unique id
    pub fn new(config: SceneNode, functions: Vec<String>) -> Self {
        let id = NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed);
        Scene { id, config, functions }
    }

    pub fn with_id(id: i32, config: SceneNode, functions: Vec<String>) -> Self {
        Scene { id, config, functions }
    }

    /// The `global` subtree of the config, if there is one
    pub fn global(&self) -> Option<&SceneNode> {
        self.config.get(crate::defaults::GLOBAL_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_bool_literals() {
        assert_eq!(SceneNode::scalar("true").as_bool(), Some(true));
        assert_eq!(SceneNode::scalar("Off").as_bool(), Some(false));
        assert_eq!(SceneNode::scalar("truthy").as_bool(), None);
        assert_eq!(SceneNode::sequence([]).as_bool(), None);
    }

    #[test]
    fn scalar_number_literals() {
        assert_eq!(SceneNode::scalar("1.5").as_f64(), Some(1.5));
        assert_eq!(SceneNode::scalar(" -3 ").as_f64(), Some(-3.0));
        assert_eq!(SceneNode::scalar("1e2").as_f64(), Some(100.0));
        assert_eq!(SceneNode::scalar("12px").as_f64(), None);
        assert_eq!(SceneNode::scalar("").as_f64(), None);
    }

    #[test]
    fn map_lookup_skips_non_scalar_keys() {
        let node = SceneNode::Map(vec![
            (SceneNode::sequence([SceneNode::scalar("a")]), SceneNode::scalar("x")),
            (SceneNode::scalar("a"), SceneNode::scalar("y")),
        ]);
        assert_eq!(node.get("a"), Some(&SceneNode::scalar("y")));
        assert_eq!(node.get("b"), None);
    }

    #[test]
    fn scene_ids_are_unique() {
        let a = Scene::new(SceneNode::Null, vec![]);
        let b = Scene::new(SceneNode::Null, vec![]);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn scene_global_subtree() {
        let scene = Scene::with_id(
            7,
            SceneNode::map([("global", SceneNode::map([("pi", SceneNode::scalar("3.14"))]))]),
            vec![],
        );
        assert_eq!(scene.global().and_then(|g| g.get("pi")), Some(&SceneNode::scalar("3.14")));
        assert!(Scene::with_id(8, SceneNode::Null, vec![]).global().is_none());
    }
}

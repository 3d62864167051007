//! End-to-end behavior of [`StyleContext`] on every compiled backend.

use insta::assert_snapshot;
use tilestyle::{
    BackendKind, Feature, FilterKey, GeometryType, Scene, SceneNode, StyleContext, StyleParamKey,
    StyleValue,
};

fn context(kind: BackendKind) -> StyleContext {
    let ctx = StyleContext::builder().backend(kind).build().unwrap();
    assert_eq!(ctx.backend_kind(), Some(kind));
    ctx
}

fn sources(functions: &[&str]) -> Vec<String> {
    functions.iter().map(|f| f.to_string()).collect()
}

fn eval(ctx: &mut StyleContext, id: u32, key: StyleParamKey) -> StyleValue {
    let mut value = StyleValue::None;
    let decoded = ctx.eval_style(id, key, &mut value);
    assert_eq!(decoded, !value.is_none());
    value
}

fn park() -> Feature {
    let mut feature = Feature::new(GeometryType::Polygons);
    feature.props.set("kind", "park");
    feature.props.set("name", "Hello World!");
    feature.props.set("height", 30);
    feature
}

/// Name of the scene globals object inside scripts
fn globals_name(kind: BackendKind) -> &'static str {
    match kind {
        BackendKind::Boa => "global",
        BackendKind::Rhai => "globals",
    }
}

fn decodes_feature_properties(kind: BackendKind) {
    let mut ctx = context(kind);
    assert!(ctx.set_functions(&sources(&[
        "function () { return feature.name; }",
        "function () { return feature.height; }",
        "function () { return feature.missing; }",
    ])));
    ctx.set_feature(&park());

    assert_snapshot!(eval(&mut ctx, 0, StyleParamKey::TextSource), @r#""Hello World!""#);
    assert_snapshot!(eval(&mut ctx, 1, StyleParamKey::Extrude), @"vec2(0, 30)");
    assert_snapshot!(eval(&mut ctx, 1, StyleParamKey::TextSource), @r#""30""#);
    assert_snapshot!(eval(&mut ctx, 1, StyleParamKey::Order), @"uint(30)");
    assert_snapshot!(eval(&mut ctx, 2, StyleParamKey::TextSource), @"undefined");
}

fn decodes_literals(kind: BackendKind) {
    let mut ctx = context(kind);
    assert!(ctx.set_functions(&sources(&[
        "function () { return true; }",
        "function () { return [10, 20]; }",
        "function () { return [10]; }",
        "function () { return \"red\"; }",
        "function () { return \"#ff0000\"; }",
    ])));
    ctx.set_feature(&park());

    assert_snapshot!(eval(&mut ctx, 0, StyleParamKey::Extrude), @"vec2(NaN, NaN)");
    assert_snapshot!(eval(&mut ctx, 0, StyleParamKey::Visible), @"true");
    assert_snapshot!(eval(&mut ctx, 1, StyleParamKey::Extrude), @"vec2(10, 20)");
    assert_snapshot!(eval(&mut ctx, 2, StyleParamKey::Extrude), @"none");
    assert_snapshot!(eval(&mut ctx, 3, StyleParamKey::Color), @"none");
    assert_snapshot!(eval(&mut ctx, 4, StyleParamKey::Color), @"color(#ff0000ff)");
    // A string where a flag is expected goes through the style parser
    assert_snapshot!(eval(&mut ctx, 3, StyleParamKey::Visible), @"none");
}

fn filters_on_properties(kind: BackendKind) {
    let mut ctx = context(kind);
    assert!(ctx.set_functions(&sources(&[
        "function () { return feature.kind == \"park\"; }",
    ])));

    ctx.set_feature(&park());
    assert!(ctx.eval_filter(0));

    let mut road = Feature::new(GeometryType::Lines);
    road.props.set("kind", "road");
    ctx.set_feature(&road);
    assert!(!ctx.eval_filter(0));
    assert_eq!(ctx.get_filter_key(FilterKey::Geometry), Some(GeometryType::Lines.code()));
}

fn filters_on_zoom_and_geometry(kind: BackendKind) {
    let source = match kind {
        BackendKind::Boa => "function () { return $zoom >= 14 && $geometry == \"polygon\"; }",
        BackendKind::Rhai => "function () { return zoom >= 14 && geometry == \"polygon\"; }",
    };
    let mut ctx = context(kind);
    assert!(ctx.set_functions(&sources(&[source])));

    ctx.set_filter_key(FilterKey::Zoom, 15);
    ctx.set_feature(&park());
    assert!(ctx.eval_filter(0));

    ctx.set_filter_key(FilterKey::Zoom, 10);
    assert!(!ctx.eval_filter(0));
    assert_eq!(ctx.zoom_level(), 10);

    ctx.set_filter_key(FilterKey::Zoom, 14);
    ctx.set_feature(&Feature::new(GeometryType::Points));
    assert!(!ctx.eval_filter(0));
}

fn one_bad_function_keeps_the_rest(kind: BackendKind) {
    let mut ctx = context(kind);
    assert!(!ctx.set_functions(&sources(&[
        "function () { return 1; }",
        "function ( {",
        "function () { return 3; }",
    ])));
    ctx.set_feature(&park());

    assert_snapshot!(eval(&mut ctx, 0, StyleParamKey::Order), @"uint(1)");
    assert_snapshot!(eval(&mut ctx, 1, StyleParamKey::Order), @"none");
    assert_snapshot!(eval(&mut ctx, 2, StyleParamKey::Order), @"uint(3)");
    assert!(!ctx.eval_filter(1));
    assert!(!ctx.eval_filter(7));
}

fn add_function_appends(kind: BackendKind) {
    let mut ctx = context(kind);
    assert!(ctx.set_functions(&sources(&["function () { return 1; }"])));
    assert!(ctx.add_function("function () { return 2; }"));
    ctx.set_feature(&park());
    assert_snapshot!(eval(&mut ctx, 1, StyleParamKey::Priority), @"uint(2)");
}

fn scene_globals_are_visible(kind: BackendKind) {
    let name = globals_name(kind);
    let scene = Scene::with_id(
        1,
        SceneNode::map([(
            "global",
            SceneNode::map([
                ("icon", SceneNode::scalar("pin")),
                ("base", SceneNode::scalar("10")),
                ("flag", SceneNode::scalar("yes")),
            ]),
        )]),
        vec![
            format!("function () {{ return {name}.icon; }}"),
            format!("function () {{ return {name}.base; }}"),
            format!("function () {{ return {name}.flag; }}"),
        ],
    );

    let mut ctx = context(kind);
    ctx.init_functions(&scene);
    ctx.set_feature(&park());

    assert_snapshot!(eval(&mut ctx, 0, StyleParamKey::Sprite), @r#""pin""#);
    assert_snapshot!(eval(&mut ctx, 1, StyleParamKey::Order), @"uint(10)");
    assert_snapshot!(eval(&mut ctx, 2, StyleParamKey::Interactive), @"true");
}

fn scene_functions_replace_on_new_scene(kind: BackendKind) {
    let first = Scene::with_id(
        1,
        SceneNode::Null,
        sources(&["function () { return 1; }"]),
    );
    let second = Scene::with_id(
        2,
        SceneNode::Null,
        sources(&["function () { return 2; }"]),
    );

    let mut ctx = context(kind);
    ctx.init_functions(&first);
    ctx.set_feature(&park());
    assert_snapshot!(eval(&mut ctx, 0, StyleParamKey::Order), @"uint(1)");

    // Same id again is a no-op, even with different contents
    let again = Scene::with_id(1, SceneNode::Null, sources(&["function () { return 9; }"]));
    ctx.init_functions(&again);
    assert_snapshot!(eval(&mut ctx, 0, StyleParamKey::Order), @"uint(1)");

    ctx.init_functions(&second);
    assert_snapshot!(eval(&mut ctx, 0, StyleParamKey::Order), @"uint(2)");
}

fn scene_globals_replace_on_new_scene(kind: BackendKind) {
    let name = globals_name(kind);
    let scene = |id: i32, n: &str| {
        Scene::with_id(
            id,
            SceneNode::map([("global", SceneNode::map([("n", SceneNode::scalar(n))]))]),
            vec![format!("function () {{ return {name}.n; }}")],
        )
    };

    let mut ctx = context(kind);
    ctx.set_feature(&park());
    ctx.init_functions(&scene(1, "1"));
    assert_snapshot!(eval(&mut ctx, 0, StyleParamKey::Order), @"uint(1)");

    ctx.init_functions(&scene(2, "2"));
    assert_snapshot!(eval(&mut ctx, 0, StyleParamKey::Order), @"uint(2)");
}

fn set_functions_replaces_prior_set(kind: BackendKind) {
    let mut ctx = context(kind);
    assert!(ctx.set_functions(&sources(&[
        "function () { return 1; }",
        "function () { return 2; }",
        "function () { return 3; }",
    ])));
    assert!(ctx.set_functions(&sources(&["function () { return 9; }"])));
    ctx.set_feature(&park());

    assert_snapshot!(eval(&mut ctx, 0, StyleParamKey::Order), @"uint(9)");
    assert_snapshot!(eval(&mut ctx, 2, StyleParamKey::Order), @"none");
}

fn clear_detaches_the_feature(kind: BackendKind) {
    let mut ctx = context(kind);
    assert!(ctx.set_functions(&sources(&["function () { return feature.name; }"])));
    ctx.set_feature(&park());
    assert_snapshot!(eval(&mut ctx, 0, StyleParamKey::TextSource), @r#""Hello World!""#);

    ctx.clear();
    // Without a feature the property access fails or yields nothing
    let value = eval(&mut ctx, 0, StyleParamKey::TextSource);
    assert!(value.is_none() || value.is_undefined(), "got {value}");
}

macro_rules! backend_tests {
    ($module:ident, $feature:literal, $kind:expr) => {
        #[cfg(feature = $feature)]
        mod $module {
            use super::*;

            #[test]
            fn decodes_feature_properties() {
                insta::allow_duplicates! { super::decodes_feature_properties($kind) }
            }

            #[test]
            fn decodes_literals() {
                insta::allow_duplicates! { super::decodes_literals($kind) }
            }

            #[test]
            fn filters_on_properties() {
                insta::allow_duplicates! { super::filters_on_properties($kind) }
            }

            #[test]
            fn filters_on_zoom_and_geometry() {
                insta::allow_duplicates! { super::filters_on_zoom_and_geometry($kind) }
            }

            #[test]
            fn one_bad_function_keeps_the_rest() {
                insta::allow_duplicates! { super::one_bad_function_keeps_the_rest($kind) }
            }

            #[test]
            fn add_function_appends() {
                insta::allow_duplicates! { super::add_function_appends($kind) }
            }

            #[test]
            fn scene_globals_are_visible() {
                insta::allow_duplicates! { super::scene_globals_are_visible($kind) }
            }

            #[test]
            fn scene_functions_replace_on_new_scene() {
                insta::allow_duplicates! { super::scene_functions_replace_on_new_scene($kind) }
            }

            #[test]
            fn scene_globals_replace_on_new_scene() {
                insta::allow_duplicates! { super::scene_globals_replace_on_new_scene($kind) }
            }

            #[test]
            fn set_functions_replaces_prior_set() {
                insta::allow_duplicates! { super::set_functions_replaces_prior_set($kind) }
            }

            #[test]
            fn clear_detaches_the_feature() {
                insta::allow_duplicates! { super::clear_detaches_the_feature($kind) }
            }
        }
    };
}

backend_tests!(boa, "boa", BackendKind::Boa);
backend_tests!(rhai, "rhai", BackendKind::Rhai);

#[test]
fn default_backend_is_the_first_available() {
    match BackendKind::available().first() {
        Some(&kind) => assert_eq!(StyleContext::new().unwrap().backend_kind(), Some(kind)),
        None => assert!(StyleContext::new().is_err()),
    }
}

//! Style case utilities shared by the test harness and the xtask tools.
//!
//! A case file is a small header followed by a function source:
//!
//! ```text
//! key: text_source
//! expect: "Hello World!"
//! prop message: "Hello World!"
//! ---
//! function () { return feature.message; }
//! ```
//!
//! Headers: `key` (a style parameter name, or `filter`), `expect` (display
//! form of the decoded value, or `true`/`false` for filters), and optionally
//! `backends` (comma separated), `prop NAME` (a quoted string or a number),
//! `global NAME` (a scalar scene global), `zoom` and `geometry`.

use camino::{Utf8Path, Utf8PathBuf};
use miette::{IntoDiagnostic, miette};
use std::fs;
use tilestyle::{
    BackendKind, Feature, FilterKey, GeometryType, PropValue, Properties, SceneNode, StyleContext,
    StyleParamKey, StyleValue,
};

/// Line separating the headers from the function source
pub const SEPARATOR: &str = "---";

/// Outcome text for a function that failed to compile
pub const COMPILE_ERROR: &str = "compile error";

/// What a case evaluates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseKey {
    Filter,
    Style(StyleParamKey),
}

/// A parsed case file
#[derive(Debug, Clone)]
pub struct StyleCase {
    pub name: String,
    pub key: CaseKey,
    pub expect: String,
    /// `None` means every compiled backend
    pub backends: Option<Vec<BackendKind>>,
    pub props: Properties,
    pub globals: Vec<(String, String)>,
    pub zoom: Option<i32>,
    pub geometry: GeometryType,
    pub source: String,
}

impl StyleCase {
    pub fn applies_to(&self, kind: BackendKind) -> bool {
        self.backends
            .as_ref()
            .is_none_or(|backends| backends.contains(&kind))
    }

    pub fn feature(&self) -> Feature {
        Feature::with_props(self.geometry, self.props.clone())
    }

    /// Scene globals as a config tree, `None` when the case has none
    pub fn scene_globals(&self) -> Option<SceneNode> {
        if self.globals.is_empty() {
            return None;
        }
        Some(SceneNode::map(
            self.globals
                .iter()
                .map(|(name, value)| (name.clone(), SceneNode::scalar(value.clone()))),
        ))
    }
}

fn parse_prop(value: &str) -> miette::Result<PropValue> {
    if let Some(inner) = value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        return Ok(PropValue::String(inner.replace("\\\"", "\"")));
    }
    value
        .parse::<f64>()
        .map(PropValue::Number)
        .map_err(|_| miette!("property value must be a quoted string or a number: {value}"))
}

fn parse_geometry(value: &str) -> miette::Result<GeometryType> {
    match value {
        "unknown" => Ok(GeometryType::Unknown),
        "point" => Ok(GeometryType::Points),
        "line" => Ok(GeometryType::Lines),
        "polygon" => Ok(GeometryType::Polygons),
        _ => Err(miette!("unknown geometry: {value}")),
    }
}

/// Parse the text of a case file
pub fn parse_case(name: &str, text: &str) -> miette::Result<StyleCase> {
    let (header, source) = text
        .split_once(&format!("\n{SEPARATOR}\n"))
        .ok_or_else(|| miette!("{name}: missing `{SEPARATOR}` line"))?;

    let mut key = None;
    let mut expect = None;
    let mut backends = None;
    let mut props = Properties::new();
    let mut globals = Vec::new();
    let mut zoom = None;
    let mut geometry = GeometryType::Points;

    for line in header.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (field, value) = line
            .split_once(':')
            .ok_or_else(|| miette!("{name}: malformed header line: {line}"))?;
        let value = value.trim();

        match field.split_once(' ') {
            Some(("prop", prop)) => props.set(prop.trim(), parse_prop(value)?),
            Some(("global", global)) => globals.push((global.trim().to_string(), value.to_string())),
            _ => match field {
                "key" if value == "filter" => key = Some(CaseKey::Filter),
                "key" => {
                    let param = value
                        .parse::<StyleParamKey>()
                        .map_err(|e| miette!("{name}: {e}"))?;
                    key = Some(CaseKey::Style(param));
                }
                "expect" => expect = Some(value.to_string()),
                "backends" => {
                    let kinds = value
                        .split(',')
                        .map(|kind| kind.trim().parse::<BackendKind>())
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|e| miette!("{name}: {e}"))?;
                    backends = Some(kinds);
                }
                "zoom" => {
                    zoom = Some(value.parse().into_diagnostic()?);
                }
                "geometry" => geometry = parse_geometry(value)?,
                _ => return Err(miette!("{name}: unknown header `{field}`")),
            },
        }
    }

    Ok(StyleCase {
        name: name.to_string(),
        key: key.ok_or_else(|| miette!("{name}: missing `key`"))?,
        expect: expect.ok_or_else(|| miette!("{name}: missing `expect`"))?,
        backends,
        props,
        globals,
        zoom,
        geometry,
        source: source.trim().to_string(),
    })
}

/// Read and parse a case file
pub fn load_case(path: &Utf8Path) -> miette::Result<StyleCase> {
    let text = fs::read_to_string(path).into_diagnostic()?;
    let name = path.file_stem().unwrap_or(path.as_str());
    parse_case(name, &text)
}

/// All `.style` files under `dir`, sorted by name
pub fn case_files(dir: &Utf8Path) -> miette::Result<Vec<Utf8PathBuf>> {
    let mut files = Vec::new();
    for entry in dir.read_dir_utf8().into_diagnostic()? {
        let path = entry.into_diagnostic()?.into_path();
        if path.extension() == Some("style") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Evaluate `case` on `ctx` and return the outcome text
pub fn run_case(ctx: &mut StyleContext, case: &StyleCase) -> String {
    ctx.set_scene_globals(case.scene_globals().as_ref());
    if !ctx.set_functions(std::slice::from_ref(&case.source)) {
        return COMPILE_ERROR.to_string();
    }
    if let Some(zoom) = case.zoom {
        ctx.set_filter_key(FilterKey::Zoom, zoom);
    }
    ctx.set_feature(&case.feature());

    let outcome = match case.key {
        CaseKey::Filter => ctx.eval_filter(0).to_string(),
        CaseKey::Style(key) => {
            let mut value = StyleValue::None;
            let decoded = ctx.eval_style(0, key, &mut value);
            debug_assert_eq!(decoded, !value.is_none());
            value.to_string()
        }
    };
    ctx.clear();
    outcome
}

/// Evaluate `case` on a fresh context of the given backend
pub fn run_case_on(kind: BackendKind, case: &StyleCase) -> miette::Result<String> {
    let mut ctx = StyleContext::builder()
        .backend(kind)
        .build()
        .map_err(miette::Report::new)?;
    if ctx.backend_kind() != Some(kind) {
        return Err(miette!("backend {} is not compiled in", kind.name()));
    }
    Ok(run_case(&mut ctx, case))
}

/// Result of checking one case on one backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareResult {
    Match,
    Mismatch { expected: String, actual: String },
    /// The case does not apply to this backend
    Skipped,
}

impl CompareResult {
    pub fn is_match(&self) -> bool {
        matches!(self, CompareResult::Match | CompareResult::Skipped)
    }
}

pub fn compare_outcome(expected: &str, actual: &str) -> CompareResult {
    if expected.trim() == actual.trim() {
        CompareResult::Match
    } else {
        CompareResult::Mismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Run `case` on `ctx` and compare against its expectation
pub fn check_case(ctx: &mut StyleContext, case: &StyleCase) -> CompareResult {
    match ctx.backend_kind() {
        Some(kind) if !case.applies_to(kind) => CompareResult::Skipped,
        _ => compare_outcome(&case.expect, &run_case(ctx, case)),
    }
}

//! String forms of style parameters
//!
//! Scene files spell every parameter as text (`12px`, `#ff0000`, `[8, 8]`).
//! The decoder falls back to these parsers whenever a script hands back a
//! string for a key that has no bespoke string handling.

use glam::Vec2;
use pest::Parser;
use pest::error::InputLocation;
use pest::iterators::Pair;

use crate::errors::StyleParseError;
use crate::log::debug;
use crate::style::{ParamKind, StyleParamKey, StyleValue};
use crate::types::{Color, ColorF, SizeValue, Unit, Width};
use crate::{Rule, StyleParser};

fn parse_rule<'i>(
    rule: Rule,
    expected: &'static str,
    input: &'i str,
) -> Result<Pair<'i, Rule>, StyleParseError> {
    let mut pairs = StyleParser::parse(rule, input).map_err(|e| {
        let offset = match e.location {
            InputLocation::Pos(pos) => pos,
            InputLocation::Span((start, _)) => start,
        };
        StyleParseError::syntax(expected, input, offset)
    })?;
    pairs
        .next()
        .ok_or_else(|| StyleParseError::syntax(expected, input, 0))
}

fn number(pair: &Pair<Rule>) -> f64 {
    // The grammar only admits text `f64::from_str` accepts
    pair.as_str().parse().unwrap_or(f64::NAN)
}

/// Parse a color specification.
///
/// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` with
/// channels in 0..=255 and `rgba(r, g, b, a)` with alpha in 0..=1.
pub fn parse_color(input: &str) -> Result<Color, StyleParseError> {
    const EXPECTED: &str = "color";
    let input = input.trim();
    let pair = parse_rule(Rule::color, EXPECTED, input)?;
    let Some(inner) = pair.into_inner().next() else {
        return Err(StyleParseError::syntax(EXPECTED, input, 0));
    };

    match inner.as_rule() {
        Rule::hex_color => parse_hex(input, &inner.as_str()[1..]),
        Rule::rgb_color | Rule::rgba_color => {
            let channels: Vec<f64> = inner.into_inner().map(|p| number(&p)).collect();
            let alpha = channels.get(3).copied().unwrap_or(1.0);
            Ok(ColorF::new(
                channels[0] / 255.0,
                channels[1] / 255.0,
                channels[2] / 255.0,
                alpha,
            )
            .to_color())
        }
        _ => Err(StyleParseError::syntax(EXPECTED, input, inner.as_span().start())),
    }
}

fn parse_hex(input: &str, digits: &str) -> Result<Color, StyleParseError> {
    let nibble = |i: usize| u8::from_str_radix(&digits[i..=i], 16).unwrap_or(0);
    let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap_or(0);

    let color = match digits.len() {
        3 => Color::rgba(nibble(0) * 0x11, nibble(1) * 0x11, nibble(2) * 0x11, 0xff),
        4 => Color::rgba(
            nibble(0) * 0x11,
            nibble(1) * 0x11,
            nibble(2) * 0x11,
            nibble(3) * 0x11,
        ),
        6 => Color::rgba(byte(0), byte(2), byte(4), 0xff),
        8 => Color::rgba(byte(0), byte(2), byte(4), byte(6)),
        _ => return Err(StyleParseError::syntax("hex color", input, 1)),
    };
    Ok(color)
}

fn parse_number(input: &str) -> Result<f64, StyleParseError> {
    let pair = parse_rule(Rule::number_literal, "number", input)?;
    let value = pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::number)
        .map(|p| number(&p))
        .unwrap_or(f64::NAN);
    Ok(value)
}

fn parse_flag(input: &str) -> Result<bool, StyleParseError> {
    let pair = parse_rule(Rule::flag, "true or false", input.trim())?;
    Ok(pair
        .into_inner()
        .next()
        .is_some_and(|p| p.as_rule() == Rule::flag_true))
}

/// A parsed dimension: the number and its unit suffix if one was written
type Dimension = (f64, Option<Unit>);

fn parse_dimensions(input: &str) -> Result<Vec<Dimension>, StyleParseError> {
    let pair = parse_rule(Rule::dimension_list, "dimension list", input)?;
    let mut dims = Vec::new();
    for list in pair.into_inner().filter(|p| p.as_rule() == Rule::dimensions) {
        for dim in list.into_inner() {
            let mut value = f64::NAN;
            let mut unit = None;
            for part in dim.into_inner() {
                match part.as_rule() {
                    Rule::number => value = number(&part),
                    Rule::unit => unit = Unit::from_suffix(part.as_str()),
                    _ => {}
                }
            }
            dims.push((value, unit));
        }
    }
    Ok(dims)
}

fn parse_width(input: &str, default_unit: Unit) -> Result<Width, StyleParseError> {
    match parse_dimensions(input)?.as_slice() {
        [(value, unit)] => Width::try_non_negative(*value as f32, unit.unwrap_or(default_unit))
            .map_err(|_| StyleParseError::OutOfRange {
                what: "width",
                value: *value,
            }),
        _ => Err(StyleParseError::syntax("single dimension", input, 0)),
    }
}

fn parse_size(input: &str) -> Result<SizeValue, StyleParseError> {
    let dims = parse_dimensions(input)?;
    let width = |(value, unit): Dimension| {
        Width::try_non_negative(value as f32, unit.unwrap_or(Unit::Pixel)).map_err(|_| {
            StyleParseError::OutOfRange {
                what: "size",
                value,
            }
        })
    };
    let mut size = SizeValue::default();
    match dims.as_slice() {
        [x] => size.x = width(*x)?,
        [x, y] => {
            size.x = width(*x)?;
            size.y = width(*y)?;
        }
        _ => return Err(StyleParseError::syntax("one or two dimensions", input, 0)),
    }
    Ok(size)
}

fn parse_vec2(input: &str, allow_single: bool) -> Result<Vec2, StyleParseError> {
    match parse_dimensions(input)?.as_slice() {
        [(x, _), (y, _)] => Ok(Vec2::new(*x as f32, *y as f32)),
        [(v, _)] if allow_single => Ok(Vec2::splat(*v as f32)),
        _ => Err(StyleParseError::syntax("two numbers", input, 0)),
    }
}

fn parse_extrude(input: &str) -> Result<Vec2, StyleParseError> {
    if let Ok(flag) = parse_flag(input) {
        return Ok(if flag { Vec2::splat(f32::NAN) } else { Vec2::ZERO });
    }
    match parse_dimensions(input)?.as_slice() {
        [(height, _)] => Ok(Vec2::new(0.0, *height as f32)),
        [(min, _), (max, _)] => Ok(Vec2::new(*min as f32, *max as f32)),
        _ => Err(StyleParseError::syntax("extrusion", input, 0)),
    }
}

fn parse_uint(input: &str) -> Result<u32, StyleParseError> {
    let value = parse_number(input)?;
    if value.is_nan() || value < 0.0 || value > u32::MAX as f64 {
        return Err(StyleParseError::OutOfRange {
            what: "unsigned integer",
            value,
        });
    }
    Ok(value as u32)
}

fn try_parse_string(key: StyleParamKey, input: &str) -> Result<StyleValue, StyleParseError> {
    let value = match key.kind() {
        ParamKind::String => StyleValue::String(input.to_string()),
        ParamKind::Flag => StyleValue::Bool(parse_flag(input)?),
        ParamKind::Extrude => StyleValue::Vec2(parse_extrude(input)?),
        ParamKind::Color => StyleValue::Color(parse_color(input)?),
        ParamKind::Width(unit) => StyleValue::Width(parse_width(input, unit)?),
        ParamKind::Size => StyleValue::Size(parse_size(input)?),
        ParamKind::Offset => {
            StyleValue::Vec2(parse_vec2(input, key == StyleParamKey::Buffer)?)
        }
        ParamKind::Uint => StyleValue::Uint(parse_uint(input)?),
        ParamKind::Float => StyleValue::Float(parse_number(input)? as f32),
    };
    Ok(value)
}

/// Interpret `input` as the value of `key`. Unparseable input yields
/// [`StyleValue::None`].
pub fn parse_string(key: StyleParamKey, input: &str) -> StyleValue {
    try_parse_string(key, input).unwrap_or_else(|_err| {
        debug!(key = key.name(), input, error = %_err, "unparseable style value");
        StyleValue::None
    })
}

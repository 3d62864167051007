//! Collapse a raw script result into a [`StyleValue`] for one parameter key.
//!
//! Dispatch is a flat match over the result's [`ValueKind`] crossed with the
//! key. Anything not listed yields [`StyleValue::None`].

use glam::Vec2;

use crate::log::{debug, warn};
use crate::script::{ScriptContext, ValueHandle, ValueKind};
use crate::style::StyleParamKey as K;
use crate::style::{StyleParamKey, StyleValue, parse_color, parse_string};
use crate::types::{Color, ColorF, SizeValue, Width};

/// Canonical text of a number used as a text source (`5`, `1.5`, `NaN`)
pub(crate) fn number_to_string(number: f64) -> String {
    if number.is_nan() {
        "NaN".to_string()
    } else if number.is_infinite() {
        let text = if number > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else {
        number.to_string()
    }
}

/// Decode the value behind `handle` as a value of `key`
pub fn decode_value<C: ScriptContext + ?Sized>(
    ctx: &mut C,
    handle: ValueHandle,
    key: StyleParamKey,
) -> StyleValue {
    match ctx.kind(handle) {
        ValueKind::String => {
            let value = ctx.to_string(handle);
            decode_string(key, value)
        }
        ValueKind::Boolean => decode_bool(key, ctx.to_bool(handle)),
        ValueKind::Array => decode_array(ctx, handle, key),
        ValueKind::Number => {
            let number = ctx.to_double(handle);
            if number.is_nan() {
                debug!(key = key.name(), "style function evaluated to NaN");
            }
            decode_number(key, number)
        }
        ValueKind::Undefined => StyleValue::Undefined,
        _kind => {
            warn!(key = key.name(), kind = ?_kind, "unhandled return type from style function");
            StyleValue::None
        }
    }
}

fn decode_string(key: StyleParamKey, value: String) -> StyleValue {
    match key {
        K::OutlineStyle
        | K::RepeatGroup
        | K::Sprite
        | K::SpriteDefault
        | K::Style
        | K::TextAlign
        | K::TextRepeatGroup
        | K::TextSource
        | K::TextSourceLeft
        | K::TextSourceRight
        | K::TextTransform
        | K::Texture => StyleValue::String(value),
        K::Color | K::OutlineColor | K::TextFontFill | K::TextFontStrokeColor => {
            match parse_color(&value) {
                Ok(color) => StyleValue::Color(color),
                Err(_err) => {
                    warn!(key = key.name(), value = %value, error = %_err, "invalid color value");
                    StyleValue::None
                }
            }
        }
        _ => parse_string(key, &value),
    }
}

fn decode_bool(key: StyleParamKey, value: bool) -> StyleValue {
    match key {
        K::Interactive | K::TextInteractive | K::Visible => StyleValue::Bool(value),
        K::Extrude if value => StyleValue::Vec2(Vec2::splat(f32::NAN)),
        K::Extrude => StyleValue::Vec2(Vec2::ZERO),
        _ => StyleValue::None,
    }
}

fn decode_array<C: ScriptContext + ?Sized>(
    ctx: &mut C,
    handle: ValueHandle,
    key: StyleParamKey,
) -> StyleValue {
    let len = ctx.length(handle);
    let mut element = |i: usize| {
        let value = ctx.value_at_index(handle, i);
        ctx.to_double(value)
    };

    match key {
        K::Extrude => {
            if len != 2 {
                warn!(len, "wrong array size for extrusion");
                return StyleValue::None;
            }
            StyleValue::Vec2(Vec2::new(element(0) as f32, element(1) as f32))
        }
        K::Color | K::OutlineColor | K::TextFontFill | K::TextFontStrokeColor => {
            if !(3..=4).contains(&len) {
                warn!(len, "wrong array size for color");
                return StyleValue::None;
            }
            let r = element(0);
            let g = element(1);
            let b = element(2);
            let a = if len == 4 { element(3) } else { 1.0 };
            StyleValue::Color(ColorF::new(r, g, b, a).to_color())
        }
        _ => StyleValue::None,
    }
}

fn decode_number(key: StyleParamKey, number: f64) -> StyleValue {
    match key {
        K::TextSource | K::TextSourceLeft | K::TextSourceRight => {
            StyleValue::String(number_to_string(number))
        }
        K::Extrude => StyleValue::Vec2(Vec2::new(0.0, number as f32)),
        K::PlacementSpacing => StyleValue::Width(Width::pixels(number as f32)),
        K::Width | K::OutlineWidth => StyleValue::Width(Width::new(number as f32)),
        K::Angle | K::TextFontStrokeWidth | K::PlacementMinLengthRatio => {
            StyleValue::Float(number as f32)
        }
        K::Size => {
            let mut size = SizeValue::default();
            size.x.value = number as f32;
            StyleValue::Size(size)
        }
        K::Order | K::OutlineOrder | K::Priority => StyleValue::Uint(number as u32),
        // A number for a color is its packed value
        K::Color | K::OutlineColor | K::TextFontFill | K::TextFontStrokeColor => {
            StyleValue::Color(Color::from_abgr(number as u32))
        }
        _ => StyleValue::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn number_text() {
        assert_eq!(number_to_string(5.0), "5");
        assert_eq!(number_to_string(-1.5), "-1.5");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn strings_by_key() {
        assert_snapshot!(decode_string(K::TextSource, "name".into()), @r#""name""#);
        assert_snapshot!(decode_string(K::Color, "#ff0000".into()), @"color(#ff0000ff)");
        assert_snapshot!(decode_string(K::Color, "red".into()), @"none");
        assert_snapshot!(decode_string(K::Width, "3px".into()), @"width(3px)");
        assert_snapshot!(decode_string(K::Visible, "true".into()), @"true");
    }

    #[test]
    fn booleans_by_key() {
        assert_eq!(decode_bool(K::Visible, false), StyleValue::Bool(false));
        assert_snapshot!(decode_bool(K::Extrude, true), @"vec2(NaN, NaN)");
        assert_snapshot!(decode_bool(K::Extrude, false), @"vec2(0, 0)");
        assert!(decode_bool(K::Color, true).is_none());
        assert!(decode_bool(K::Collide, true).is_none());
    }

    #[test]
    fn numbers_by_key() {
        assert_snapshot!(decode_number(K::TextSourceLeft, 12.0), @r#""12""#);
        assert_snapshot!(decode_number(K::Extrude, 30.0), @"vec2(0, 30)");
        assert_snapshot!(decode_number(K::PlacementSpacing, 40.0), @"width(40px)");
        assert_snapshot!(decode_number(K::OutlineWidth, 2.0), @"width(2m)");
        assert_snapshot!(decode_number(K::Angle, 90.0), @"float(90)");
        assert_snapshot!(decode_number(K::Size, 16.0), @"size(16px, 0px)");
        assert_snapshot!(decode_number(K::Order, 5.0), @"uint(5)");
        assert_snapshot!(decode_number(K::Priority, -3.0), @"uint(0)");
        assert_snapshot!(decode_number(K::Color, 4278190335.0), @"color(#ff0000ff)");
        assert!(decode_number(K::Visible, 1.0).is_none());
    }

    #[test]
    fn nan_number_still_decodes() {
        assert_snapshot!(decode_number(K::Extrude, f64::NAN), @"vec2(0, NaN)");
    }
}

//! Style parameter keys

use std::fmt;
use std::str::FromStr;

use crate::types::Unit;

/// How a parameter's string form is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Kept verbatim
    String,
    /// `true` / `false`
    Flag,
    /// `true`, `false`, `h` or `min, max`
    Extrude,
    Color,
    /// A dimension; bare numbers get this unit
    Width(Unit),
    /// One or two pixel dimensions
    Size,
    /// Two pixel numbers
    Offset,
    Uint,
    Float,
}

macro_rules! style_param_keys {
    ($($variant:ident => $name:literal : $kind:expr),* $(,)?) => {
        /// Every stylable attribute of a draw rule
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum StyleParamKey {
            $($variant,)*
        }

        impl StyleParamKey {
            pub const ALL: &'static [StyleParamKey] = &[$(StyleParamKey::$variant,)*];

            /// Spelling used in scene files
            pub fn name(self) -> &'static str {
                match self {
                    $(StyleParamKey::$variant => $name,)*
                }
            }

            pub fn kind(self) -> ParamKind {
                match self {
                    $(StyleParamKey::$variant => $kind,)*
                }
            }
        }

        impl FromStr for StyleParamKey {
            type Err = UnknownStyleParam;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(StyleParamKey::$variant),)*
                    _ => Err(UnknownStyleParam(s.to_string())),
                }
            }
        }
    };
}

style_param_keys! {
    Align => "align": ParamKind::String,
    Anchor => "anchor": ParamKind::String,
    Angle => "angle": ParamKind::Float,
    Buffer => "buffer": ParamKind::Offset,
    Cap => "cap": ParamKind::String,
    Centroid => "centroid": ParamKind::Flag,
    Collide => "collide": ParamKind::Flag,
    Color => "color": ParamKind::Color,
    Extrude => "extrude": ParamKind::Extrude,
    Flat => "flat": ParamKind::Flag,
    Interactive => "interactive": ParamKind::Flag,
    Join => "join": ParamKind::String,
    MiterLimit => "miter_limit": ParamKind::Float,
    Offset => "offset": ParamKind::Offset,
    Order => "order": ParamKind::Uint,
    OutlineCap => "outline_cap": ParamKind::String,
    OutlineColor => "outline_color": ParamKind::Color,
    OutlineJoin => "outline_join": ParamKind::String,
    OutlineMiterLimit => "outline_miter_limit": ParamKind::Float,
    OutlineOrder => "outline_order": ParamKind::Uint,
    OutlineStyle => "outline_style": ParamKind::String,
    OutlineVisible => "outline_visible": ParamKind::Flag,
    OutlineWidth => "outline_width": ParamKind::Width(Unit::Meter),
    Placement => "placement": ParamKind::String,
    PlacementMinLengthRatio => "placement_min_length_ratio": ParamKind::Float,
    PlacementSpacing => "placement_spacing": ParamKind::Width(Unit::Pixel),
    PointText => "point_text": ParamKind::Flag,
    Priority => "priority": ParamKind::Uint,
    RepeatDistance => "repeat_distance": ParamKind::Width(Unit::Pixel),
    RepeatGroup => "repeat_group": ParamKind::String,
    Size => "size": ParamKind::Size,
    Sprite => "sprite": ParamKind::String,
    SpriteDefault => "sprite_default": ParamKind::String,
    Style => "style": ParamKind::String,
    TextAlign => "text_align": ParamKind::String,
    TextAnchor => "text_anchor": ParamKind::String,
    TextCollide => "text_collide": ParamKind::Flag,
    TextFontFamily => "text_font_family": ParamKind::String,
    TextFontFill => "text_font_fill": ParamKind::Color,
    TextFontSize => "text_font_size": ParamKind::Width(Unit::Pixel),
    TextFontStrokeColor => "text_font_stroke_color": ParamKind::Color,
    TextFontStrokeWidth => "text_font_stroke_width": ParamKind::Float,
    TextFontStyle => "text_font_style": ParamKind::String,
    TextFontWeight => "text_font_weight": ParamKind::String,
    TextInteractive => "text_interactive": ParamKind::Flag,
    TextMaxLines => "text_max_lines": ParamKind::Uint,
    TextOffset => "text_offset": ParamKind::Offset,
    TextOptional => "text_optional": ParamKind::Flag,
    TextOrder => "text_order": ParamKind::Uint,
    TextPriority => "text_priority": ParamKind::Uint,
    TextRepeatDistance => "text_repeat_distance": ParamKind::Width(Unit::Pixel),
    TextRepeatGroup => "text_repeat_group": ParamKind::String,
    TextSource => "text_source": ParamKind::String,
    TextSourceLeft => "text_source_left": ParamKind::String,
    TextSourceRight => "text_source_right": ParamKind::String,
    TextTransform => "text_transform": ParamKind::String,
    TextVisible => "text_visible": ParamKind::Flag,
    TextWrap => "text_wrap": ParamKind::Uint,
    Texture => "texture": ParamKind::String,
    TileEdges => "tile_edges": ParamKind::Flag,
    TransitionHideTime => "transition_hide_time": ParamKind::Width(Unit::Second),
    TransitionSelectedTime => "transition_selected_time": ParamKind::Width(Unit::Second),
    TransitionShowTime => "transition_show_time": ParamKind::Width(Unit::Second),
    Visible => "visible": ParamKind::Flag,
    Width => "width": ParamKind::Width(Unit::Meter),
}

impl StyleParamKey {
    /// `color`, `outline_color`, `text_font_fill`, `text_font_stroke_color`
    pub fn is_color(self) -> bool {
        self.kind() == ParamKind::Color
    }
}

impl fmt::Display for StyleParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a scene names a parameter that does not exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStyleParam(pub String);

impl fmt::Display for UnknownStyleParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown style parameter: {}", self.0)
    }
}

impl std::error::Error for UnknownStyleParam {}

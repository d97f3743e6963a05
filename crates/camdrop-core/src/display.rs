//! Cosmetic options passed in by the host application.
//!
//! None of these affect the capture or upload state machines.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static CSS_COLOR_FUNCTION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(rgb|rgba|hsl|hsla|hwb|lab|lch|oklab|oklch)\(\s*[-0-9.%,/\s a-z]+\)$").ok()
});

const CSS_NAMED_COLORS: &[&str] = &[
    "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
    "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
    "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan", "darkblue",
    "darkcyan", "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki",
    "darkmagenta", "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon",
    "darkseagreen", "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise",
    "darkviolet", "deeppink", "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick",
    "floralwhite", "forestgreen", "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod",
    "gray", "green", "greenyellow", "grey", "honeydew", "hotpink", "indianred", "indigo",
    "ivory", "khaki", "lavender", "lavenderblush", "lawngreen", "lemonchiffon", "lightblue",
    "lightcoral", "lightcyan", "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey",
    "lightpink", "lightsalmon", "lightseagreen", "lightskyblue", "lightslategray",
    "lightslategrey", "lightsteelblue", "lightyellow", "lime", "limegreen", "linen", "magenta",
    "maroon", "mediumaquamarine", "mediumblue", "mediumorchid", "mediumpurple",
    "mediumseagreen", "mediumslateblue", "mediumspringgreen", "mediumturquoise",
    "mediumvioletred", "midnightblue", "mintcream", "mistyrose", "moccasin", "navajowhite",
    "navy", "oldlace", "olive", "olivedrab", "orange", "orangered", "orchid", "palegoldenrod",
    "palegreen", "paleturquoise", "palevioletred", "papayawhip", "peachpuff", "peru", "pink",
    "plum", "powderblue", "purple", "rebeccapurple", "red", "rosybrown", "royalblue",
    "saddlebrown", "salmon", "sandybrown", "seagreen", "seashell", "sienna", "silver",
    "skyblue", "slateblue", "slategray", "slategrey", "snow", "springgreen", "steelblue", "tan",
    "teal", "thistle", "tomato", "transparent", "turquoise", "violet", "wheat", "white",
    "whitesmoke", "yellow", "yellowgreen",
];

/// How a configured color is applied to an element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColorStyle {
    /// Inline `background-color` value
    Background(String),
    /// Utility class name, used when the value is not a CSS color
    Class(String),
}

impl ColorStyle {
    /// Resolve a host-supplied color: hex and CSS colors apply inline, anything else
    /// is treated as a palette name (`"emerald"` becomes `bg-emerald-600`).
    pub fn resolve(color: &str) -> Self {
        let trimmed = color.trim();
        if trimmed.starts_with('#') || is_css_color(trimmed) {
            return ColorStyle::Background(trimmed.to_string());
        }
        tracing::debug!(color = %trimmed, "Not a CSS color, falling back to utility class");
        ColorStyle::Class(format!("bg-{}-600", trimmed))
    }
}

fn is_css_color(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    if CSS_NAMED_COLORS.binary_search(&lower.as_str()).is_ok() {
        return true;
    }
    CSS_COLOR_FUNCTION
        .as_ref()
        .map(|re| re.is_match(&lower))
        .unwrap_or(false)
}

/// Icon overrides, as raw markup. `None` keeps the built-in icon.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomIcons {
    pub edit: Option<String>,
    pub camera: Option<String>,
    pub check: Option<String>,
    pub cancel: Option<String>,
    pub change_camera: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    pub main_button_text: String,
    pub main_text_color: String,
    pub main_button_color: String,
    pub take_picture_text: String,
    pub upload_image_text: String,
    pub dialog_background_color: String,
    pub success_message: String,
    pub camera_button_color: String,
    pub camera_text_color: String,
    pub upload_button_color: String,
    pub upload_text_color: String,
    pub custom_icons: CustomIcons,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            main_button_text: String::new(),
            main_text_color: "black".to_string(),
            main_button_color: "#292d3e".to_string(),
            take_picture_text: "Camera".to_string(),
            upload_image_text: "Upload".to_string(),
            dialog_background_color: "white".to_string(),
            success_message: String::new(),
            camera_button_color: "black".to_string(),
            camera_text_color: "white".to_string(),
            upload_button_color: "black".to_string(),
            upload_text_color: "white".to_string(),
            custom_icons: CustomIcons::default(),
        }
    }
}

impl DisplayOptions {
    pub fn main_button_style(&self) -> ColorStyle {
        ColorStyle::resolve(&self.main_button_color)
    }

    pub fn dialog_style(&self) -> ColorStyle {
        ColorStyle::resolve(&self.dialog_background_color)
    }
}

use egui::Color32;

/// Parses `#RRGGBB`, `#RRGGBBAA` and a few CSS color names.
pub fn parse_color(code: &str) -> Option<Color32> {
    let code = code.trim();
    match code.to_ascii_lowercase().as_str() {
        "black" => Some(Color32::BLACK),
        "white" => Some(Color32::WHITE),
        "red" => Some(Color32::RED),
        "green" => Some(Color32::GREEN),
        "blue" => Some(Color32::BLUE),
        "yellow" => Some(Color32::YELLOW),
        "gray" | "grey" => Some(Color32::GRAY),
        _ => Color32::from_hex(code).ok(),
    }
}

pub fn color_to_hex(color: Color32) -> String {
    // `to_hex` appends the alpha channel.
    color.to_hex().chars().take(7).collect::<String>().to_uppercase()
}

/// Marker color of a series, falling back to `default`.
pub fn marker_color(code: Option<&str>, default: Color32) -> Color32 {
    code.and_then(parse_color).unwrap_or(default)
}

/// Distinct color for the `index`-th series without a color of its own.
pub fn auto_color(index: usize) -> Color32 {
    // analog to egui_plot
    let golden_ratio = (5.0_f32.sqrt() - 1.0) / 2.0;
    let h = (index as f32 * golden_ratio).fract();
    egui::epaint::Hsva::new(h, 0.85, 0.5, 1.0).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#272E3F"), Some(Color32::from_rgb(0x27, 0x2e, 0x3f)));
        assert_eq!(parse_color(" Yellow "), Some(Color32::YELLOW));
        assert_eq!(parse_color("not a color"), None);
        assert_eq!(marker_color(None, Color32::RED), Color32::RED);
    }

    #[test]
    fn test_color_to_hex() {
        assert_eq!(color_to_hex(Color32::from_rgb(255, 0, 16)), "#FF0010");
        let hex = color_to_hex(Color32::from_rgb(0x27, 0x2e, 0x3f));
        assert_eq!(parse_color(&hex), Some(Color32::from_rgb(0x27, 0x2e, 0x3f)));
    }
}

use egui::{Color32, CornerRadius, Stroke, Visuals};

#[derive(Clone, Copy)]
pub struct Palette {
    pub bg_page: Color32,
    pub bg_card: Color32,
    pub bg_input: Color32,
    pub input_outline: Color32,
    pub text_primary: Color32,
    pub text_label: Color32,
    pub text_muted: Color32,
    pub accent: Color32,
}

pub fn palette() -> Palette {
    Palette {
        bg_page: Color32::from_rgb(0xe3, 0xe9, 0xf1),
        bg_card: Color32::from_rgb(0xff, 0xff, 0xff),
        bg_input: Color32::from_rgb(0xf8, 0xf9, 0xfa),
        input_outline: Color32::from_rgb(0xe0, 0xe0, 0xe0),
        text_primary: Color32::from_rgb(0x2c, 0x3e, 0x50),
        text_label: Color32::from_rgb(0x34, 0x49, 0x5e),
        text_muted: Color32::from_rgb(0x5d, 0x6d, 0x7e),
        accent: Color32::from_rgb(0x66, 0x7e, 0xea),
    }
}

/// Fill and text colors of a result card.
#[derive(Clone, Copy)]
pub struct CardColors {
    pub fill: Color32,
    pub text: Color32,
}

pub fn low_risk_card() -> CardColors {
    CardColors {
        fill: Color32::from_rgb(0x96, 0xe6, 0xa1),
        text: Color32::from_rgb(0x1b, 0x5e, 0x20),
    }
}

pub fn high_risk_card() -> CardColors {
    CardColors {
        fill: Color32::from_rgb(0xff, 0x9a, 0x9e),
        text: Color32::from_rgb(0xb7, 0x1c, 0x1c),
    }
}

pub fn warning_card() -> CardColors {
    CardColors {
        fill: Color32::from_rgb(0xff, 0xf3, 0xcd),
        text: Color32::from_rgb(0x85, 0x64, 0x04),
    }
}

pub fn apply_visuals(visuals: &mut Visuals) {
    let palette = palette();
    *visuals = Visuals::light();
    visuals.panel_fill = palette.bg_page;
    visuals.window_fill = palette.bg_card;
    visuals.override_text_color = Some(palette.text_primary);
    visuals.extreme_bg_color = palette.bg_input;
    visuals.faint_bg_color = palette.bg_input;
    visuals.selection.bg_fill = palette.accent;
    visuals.selection.stroke = Stroke::new(1.0, palette.bg_card);
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, palette.input_outline);
    visuals.widgets.inactive.corner_radius = CornerRadius::same(6);
    visuals.widgets.hovered.corner_radius = CornerRadius::same(6);
    visuals.widgets.active.corner_radius = CornerRadius::same(6);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, palette.accent);
    visuals.window_corner_radius = CornerRadius::same(20);
}

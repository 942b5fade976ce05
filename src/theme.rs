use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub card_fill: String,
    pub card_border: String,
    pub card_text: String,
    pub card_subtext: String,
    pub line_color: String,
    pub button_fill: String,
    pub button_border: String,
    pub button_icon: String,
    pub label_text: String,
    pub background: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "\"Open Sans\", Roboto, Arial, sans-serif".to_string(),
            font_size: 14.0,
            card_fill: "#FFFFFF".to_string(),
            card_border: "#C5CAD6".to_string(),
            card_text: "#262626".to_string(),
            card_subtext: "#8C8C8C".to_string(),
            line_color: "#A6B1BF".to_string(),
            button_fill: "#FFFFFF".to_string(),
            button_border: "#A6B1BF".to_string(),
            button_icon: "#6E41E2".to_string(),
            label_text: "#4F4F4F".to_string(),
            background: "#F9F9F9".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            card_fill: "#FFFFFF".to_string(),
            card_border: "#D7E0F0".to_string(),
            card_text: "#1C2430".to_string(),
            card_subtext: "#7A8AA6".to_string(),
            line_color: "#7A8AA6".to_string(),
            button_fill: "#F8FAFF".to_string(),
            button_border: "#C7D2E5".to_string(),
            button_icon: "#3F5BD9".to_string(),
            label_text: "#1C2430".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::modern()
    }
}

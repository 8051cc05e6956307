use serde::{Deserialize, Serialize};

fn default_dimension() -> String {
    "100%".to_string()
}

fn default_border() -> String {
    "0".to_string()
}

fn default_border_radius() -> String {
    "12px".to_string()
}

fn default_true() -> bool {
    true
}

/// CSS applied to the embedded frame element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IframeStyle {
    #[serde(default = "default_dimension")]
    pub width: String,
    #[serde(default = "default_dimension")]
    pub height: String,
    #[serde(default = "default_border")]
    pub border: String,
    #[serde(default = "default_border_radius", rename = "borderRadius", alias = "border_radius")]
    pub border_radius: String,
}

impl Default for IframeStyle {
    fn default() -> Self {
        Self {
            width: default_dimension(),
            height: default_dimension(),
            border: default_border(),
            border_radius: default_border_radius(),
        }
    }
}

/// Options passed to the provider when a frame is instantiated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameOptions {
    #[serde(default, rename = "iframeStyle", alias = "iframe_style")]
    pub iframe_style: IframeStyle,
    /// Show the provider's own leave button inside the frame.
    #[serde(default = "default_true", rename = "showLeaveButton", alias = "show_leave_button")]
    pub show_leave_button: bool,
    #[serde(default = "default_true", rename = "showLocalVideo", alias = "show_local_video")]
    pub show_local_video: bool,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            iframe_style: IframeStyle::default(),
            show_leave_button: true,
            show_local_video: true,
        }
    }
}

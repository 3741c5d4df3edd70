// src/types.rs

/// Continuous coordinate reported by the viewer, in image data units
/// (pixel centres sit on integers, `x` grows to the right, `y` grows upward).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayPoint {
    pub x: f64,
    pub y: f64,
}

/// Grid cell picked by the operator. Signed: a click may land outside the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelCoord {
    pub row: i64,
    pub col: i64,
}

impl DisplayPoint {
    /// Nearest pixel centre. Non-finite input maps to (-1, -1), which is never on the grid.
    pub fn to_pixel(self) -> PixelCoord {
        let round = |v: f64| if v.is_finite() { v.round() as i64 } else { -1 };
        PixelCoord {
            row: round(self.y),
            col: round(self.x),
        }
    }
}

// 查看器日志的消息类型
#[derive(Clone, Debug)]
pub enum ViewerEvent {
    Log(String),
    Exported { sequence: u64, path: String },
    Rejected(String),
}

impl ViewerEvent {
    pub fn line(&self) -> String {
        match self {
            ViewerEvent::Log(s) => s.clone(),
            ViewerEvent::Exported { sequence, path } => format!("#{sequence} -> {path}"),
            ViewerEvent::Rejected(reason) => format!("skipped: {reason}"),
        }
    }
}

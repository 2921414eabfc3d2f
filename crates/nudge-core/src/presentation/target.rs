use serde::{Deserialize, Serialize};

/// On-screen rectangle of the notification, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// Where the host would mount the notification.
///
/// `None` means the render environment is missing; a show against it is
/// silently not presented.
pub trait RenderTarget {
    fn frame(&self) -> Option<Frame>;
}

/// A target with a fixed frame, or none at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticTarget {
    frame: Option<Frame>,
}

impl StaticTarget {
    pub fn at(frame: Frame) -> Self {
        Self { frame: Some(frame) }
    }

    pub fn absent() -> Self {
        Self { frame: None }
    }
}

impl RenderTarget for StaticTarget {
    fn frame(&self) -> Option<Frame> {
        self.frame
    }
}

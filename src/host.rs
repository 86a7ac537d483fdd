use crate::presenter::RenderFrame;

/// Signals the widget sends to the surrounding host frame.
pub trait HostFrame {
    /// Sent once, when the widget is mounted.
    fn component_ready(&mut self);
    fn render(&mut self, frame: &RenderFrame);
    /// Sent after every render pass. Hosts should no-op on unchanged sizes.
    fn set_frame_height(&mut self, height: u32);
}

/// Host that keeps only the latest frame and height.
#[derive(Debug, Default)]
pub struct FrameLatch {
    frame: Option<RenderFrame>,
    height: Option<u32>,
    renders: u64,
    ready_signals: u32,
}

impl FrameLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready_signals(&self) -> u32 {
        self.ready_signals
    }

    pub fn frame(&self) -> Option<&RenderFrame> {
        self.frame.as_ref()
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    pub fn render_count(&self) -> u64 {
        self.renders
    }
}

impl HostFrame for FrameLatch {
    fn component_ready(&mut self) {
        self.ready_signals += 1;
    }

    fn render(&mut self, frame: &RenderFrame) {
        self.frame = Some(frame.clone());
        self.renders += 1;
    }

    fn set_frame_height(&mut self, height: u32) {
        self.height = Some(height);
    }
}

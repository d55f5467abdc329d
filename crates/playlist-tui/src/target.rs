//! Bridges the widget's render target onto the TUI event loop.

use playlist_proto::render::RenderedView;
use playlist_proto::widget::RenderTarget;
use tokio::sync::mpsc;

use crate::app::AppMessage;

pub struct TuiTarget {
    tx: mpsc::UnboundedSender<AppMessage>,
}

impl TuiTarget {
    pub fn new(tx: mpsc::UnboundedSender<AppMessage>) -> Self {
        Self { tx }
    }
}

impl RenderTarget for TuiTarget {
    fn set_content(&mut self, view: &RenderedView) -> anyhow::Result<()> {
        self.tx
            .send(AppMessage::View(view.clone()))
            .map_err(|_| anyhow::anyhow!("terminal closed"))
    }

    fn reset_inputs(&mut self) -> anyhow::Result<()> {
        self.tx
            .send(AppMessage::InputsReset)
            .map_err(|_| anyhow::anyhow!("terminal closed"))
    }
}

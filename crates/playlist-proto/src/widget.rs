//! PlaylistWidget — owns the snapshot and filter state and drives the
//! fetch → store → filter → render pipeline.
//!
//! The host builds a widget around a [`SnapshotSource`] and a [`RenderTarget`],
//! calls [`PlaylistWidget::start`], and talks to the running widget through the
//! returned [`WidgetHandle`]:
//!
//!   timer tick / `refresh()`  → spawn a load; each completed load replaces the
//!                               snapshot (last to complete wins) and renders
//!   `set_filter()` / `clear_filters()` → update FilterState and render
//!                               synchronously, no fetch
//!   `stop()`                  → cancel the timer and any in-flight loads

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::filter::{FilterField, FilterState};
use crate::protocol::{PlaylistEntry, Snapshot};
use crate::render::{render_view, RenderedView};
use crate::source::{LoadOutcome, SnapshotSource};

/// Fixed refresh cadence.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

const EVENT_QUEUE: usize = 64;

/// The surface a widget renders into: list container plus the filter inputs.
pub trait RenderTarget: Send + 'static {
    /// Replace the container contents with `view`.
    fn set_content(&mut self, view: &RenderedView) -> anyhow::Result<()>;

    /// Blank the displayed value of all four filter inputs.
    fn reset_inputs(&mut self) -> anyhow::Result<()>;
}

/// Input events a host forwards to a running widget.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    FilterChanged(FilterField, String),
    ClearFilters,
    Refresh,
}

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("playlist widget is not running")]
    Stopped,
    #[error("playlist widget task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub struct PlaylistWidget<S, T> {
    source: Arc<S>,
    target: T,
    snapshot: Snapshot,
    filters: FilterState,
    /// False until the first snapshot lands; the loading view shows until then.
    loaded: bool,
    refresh_every: Duration,
}

impl<S: SnapshotSource, T: RenderTarget> PlaylistWidget<S, T> {
    pub fn new(source: S, target: T) -> Self {
        Self {
            source: Arc::new(source),
            target,
            snapshot: Vec::new(),
            filters: FilterState::new(),
            loaded: false,
            refresh_every: REFRESH_INTERVAL,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_refresh_interval(mut self, every: Duration) -> Self {
        self.refresh_every = every;
        self
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn filtered(&self) -> Vec<&PlaylistEntry> {
        self.filters.apply(&self.snapshot)
    }

    pub fn set_filter(&mut self, field: FilterField, value: &str) {
        self.filters.set(field, value);
        debug!("[widget] filter {} = {:?}", field.label(), self.filters.get(field));
        self.render();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        if let Err(e) = self.target.reset_inputs() {
            error!("[widget] failed to reset filter inputs: {:#}", e);
            self.paint_error();
            return;
        }
        self.render();
    }

    /// Store the result of a load and re-render.
    pub fn apply_outcome(&mut self, outcome: LoadOutcome) {
        match outcome {
            LoadOutcome::Live(snapshot) => {
                debug!("[widget] live snapshot, {} entries", snapshot.len());
                self.replace_snapshot(snapshot);
            }
            LoadOutcome::Fallback(snapshot) => {
                debug!("[widget] placeholder snapshot, {} entries", snapshot.len());
                self.replace_snapshot(snapshot);
            }
            LoadOutcome::Unavailable(e) => {
                warn!("[widget] playlist unavailable, keeping previous snapshot: {}", e);
                self.paint_error();
            }
        }
    }

    fn replace_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
        self.loaded = true;
        self.render();
    }

    /// Recompute the filtered view from scratch and push it to the target.
    pub fn render(&mut self) {
        let view = if self.loaded {
            render_view(&self.snapshot, &self.filters, Utc::now())
        } else {
            RenderedView::Loading
        };
        if let Err(e) = self.target.set_content(&view) {
            error!("[widget] render failed: {:#}", e);
            self.paint_error();
        }
    }

    fn paint_error(&mut self) {
        if let Err(e) = self.target.set_content(&RenderedView::error()) {
            error!("[widget] could not paint error view: {:#}", e);
        }
    }

    fn begin_load(&mut self, inflight: &mut JoinSet<LoadOutcome>) {
        if !self.loaded {
            self.render();
        }
        let source = Arc::clone(&self.source);
        inflight.spawn(async move { source.load().await });
    }

    /// Spawn the widget loop. The first load starts immediately.
    pub fn start(self) -> WidgetHandle {
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.run(events_rx, cancel.clone()));
        WidgetHandle {
            events: events_tx,
            cancel,
            task,
        }
    }

    async fn run(mut self, mut events: mpsc::Receiver<WidgetEvent>, cancel: CancellationToken) {
        let mut refresh = tokio::time::interval(self.refresh_every);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut inflight: JoinSet<LoadOutcome> = JoinSet::new();

        info!("[widget] started, refreshing every {:?}", self.refresh_every);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,

                _ = refresh.tick() => self.begin_load(&mut inflight),

                event = events.recv() => match event {
                    Some(WidgetEvent::FilterChanged(field, value)) => self.set_filter(field, &value),
                    Some(WidgetEvent::ClearFilters) => self.clear_filters(),
                    Some(WidgetEvent::Refresh) => self.begin_load(&mut inflight),
                    // Every handle is gone; nobody can stop us any more.
                    None => break,
                },

                Some(joined) = inflight.join_next() => match joined {
                    Ok(outcome) => self.apply_outcome(outcome),
                    Err(e) => {
                        error!("[widget] load task failed: {}", e);
                        self.paint_error();
                    }
                },
            }
        }

        inflight.abort_all();
        info!("[widget] stopped");
    }
}

/// Control handle for a running widget.
pub struct WidgetHandle {
    events: mpsc::Sender<WidgetEvent>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl WidgetHandle {
    pub async fn send(&self, event: WidgetEvent) -> Result<(), WidgetError> {
        self.events.send(event).await.map_err(|_| WidgetError::Stopped)
    }

    pub async fn set_filter(
        &self,
        field: FilterField,
        value: impl Into<String>,
    ) -> Result<(), WidgetError> {
        self.send(WidgetEvent::FilterChanged(field, value.into())).await
    }

    pub async fn clear_filters(&self) -> Result<(), WidgetError> {
        self.send(WidgetEvent::ClearFilters).await
    }

    pub async fn refresh(&self) -> Result<(), WidgetError> {
        self.send(WidgetEvent::Refresh).await
    }

    /// Sender for hosts that forward input from their own tasks.
    pub fn events(&self) -> mpsc::Sender<WidgetEvent> {
        self.events.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Cancel the refresh timer and in-flight loads, then wait for the loop.
    pub async fn stop(self) -> Result<(), WidgetError> {
        self.cancel.cancel();
        self.task.await?;
        Ok(())
    }
}

/// Reference HTML target: keeps the container markup in memory.
#[derive(Debug, Clone, Default)]
pub struct HtmlContainer {
    inner: Arc<Mutex<HtmlContents>>,
}

#[derive(Debug, Default)]
struct HtmlContents {
    markup: String,
    input_resets: usize,
}

impl HtmlContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markup(&self) -> String {
        self.inner
            .lock()
            .map(|c| c.markup.clone())
            .unwrap_or_default()
    }

    pub fn input_resets(&self) -> usize {
        self.inner.lock().map(|c| c.input_resets).unwrap_or(0)
    }
}

impl RenderTarget for HtmlContainer {
    fn set_content(&mut self, view: &RenderedView) -> anyhow::Result<()> {
        let mut contents = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("html container lock poisoned"))?;
        contents.markup = view.to_html();
        Ok(())
    }

    fn reset_inputs(&mut self) -> anyhow::Result<()> {
        let mut contents = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("html container lock poisoned"))?;
        contents.input_resets += 1;
        Ok(())
    }
}

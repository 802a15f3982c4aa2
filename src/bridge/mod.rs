//! Lifecycle of the bridge between one physical controller and the virtual
//! DualSense.
//!
//! The [Bridge] moves between [BridgeState::Idle], [BridgeState::Detecting]
//! and [BridgeState::Connected]. While connected, an [event_loop::EventLoop]
//! runs on a blocking worker and owns every descriptor of the connection.
use std::{
    io,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use thiserror::Error;
use tokio::{
    sync::{mpsc, watch, Mutex},
    task::JoinHandle,
};

use crate::{
    config::Config,
    input::{
        controller::Controller,
        detector::Detector,
        middleware::{InputMiddleware, KernelTimer, MiddlewareError},
        source::SourceError,
        target::{TargetError, VirtualFactory},
    },
    watcher::WatchEvent,
};

pub mod event_loop;

#[cfg(test)]
pub mod bridge_test;

use event_loop::EventLoop;

/// Time given to the kernel to create every node of a new device before
/// scanning for it.
pub const HOTPLUG_SETTLE: Duration = Duration::from_secs(1);

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Physical device unavailable: {0}")]
    Source(#[from] SourceError),
    #[error("Virtual device failed: {0}")]
    Target(#[from] TargetError),
    #[error("Macro timer failed: {0}")]
    Middleware(#[from] MiddlewareError),
    #[error("Failed to wait for device events: {0}")]
    Poll(io::Error),
    #[error("A controller is already connected")]
    AlreadyConnected,
    #[error("Worker task failed: {0}")]
    Join(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BridgeState {
    #[default]
    Idle,
    Detecting,
    Connected,
}

/// Holds at most one value. Acquiring an occupied slot hands the value back.
#[derive(Debug)]
pub struct ActiveSlot<T> {
    value: Option<T>,
}

impl<T> Default for ActiveSlot<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> ActiveSlot<T> {
    pub fn acquire(&mut self, value: T) -> Result<(), T> {
        if self.value.is_some() {
            return Err(value);
        }
        self.value = Some(value);
        Ok(())
    }

    pub fn release(&mut self) -> Option<T> {
        self.value.take()
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    pub fn is_occupied(&self) -> bool {
        self.value.is_some()
    }
}

/// The connection currently being bridged
#[derive(Debug)]
struct ActiveController {
    generation: u64,
    name: String,
    paths: Vec<String>,
    cancel: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

/// Devices of a connection that are open but not yet bridged
struct OpenedConnection {
    name: String,
    paths: Vec<String>,
    cancel: Arc<AtomicBool>,
    event_loop: EventLoop,
}

struct Inner {
    config: Config,
    detector: Arc<dyn Detector>,
    factory: Arc<dyn VirtualFactory>,
    slot: Mutex<ActiveSlot<ActiveController>>,
    state_tx: watch::Sender<BridgeState>,
    generation: AtomicU64,
    shutting_down: AtomicBool,
    /// A detection is waiting for new nodes to settle
    settling: AtomicBool,
}

impl Inner {
    /// Move to the given state if the bridge is currently in the expected one
    fn transition(&self, from: BridgeState, to: BridgeState) {
        self.state_tx.send_if_modified(|state| {
            if *state != from {
                return false;
            }
            log::debug!("Bridge state: {from:?} -> {to:?}");
            *state = to;
            true
        });
    }

    /// Open the physical controller, create the virtual one and set up the
    /// event loop between them. Blocks on device I/O.
    fn open_connection(
        &self,
        mut controller: Box<dyn Controller>,
    ) -> Result<OpenedConnection, BridgeError> {
        let fds = controller.open()?;

        let mut virtual_device = match self.factory.create() {
            Ok(device) => device,
            Err(e) => {
                controller.close();
                return Err(e.into());
            }
        };
        let timer = match KernelTimer::new() {
            Ok(timer) => timer,
            Err(e) => {
                controller.close();
                if let Err(e) = virtual_device.destroy() {
                    log::error!("Failed to destroy virtual device: {e}");
                }
                return Err(e.into());
            }
        };
        let middleware = InputMiddleware::new(Box::new(timer), self.config.macro_delay());

        let name = controller.name().to_string();
        let paths = controller.paths();
        let cancel = Arc::new(AtomicBool::new(false));
        let event_loop = EventLoop::new(
            controller,
            fds,
            virtual_device,
            middleware,
            cancel.clone(),
            self.config.poll_timeout(),
            self.config.rumble,
        );

        Ok(OpenedConnection {
            name,
            paths,
            cancel,
            event_loop,
        })
    }

    /// Start the event loop of an opened connection on a blocking worker
    fn spawn_loop(self: &Arc<Self>, connection: OpenedConnection) -> ActiveController {
        let OpenedConnection {
            name,
            paths,
            cancel,
            event_loop,
        } = connection;

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let inner = self.clone();
        let loop_name = name.clone();
        let task = tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || event_loop.run()).await;
            match result {
                Ok(Ok(())) => log::info!("Stopped bridging {loop_name}"),
                Ok(Err(e)) => log::error!("Bridging {loop_name} failed: {e}"),
                Err(e) => log::error!("Event loop for {loop_name} panicked: {e}"),
            }
            inner.finish(generation).await;
        });

        ActiveController {
            generation,
            name,
            paths,
            cancel,
            task: Some(task),
        }
    }

    /// Clear the slot once the event loop of the given connection is done
    async fn finish(&self, generation: u64) {
        let mut slot = self.slot.lock().await;
        if slot.get().map(|active| active.generation) != Some(generation) {
            return;
        }
        if let Some(active) = slot.release() {
            log::info!("Disconnected {}", active.name);
        }
        self.transition(BridgeState::Connected, BridgeState::Idle);
    }
}

/// Bridges the first supported physical controller to a virtual DualSense
#[derive(Clone)]
pub struct Bridge {
    inner: Arc<Inner>,
}

impl Bridge {
    pub fn new(
        config: Config,
        detector: Arc<dyn Detector>,
        factory: Arc<dyn VirtualFactory>,
    ) -> Self {
        let (state_tx, _) = watch::channel(BridgeState::Idle);
        Self {
            inner: Arc::new(Inner {
                config,
                detector,
                factory,
                slot: Mutex::new(ActiveSlot::default()),
                state_tx,
                generation: AtomicU64::new(0),
                shutting_down: AtomicBool::new(false),
                settling: AtomicBool::new(false),
            }),
        }
    }

    pub fn state(&self) -> BridgeState {
        *self.inner.state_tx.borrow()
    }

    /// Receive every state transition of the bridge
    pub fn subscribe(&self) -> watch::Receiver<BridgeState> {
        self.inner.state_tx.subscribe()
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.slot.lock().await.is_occupied()
    }

    /// Name of the controller currently bridged
    pub async fn connected_name(&self) -> Option<String> {
        let slot = self.inner.slot.lock().await;
        slot.get().map(|active| active.name.clone())
    }

    /// Run detection once and bridge the controller it finds. Returns true
    /// if a controller got connected.
    pub async fn start(&self) -> Result<bool, BridgeError> {
        if self.is_connected().await {
            log::debug!("Already connected, skipping detection");
            return Ok(false);
        }
        let Some(controller) = self.detect().await? else {
            return Ok(false);
        };
        self.connect(controller).await?;
        Ok(true)
    }

    /// Scan for a controller on a blocking worker
    async fn detect(&self) -> Result<Option<Box<dyn Controller>>, BridgeError> {
        self.inner
            .transition(BridgeState::Idle, BridgeState::Detecting);
        let detector = self.inner.detector.clone();
        let result = match tokio::task::spawn_blocking(move || detector.detect()).await {
            Ok(result) => result.map_err(BridgeError::from),
            Err(e) => Err(BridgeError::Join(e.to_string())),
        };
        if !matches!(result, Ok(Some(_))) {
            self.inner
                .transition(BridgeState::Detecting, BridgeState::Idle);
        }
        result
    }

    /// Bridge the given controller. Fails with
    /// [BridgeError::AlreadyConnected] while another controller is bridged,
    /// the given one is then dropped unopened.
    pub async fn connect(&self, controller: Box<dyn Controller>) -> Result<(), BridgeError> {
        // Held until the connection is in the slot so only one controller
        // is ever opened at a time.
        let mut slot = self.inner.slot.lock().await;
        if let Some(active) = slot.get() {
            log::info!(
                "Ignoring {}, already bridging {}",
                controller.name(),
                active.name
            );
            self.inner
                .transition(BridgeState::Detecting, BridgeState::Connected);
            return Err(BridgeError::AlreadyConnected);
        }

        log::info!("Connecting {}", controller.name());
        let inner = self.inner.clone();
        let task = tokio::task::spawn_blocking(move || inner.open_connection(controller));
        let opened = match task.await {
            Ok(result) => result,
            Err(e) => Err(BridgeError::Join(e.to_string())),
        };
        let connection = match opened {
            Ok(connection) => connection,
            Err(e) => {
                log::error!("Unable to connect: {e}");
                self.inner
                    .transition(BridgeState::Detecting, BridgeState::Idle);
                return Err(e);
            }
        };
        let active = self.inner.spawn_loop(connection);
        let name = active.name.clone();
        if let Err(active) = slot.acquire(active) {
            active.cancel.store(true, Ordering::Release);
            return Err(BridgeError::AlreadyConnected);
        }
        self.inner.state_tx.send_replace(BridgeState::Connected);
        log::info!("Connected {name}");
        Ok(())
    }

    /// Stop the active connection. The physical controller is released and
    /// the virtual one destroyed before this returns. Returns false if
    /// nothing was connected.
    pub async fn disconnect(&self) -> bool {
        let task = {
            let mut slot = self.inner.slot.lock().await;
            let Some(active) = slot.get_mut() else {
                return false;
            };
            log::info!("Disconnecting {}", active.name);
            active.cancel.store(true, Ordering::Release);
            active.task.take()
        };
        if let Some(task) = task {
            if let Err(e) = task.await {
                log::error!("Failed to join event loop task: {e}");
            }
        }
        true
    }

    /// Disconnect and ignore any further hot-plug events
    pub async fn shutdown(&self) {
        log::info!("Shutting down bridge");
        self.inner.shutting_down.store(true, Ordering::Release);
        self.disconnect().await;
    }

    /// React to a device node appearing or disappearing
    pub async fn handle_watch_event(&self, event: WatchEvent) {
        if self.inner.shutting_down.load(Ordering::Acquire) {
            return;
        }
        let path = event.path();
        match event {
            WatchEvent::Create { .. } => {
                if self.is_connected().await {
                    log::trace!("Ignoring {path}, already connected");
                    return;
                }
                log::debug!("Device node added: {path}");
                self.schedule_detection(path);
            }
            WatchEvent::Delete { .. } => {
                let owned = {
                    let slot = self.inner.slot.lock().await;
                    slot.get()
                        .is_some_and(|active| active.paths.iter().any(|p| *p == path))
                };
                if owned {
                    log::info!("Device node removed: {path}");
                    self.disconnect().await;
                }
            }
        }
    }

    /// Run detection once new nodes had time to settle. Nodes added while
    /// a detection is already waiting are covered by it.
    fn schedule_detection(&self, path: String) {
        if self.inner.settling.swap(true, Ordering::AcqRel) {
            log::trace!("Detection already pending, {path} will be seen by it");
            return;
        }
        let bridge = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(HOTPLUG_SETTLE).await;
            bridge.inner.settling.store(false, Ordering::Release);
            if bridge.inner.shutting_down.load(Ordering::Acquire) {
                return;
            }
            match bridge.start().await {
                Ok(_) | Err(BridgeError::AlreadyConnected) => (),
                Err(e) => log::warn!("Detection after {path} was added failed: {e}"),
            }
        });
    }

    /// Handle watch events until the sending side is dropped
    pub async fn run_hotplug(&self, mut rx: mpsc::Receiver<WatchEvent>) {
        log::debug!("Dispatching filesystem watch events");
        while let Some(event) = rx.recv().await {
            log::trace!("Received watch event: {:?}", event);
            self.handle_watch_event(event).await;
        }
        log::debug!("Stopped dispatching filesystem watch events");
    }
}

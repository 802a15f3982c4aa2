use std::{
    os::fd::RawFd,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use mio::{unix::SourceFd, Events, Interest, Poll, Token};

use crate::input::{
    controller::Controller,
    middleware::{monotonic_now, InputMiddleware},
    target::VirtualController,
};

use super::BridgeError;

/// Token of the virtual device. Physical nodes use their index.
const VIRTUAL: Token = Token(usize::MAX - 1);
/// Token of the macro timer
const MIDDLEWARE: Token = Token(usize::MAX - 2);

const EVENTS_CAPACITY: usize = 16;

/// Moves state between one physical controller, the macro middleware and
/// the virtual controller until cancelled or until an I/O error.
#[derive(Debug)]
pub struct EventLoop {
    physical: Box<dyn Controller>,
    physical_fds: Vec<RawFd>,
    virtual_device: Box<dyn VirtualController>,
    middleware: InputMiddleware,
    cancel: Arc<AtomicBool>,
    timeout: Duration,
    rumble: bool,
}

impl EventLoop {
    /// Create a loop over an opened physical controller. `physical_fds`
    /// are the descriptors returned by [Controller::open], in node order.
    pub fn new(
        physical: Box<dyn Controller>,
        physical_fds: Vec<RawFd>,
        virtual_device: Box<dyn VirtualController>,
        middleware: InputMiddleware,
        cancel: Arc<AtomicBool>,
        timeout: Duration,
        rumble: bool,
    ) -> Self {
        Self {
            physical,
            physical_fds,
            virtual_device,
            middleware,
            cancel,
            timeout,
            rumble,
        }
    }

    /// Run until cancelled or until a device fails, then release the
    /// physical controller and destroy the virtual one.
    pub fn run(mut self) -> Result<(), BridgeError> {
        log::debug!("Starting event loop for {}", self.physical.name());
        let result = self.poll_loop();
        self.teardown();
        result
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    fn poll_loop(&mut self) -> Result<(), BridgeError> {
        let mut poll = Poll::new().map_err(BridgeError::Poll)?;
        let registry = poll.registry();
        for (index, fd) in self.physical_fds.iter().enumerate() {
            registry
                .register(&mut SourceFd(fd), Token(index), Interest::READABLE)
                .map_err(BridgeError::Poll)?;
        }
        let virtual_fd = self.virtual_device.raw_fd();
        registry
            .register(&mut SourceFd(&virtual_fd), VIRTUAL, Interest::READABLE)
            .map_err(BridgeError::Poll)?;
        let timer_fd = self.middleware.raw_fd();
        registry
            .register(&mut SourceFd(&timer_fd), MIDDLEWARE, Interest::READABLE)
            .map_err(BridgeError::Poll)?;

        // Host events that arrived before registration would never wake an
        // edge triggered poll.
        self.read_virtual()?;

        let mut events = Events::with_capacity(EVENTS_CAPACITY);
        loop {
            if self.is_cancelled() {
                break;
            }
            if let Err(e) = poll.poll(&mut events, Some(self.timeout)) {
                if e.kind() == std::io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(BridgeError::Poll(e));
            }
            if self.is_cancelled() {
                break;
            }

            let mut changed = false;
            for event in events.iter() {
                match event.token() {
                    VIRTUAL => self.read_virtual()?,
                    MIDDLEWARE => changed |= self.middleware.on_timer(monotonic_now()?)?,
                    Token(index) => {
                        if !self.physical.poll_source(index)? {
                            continue;
                        }
                        changed = true;
                        self.middleware
                            .consume_physical(self.physical.state(), monotonic_now()?)?;
                    }
                }
            }
            if changed {
                self.forward()?;
            }
        }
        log::debug!("Event loop for {} cancelled", self.physical.name());
        Ok(())
    }

    /// Send the physical state, with the macro buttons on top, to the host
    fn forward(&mut self) -> Result<(), BridgeError> {
        self.virtual_device.consume_state(self.physical.state());
        self.middleware.merge_into(self.virtual_device.state_mut());
        self.virtual_device.write_report()?;
        Ok(())
    }

    /// Handle host events and pass requested rumble to the physical device
    fn read_virtual(&mut self) -> Result<(), BridgeError> {
        let Some(output) = self.virtual_device.read_events()? else {
            return Ok(());
        };
        if !self.rumble {
            return Ok(());
        }
        if !output.rumble_emulation {
            log::trace!("Host did not enable rumble emulation, ignoring rumble");
            return Ok(());
        }
        // A controller without force feedback still gets bridged
        if let Err(e) = self.physical.apply_rumble(&output.rumble) {
            log::debug!("Unable to forward rumble: {e}");
        }
        Ok(())
    }

    fn teardown(&mut self) {
        log::debug!("Tearing down {}", self.physical.name());
        self.physical.close();
        if let Err(e) = self.virtual_device.destroy() {
            log::error!("Failed to destroy virtual device: {e}");
        }
    }
}

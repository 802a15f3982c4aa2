//! Timed macro remapping between the physical and the virtual controller.
//!
//! Pressing share on the physical controller presses share and mode right
//! away and A one delay later. Releasing share releases all three one delay
//! after the release. Deadlines live in a min-heap and a single timer
//! descriptor wakes the event loop when the earliest one is due.
use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
    fmt::Debug,
    os::fd::{AsFd, AsRawFd, RawFd},
    time::Duration,
};

use nix::{
    errno::Errno,
    sys::{
        time::TimeSpec,
        timerfd::{ClockId, Expiration, TimerFd, TimerFlags, TimerSetTimeFlags},
    },
};
use thiserror::Error;

use super::state::{ButtonCode, ButtonMapping, ControllerState};

/// Buttons driven by the macro
const MACRO_BUTTONS: [ButtonMapping; 3] = [
    ButtonMapping::new(ButtonCode::Share),
    ButtonMapping::new(ButtonCode::Mode),
    ButtonMapping::new(ButtonCode::A),
];

#[derive(Error, Debug)]
pub enum MiddlewareError {
    #[error("Failed to create timer: {0}")]
    Create(Errno),
    #[error("Failed to arm timer: {0}")]
    Arm(Errno),
    #[error("Failed to disarm timer: {0}")]
    Disarm(Errno),
    #[error("Failed to read timer: {0}")]
    Read(Errno),
    #[error("Failed to read monotonic clock: {0}")]
    Clock(Errno),
}

/// Current value of the monotonic clock in nanoseconds
pub fn monotonic_now() -> Result<u64, MiddlewareError> {
    let now = nix::time::clock_gettime(nix::time::ClockId::CLOCK_MONOTONIC)
        .map_err(MiddlewareError::Clock)?;
    Ok(now.tv_sec() as u64 * 1_000_000_000 + now.tv_nsec() as u64)
}

/// One-shot timer that can be waited on together with device descriptors
pub trait Timer: Send + Debug {
    /// Fire once after the given duration, replacing any pending expiration
    fn arm(&mut self, after: Duration) -> Result<(), MiddlewareError>;

    fn disarm(&mut self) -> Result<(), MiddlewareError>;

    /// Consume a pending expiration so the descriptor stops being readable
    fn acknowledge(&mut self) -> Result<(), MiddlewareError>;

    fn raw_fd(&self) -> RawFd;
}

/// [Timer] backed by a non-blocking CLOCK_MONOTONIC timerfd
#[derive(Debug)]
pub struct KernelTimer {
    fd: TimerFd,
}

impl KernelTimer {
    pub fn new() -> Result<Self, MiddlewareError> {
        let fd = TimerFd::new(ClockId::CLOCK_MONOTONIC, TimerFlags::TFD_NONBLOCK)
            .map_err(MiddlewareError::Create)?;
        Ok(Self { fd })
    }
}

impl Timer for KernelTimer {
    fn arm(&mut self, after: Duration) -> Result<(), MiddlewareError> {
        let expiration = Expiration::OneShot(TimeSpec::from_duration(after));
        self.fd
            .set(expiration, TimerSetTimeFlags::empty())
            .map_err(MiddlewareError::Arm)
    }

    fn disarm(&mut self) -> Result<(), MiddlewareError> {
        self.fd.unset().map_err(MiddlewareError::Disarm)
    }

    fn acknowledge(&mut self) -> Result<(), MiddlewareError> {
        match self.fd.wait() {
            Ok(()) | Err(Errno::EAGAIN) => Ok(()),
            Err(e) => Err(MiddlewareError::Read(e)),
        }
    }

    fn raw_fd(&self) -> RawFd {
        self.fd.as_fd().as_raw_fd()
    }
}

/// Button change applied once its deadline has passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub deadline_ns: u64,
    /// Insertion order, keeps events with equal deadlines in order
    pub seq: u64,
    pub code: ButtonCode,
    pub pressed: bool,
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.deadline_ns, self.seq).cmp(&(other.deadline_ns, other.seq))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug)]
pub struct InputMiddleware {
    timer: Box<dyn Timer>,
    queue: BinaryHeap<Reverse<ScheduledEvent>>,
    state: ControllerState,
    delay_ns: u64,
    seq: u64,
    armed: bool,
    /// Share as last seen on the physical controller
    physical_share: bool,
}

impl InputMiddleware {
    pub fn new(timer: Box<dyn Timer>, delay: Duration) -> Self {
        Self {
            timer,
            queue: BinaryHeap::new(),
            state: ControllerState::new(&MACRO_BUTTONS, &[]),
            delay_ns: delay.as_nanos() as u64,
            seq: 0,
            armed: false,
            physical_share: false,
        }
    }

    /// Descriptor that becomes readable when the next step is due
    pub fn raw_fd(&self) -> RawFd {
        self.timer.raw_fd()
    }

    /// Macro buttons as currently asserted by the middleware
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Returns true while the middleware overrides the macro buttons
    pub fn is_active(&self) -> bool {
        self.state.is_pressed(ButtonCode::Share)
    }

    /// Returns the number of steps waiting for their deadline
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Observe the physical controller after it changed. Returns true if
    /// the macro buttons changed.
    pub fn consume_physical(
        &mut self,
        physical: &ControllerState,
        now_ns: u64,
    ) -> Result<bool, MiddlewareError> {
        self.physical_share = physical.is_pressed(ButtonCode::Share);
        self.check_edges(now_ns);
        let changed = self.process_due(now_ns);
        self.rearm(now_ns)?;
        Ok(changed)
    }

    /// Handle an expiration of the timer. Returns true if the macro
    /// buttons changed.
    pub fn on_timer(&mut self, now_ns: u64) -> Result<bool, MiddlewareError> {
        self.timer.acknowledge()?;
        let mut changed = self.process_due(now_ns);
        // An edge that arrived while a sequence was in flight is only
        // seen once the queue has drained.
        self.check_edges(now_ns);
        changed |= self.process_due(now_ns);
        self.rearm(now_ns)?;
        Ok(changed)
    }

    /// Overlay the macro buttons onto the given state while the macro is
    /// active. Returns true if the given state changed.
    pub fn merge_into(&self, target: &mut ControllerState) -> bool {
        if !self.is_active() {
            return false;
        }
        let mut changed = false;
        for button in self.state.buttons() {
            changed |= target.set_button(button.mapping.code, button.pressed);
        }
        changed
    }

    fn schedule(&mut self, deadline_ns: u64, code: ButtonCode, pressed: bool) {
        log::trace!("Scheduling {code:?} pressed={pressed} at {deadline_ns}");
        self.seq += 1;
        self.queue.push(Reverse(ScheduledEvent {
            deadline_ns,
            seq: self.seq,
            code,
            pressed,
        }));
    }

    fn check_edges(&mut self, now_ns: u64) {
        if !self.queue.is_empty() {
            return;
        }
        let asserted = self.state.is_pressed(ButtonCode::Share);
        if self.physical_share && !asserted {
            log::debug!("Share pressed, starting macro");
            self.schedule(now_ns, ButtonCode::Share, true);
            self.schedule(now_ns, ButtonCode::Mode, true);
            self.schedule(now_ns + self.delay_ns, ButtonCode::A, true);
        } else if !self.physical_share && asserted {
            log::debug!("Share released, ending macro");
            let deadline = now_ns + self.delay_ns;
            self.schedule(deadline, ButtonCode::Share, false);
            self.schedule(deadline, ButtonCode::Mode, false);
            self.schedule(deadline, ButtonCode::A, false);
        }
    }

    /// Apply every event whose deadline has passed, in deadline order
    fn process_due(&mut self, now_ns: u64) -> bool {
        let mut changed = false;
        while let Some(Reverse(event)) = self.queue.peek().copied() {
            if event.deadline_ns > now_ns {
                break;
            }
            self.queue.pop();
            log::trace!("Applying {:?} pressed={}", event.code, event.pressed);
            changed |= self.state.set_button(event.code, event.pressed);
        }
        changed
    }

    /// Point the timer at the earliest pending deadline
    fn rearm(&mut self, now_ns: u64) -> Result<(), MiddlewareError> {
        match self.queue.peek() {
            Some(Reverse(next)) => {
                // A zero expiration would disarm the timer
                let after = next.deadline_ns.saturating_sub(now_ns).max(1);
                self.timer.arm(Duration::from_nanos(after))?;
                self.armed = true;
            }
            None if self.armed => {
                self.timer.disarm()?;
                self.armed = false;
            }
            None => (),
        }
        Ok(())
    }
}

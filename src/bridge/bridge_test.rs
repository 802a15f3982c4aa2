use std::{
    error::Error,
    io::{self, Read, Write},
    os::{
        fd::{AsRawFd, RawFd},
        unix::net::UnixStream,
    },
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread,
    time::{Duration, Instant},
};

use crate::{
    bridge::{event_loop::EventLoop, ActiveSlot},
    input::{
        controller::Controller,
        middleware::{InputMiddleware, KernelTimer},
        profile::{ControllerProfile, LegionGoProfile},
        rumble::{OutputState, RumbleState},
        source::SourceError,
        state::{ButtonCode, ControllerState},
        target::{DeviceLifecycle, TargetError, VirtualController},
    },
};

#[derive(Debug, Default)]
struct Record {
    closed: usize,
    destroyed: usize,
    reports: Vec<ControllerState>,
    rumble: Vec<RumbleState>,
}

/// Controller fed through a socket. Every byte is one change of A or share.
#[derive(Debug)]
struct SocketController {
    stream: UnixStream,
    state: ControllerState,
    record: Arc<Mutex<Record>>,
}

impl Controller for SocketController {
    fn name(&self) -> &str {
        "Socket Controller"
    }

    fn paths(&self) -> Vec<String> {
        vec!["/dev/input/event42".to_string()]
    }

    fn open(&mut self) -> Result<Vec<RawFd>, SourceError> {
        Ok(vec![self.stream.as_raw_fd()])
    }

    fn close(&mut self) {
        self.record.lock().unwrap().closed += 1;
    }

    fn poll_source(&mut self, _index: usize) -> Result<bool, SourceError> {
        let mut changed = false;
        let mut buffer = [0u8; 16];
        loop {
            let count = match self.stream.read(&mut buffer) {
                Ok(0) => break,
                Ok(count) => count,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(SourceError::Read(e)),
            };
            for byte in &buffer[..count] {
                changed |= match byte {
                    1 => self.state.set_button(ButtonCode::A, true),
                    2 => self.state.set_button(ButtonCode::Share, true),
                    3 => self.state.set_button(ButtonCode::Share, false),
                    _ => self.state.set_button(ButtonCode::A, false),
                };
            }
        }
        Ok(changed)
    }

    fn state(&self) -> &ControllerState {
        &self.state
    }

    fn apply_rumble(&mut self, rumble: &RumbleState) -> Result<(), SourceError> {
        self.record.lock().unwrap().rumble.push(*rumble);
        Ok(())
    }
}

/// Virtual controller that keeps every report. A byte from the host side
/// is a rumble request of that strength.
#[derive(Debug)]
struct RecordingVirtual {
    stream: UnixStream,
    state: ControllerState,
    lifecycle: DeviceLifecycle,
    record: Arc<Mutex<Record>>,
}

impl VirtualController for RecordingVirtual {
    fn name(&self) -> &str {
        "Recording Controller"
    }

    fn raw_fd(&self) -> RawFd {
        self.stream.as_raw_fd()
    }

    fn state_mut(&mut self) -> &mut ControllerState {
        &mut self.state
    }

    fn consume_state(&mut self, physical: &ControllerState) -> bool {
        self.state.copy_from(physical)
    }

    fn write_report(&mut self) -> Result<(), TargetError> {
        self.record.lock().unwrap().reports.push(self.state.clone());
        Ok(())
    }

    fn read_events(&mut self) -> Result<Option<OutputState>, TargetError> {
        let mut output = None;
        let mut buffer = [0u8; 16];
        loop {
            match self.stream.read(&mut buffer) {
                Ok(0) => break,
                Ok(count) => {
                    let strength = buffer[count - 1] as f64 / 255.0;
                    output = Some(OutputState {
                        rumble: RumbleState::new(strength, strength),
                        rumble_emulation: true,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(TargetError::Read(e)),
            }
        }
        Ok(output)
    }

    fn destroy(&mut self) -> Result<(), TargetError> {
        if self.lifecycle != DeviceLifecycle::Destroyed {
            self.lifecycle = DeviceLifecycle::Destroyed;
            self.record.lock().unwrap().destroyed += 1;
        }
        Ok(())
    }

    fn lifecycle(&self) -> DeviceLifecycle {
        self.lifecycle
    }
}

fn wait_for<F: Fn(&Record) -> bool>(record: &Arc<Mutex<Record>>, condition: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition(&record.lock().unwrap()) {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn test_active_slot() {
    let mut slot = ActiveSlot::default();
    assert!(!slot.is_occupied());
    assert_eq!(slot.acquire("first"), Ok(()));
    assert_eq!(slot.acquire("second"), Err("second"));
    assert_eq!(slot.get(), Some(&"first"));
    assert_eq!(slot.release(), Some("first"));
    assert_eq!(slot.release(), None);
    assert_eq!(slot.acquire("second"), Ok(()));
}

#[test]
fn test_event_loop() -> Result<(), Box<dyn Error>> {
    let record = Arc::new(Mutex::new(Record::default()));

    let (physical_stream, mut physical_peer) = UnixStream::pair()?;
    physical_stream.set_nonblocking(true)?;
    let mut controller = SocketController {
        stream: physical_stream,
        state: LegionGoProfile.new_state(),
        record: record.clone(),
    };
    let fds = controller.open()?;

    let (virtual_stream, mut host) = UnixStream::pair()?;
    virtual_stream.set_nonblocking(true)?;
    let virtual_device = RecordingVirtual {
        stream: virtual_stream,
        state: LegionGoProfile.new_state(),
        lifecycle: DeviceLifecycle::Running,
        record: record.clone(),
    };

    let middleware = InputMiddleware::new(Box::new(KernelTimer::new()?), Duration::from_millis(20));
    let cancel = Arc::new(AtomicBool::new(false));
    let event_loop = EventLoop::new(
        Box::new(controller),
        fds,
        Box::new(virtual_device),
        middleware,
        cancel.clone(),
        Duration::from_millis(50),
        true,
    );
    let handle = thread::spawn(move || event_loop.run());

    // Plain button press is forwarded
    physical_peer.write_all(&[1])?;
    assert!(wait_for(&record, |r| r
        .reports
        .last()
        .is_some_and(|s| s.is_pressed(ButtonCode::A))));

    // Share runs the macro through the timer
    physical_peer.write_all(&[0, 2])?;
    assert!(wait_for(&record, |r| r.reports.last().is_some_and(|s| {
        s.is_pressed(ButtonCode::Share) && s.is_pressed(ButtonCode::Mode) && s.is_pressed(ButtonCode::A)
    })));
    physical_peer.write_all(&[3])?;
    assert!(wait_for(&record, |r| r.reports.last().is_some_and(|s| {
        !s.is_pressed(ButtonCode::Share) && !s.is_pressed(ButtonCode::Mode) && !s.is_pressed(ButtonCode::A)
    })));

    // Rumble from the host reaches the physical controller
    host.write_all(&[255])?;
    assert!(wait_for(&record, |r| r.rumble.last() == Some(&RumbleState::new(1.0, 1.0))));

    cancel.store(true, Ordering::Release);
    let result = handle.join().map_err(|_| "event loop panicked")?;
    assert!(result.is_ok());

    let record = record.lock().unwrap();
    assert_eq!(record.closed, 1);
    assert_eq!(record.destroyed, 1);

    Ok(())
}

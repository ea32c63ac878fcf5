//! Scripted in-memory transport
//!
//! A [`MockDevice`] handle shares state with the enumerator and the ports it
//! opens, so a test can queue inbound bytes, pull a device off the bus and
//! inspect what the session wrote.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::time::Duration;

use crate::serial::{LinkConfig, PortEnumerator, PortInfo, SerialPort, TransportError};

/// One scripted result for `read_nonblocking`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockRead {
    Bytes(Vec<u8>),
    Error(TransportError),
}

#[derive(Debug, Default)]
struct MockState {
    ports: Vec<PortInfo>,
    reads: VecDeque<MockRead>,
    written: Vec<Vec<u8>>,
    write_error: Option<TransportError>,
    open_error: Option<TransportError>,
    open_port: Option<String>,
    last_config: Option<LinkConfig>,
    last_timeout: Option<Duration>,
    open_count: usize,
    close_count: usize,
}

/// Test-side handle on the simulated bus
#[derive(Debug, Clone, Default)]
pub struct MockDevice {
    state: Rc<RefCell<MockState>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enumerator sharing this device's state
    pub fn enumerator(&self) -> MockEnumerator {
        MockEnumerator {
            state: self.state.clone(),
        }
    }

    pub fn add_port(&self, port: PortInfo) {
        self.state.borrow_mut().ports.push(port);
    }

    /// Simulate unplugging: the port disappears from enumeration
    pub fn remove_port(&self, name: &str) {
        self.state.borrow_mut().ports.retain(|p| p.name != name);
    }

    /// Queue bytes returned by one future read
    pub fn push_bytes(&self, bytes: &[u8]) {
        self.state
            .borrow_mut()
            .reads
            .push_back(MockRead::Bytes(bytes.to_vec()));
    }

    /// Queue an error returned by one future read
    pub fn push_read_error(&self, error: TransportError) {
        self.state.borrow_mut().reads.push_back(MockRead::Error(error));
    }

    /// Make every write fail with `error` (or succeed again with `None`)
    pub fn set_write_error(&self, error: Option<TransportError>) {
        self.state.borrow_mut().write_error = error;
    }

    /// Make the next opens fail with `error` (or succeed again with `None`)
    pub fn set_open_error(&self, error: Option<TransportError>) {
        self.state.borrow_mut().open_error = error;
    }

    /// Every successful write, in order
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.state.borrow().written.clone()
    }

    pub fn clear_written(&self) {
        self.state.borrow_mut().written.clear();
    }

    /// Name of the port currently held open
    pub fn open_port(&self) -> Option<String> {
        self.state.borrow().open_port.clone()
    }

    pub fn last_config(&self) -> Option<LinkConfig> {
        self.state.borrow().last_config
    }

    pub fn last_timeout(&self) -> Option<Duration> {
        self.state.borrow().last_timeout
    }

    pub fn open_count(&self) -> usize {
        self.state.borrow().open_count
    }

    pub fn close_count(&self) -> usize {
        self.state.borrow().close_count
    }

    /// Scripted reads not consumed yet
    pub fn pending_reads(&self) -> usize {
        self.state.borrow().reads.len()
    }
}

/// [`PortEnumerator`] over the simulated bus
#[derive(Debug, Clone)]
pub struct MockEnumerator {
    state: Rc<RefCell<MockState>>,
}

impl PortEnumerator for MockEnumerator {
    type Port = MockPort;

    fn available_ports(&mut self) -> Result<Vec<PortInfo>, TransportError> {
        Ok(self.state.borrow().ports.clone())
    }

    fn open(&mut self, name: &str, config: &LinkConfig) -> Result<MockPort, TransportError> {
        let mut state = self.state.borrow_mut();
        if let Some(error) = state.open_error {
            return Err(error);
        }
        if !state.ports.iter().any(|p| p.name == name) {
            return Err(TransportError::InvalidArgs);
        }
        state.open_port = Some(String::from(name));
        state.last_config = Some(*config);
        state.open_count += 1;
        Ok(MockPort {
            state: self.state.clone(),
            open: true,
        })
    }
}

/// [`SerialPort`] backed by the scripted state
#[derive(Debug)]
pub struct MockPort {
    state: Rc<RefCell<MockState>>,
    open: bool,
}

impl SerialPort for MockPort {
    fn read_nonblocking(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        if !self.open {
            return Err(TransportError::Failed);
        }
        let mut state = self.state.borrow_mut();
        match state.reads.pop_front() {
            None => Ok(0),
            Some(MockRead::Error(error)) => Err(error),
            Some(MockRead::Bytes(mut bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    let rest = bytes.split_off(n);
                    state.reads.push_front(MockRead::Bytes(rest));
                }
                Ok(n)
            }
        }
    }

    fn write_timeout(&mut self, data: &[u8], timeout: Duration) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::Failed);
        }
        let mut state = self.state.borrow_mut();
        state.last_timeout = Some(timeout);
        if let Some(error) = state.write_error {
            return Err(error);
        }
        state.written.push(data.to_vec());
        Ok(())
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            let mut state = self.state.borrow_mut();
            state.open_port = None;
            state.close_count += 1;
        }
    }
}

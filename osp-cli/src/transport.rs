//! Wires [`osp_core::Transport`] to a real serial port. Framing (the part
//! the core library stays deliberately ignorant of) is applied here, right
//! before the bytes leave the process.

use std::io;
use std::sync::Mutex;

use osp_core::Transport;
use serialport::SerialPort;

use crate::framer::encode_frame;

pub struct SerialTransport {
    port: Mutex<Box<dyn SerialPort>>,
}

impl SerialTransport {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self {
            port: Mutex::new(port),
        }
    }
}

impl Transport for SerialTransport {
    fn send(&self, payload: &[u8]) -> io::Result<()> {
        let wire = encode_frame(payload);
        let mut port = self.port.lock().unwrap();
        port.write_all(&wire)
    }
}

use std::net::{SocketAddr, UdpSocket};

use rosc::{encoder, OscMessage, OscPacket, OscType};
use serde::Deserialize;

use crate::color::Color;
use crate::sink::{DeviceSink, SinkError};

const UNIVERSE_SIZE: usize = 512;

/// Pixels that fit into one DMX universe at three channels each.
pub const MAX_PIXELS: usize = UNIVERSE_SIZE / 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    Rgb,
    Rbg,
    Grb,
    Gbr,
    Brg,
    Bgr,
}

impl ChannelOrder {
    fn arrange(&self, color: Color) -> [u8; 3] {
        let (r, g, b) = color.into_components();
        match self {
            ChannelOrder::Rgb => [r, g, b],
            ChannelOrder::Rbg => [r, b, g],
            ChannelOrder::Grb => [g, r, b],
            ChannelOrder::Gbr => [g, b, r],
            ChannelOrder::Brg => [b, r, g],
            ChannelOrder::Bgr => [b, g, r],
        }
    }
}

/// Drives the strip through OLA: the whole universe is sent as an OSC blob
/// on every `show`.
pub struct OlaOutput {
    sock: UdpSocket,
    target_addr: SocketAddr,
    address: String,
    channel_order: ChannelOrder,
    pixel_count: usize,
    buffer: Vec<u8>,
}

impl OlaOutput {
    pub fn new(
        target_addr: SocketAddr,
        universe: u16,
        channel_order: ChannelOrder,
        pixel_count: usize,
    ) -> Result<Self, SinkError> {
        let our_addr = if target_addr.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let sock = UdpSocket::bind(our_addr)?;

        Ok(OlaOutput {
            sock,
            target_addr,
            address: format!("/dmx/universe/{}", universe),
            channel_order,
            pixel_count: pixel_count.min(MAX_PIXELS),
            buffer: vec![0; UNIVERSE_SIZE],
        })
    }

    fn set_rgb(&mut self, start_channel: usize, values: [u8; 3]) {
        self.buffer[start_channel..start_channel + 3].copy_from_slice(&values);
    }
}

impl DeviceSink for OlaOutput {
    fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    fn set_pixel(&mut self, index: usize, color: Color) {
        if index < self.pixel_count {
            let values = self.channel_order.arrange(color);
            self.set_rgb(index * 3, values);
        }
    }

    fn show(&mut self) -> Result<(), SinkError> {
        let msg_buf = encoder::encode(&OscPacket::Message(OscMessage {
            addr: self.address.clone(),
            args: vec![OscType::Blob(self.buffer.clone())],
        }))
        .map_err(|err| SinkError::Encode(format!("{:?}", err)))?;
        self.sock.send_to(&msg_buf, self.target_addr)?;
        Ok(())
    }
}

use std::collections::BTreeMap;
use std::net::{SocketAddr, UdpSocket};

use rosc::{decoder, encoder, OscMessage, OscPacket, OscType};

use crate::engine::EngineHandle;
use crate::task::Task;

const PROGRAM_PREFIX: &str = "/program/";

#[derive(Debug, PartialEq, Eq)]
enum Request {
    Run(Task),
    Status,
}

/// Receives program requests as OSC messages and hands them to the engine:
///
/// - `/program/<name> [key value]...` runs a program, e.g.
///   `/program/single_color "red" 255 "blue" 40`
/// - `/stop` returns the strip to blackout
/// - `/status` replies with `/status/currentProgram <name>`
pub struct OscReceiver {
    sock: UdpSocket,
    engine: EngineHandle,
}

impl OscReceiver {
    pub fn new(listen_addr: SocketAddr, engine: EngineHandle) -> Result<Self, String> {
        let sock = match UdpSocket::bind(listen_addr) {
            Ok(sock) => sock,
            Err(error) => return Err(error.to_string()),
        };

        Ok(OscReceiver { sock, engine })
    }

    pub fn run(&self) {
        let mut buf = [0u8; decoder::MTU];

        loop {
            match self.sock.recv_from(&mut buf) {
                Ok((size, addr)) => {
                    log::debug!("Received packet with size {} from: {}", size, addr);
                    match decoder::decode(&buf[..size]) {
                        Ok(packet) => self.handle_packet(packet, addr),
                        Err(err) => log::warn!("Cannot decode OSC packet from {}: {:?}", addr, err),
                    }
                }
                Err(e) => {
                    log::error!("Error receiving from socket: {}", e);
                    break;
                }
            }
        }
    }

    fn handle_packet(&self, packet: OscPacket, reply_to: SocketAddr) {
        match packet {
            OscPacket::Message(msg) => match parse_request(&msg) {
                Ok(Some(request)) => self.handle_request(request, reply_to),
                Ok(None) => log::info!("Ignoring OSC address {} with {:?}", msg.addr, msg.args),
                Err(err) => log::warn!("Rejected {} from {}: {}", msg.addr, reply_to, err),
            },
            OscPacket::Bundle(bundle) => {
                for packet in bundle.content {
                    self.handle_packet(packet, reply_to);
                }
            }
        }
    }

    fn handle_request(&self, request: Request, reply_to: SocketAddr) {
        match request {
            Request::Run(task) => {
                log::info!("Requested {:?} from {}", task, reply_to);
                self.engine.enqueue(task);
            }
            Request::Status => self.send_status(reply_to),
        }
    }

    fn send_status(&self, reply_to: SocketAddr) {
        let msg_buf = encoder::encode(&OscPacket::Message(OscMessage {
            addr: "/status/currentProgram".to_string(),
            args: vec![OscType::String(self.engine.current_program().to_string())],
        }));
        match msg_buf {
            Ok(msg_buf) => {
                if let Err(err) = self.sock.send_to(&msg_buf, reply_to) {
                    log::warn!("Cannot send status to {}: {}", reply_to, err);
                }
            }
            Err(err) => log::warn!("Cannot encode status: {:?}", err),
        }
    }
}

/// Turn a message into a validated request. `Ok(None)` means the address is
/// not one of ours.
fn parse_request(msg: &OscMessage) -> Result<Option<Request>, String> {
    match msg.addr.as_str() {
        "/stop" => Ok(Some(Request::Run(Task::Blackout))),
        "/status" => Ok(Some(Request::Status)),
        addr => match addr.strip_prefix(PROGRAM_PREFIX) {
            Some(program) => {
                let args = extract_arguments(msg)?;
                let task = Task::from_request(program, &args).map_err(|err| err.to_string())?;
                Ok(Some(Request::Run(task)))
            }
            None => Ok(None),
        },
    }
}

fn extract_arguments(msg: &OscMessage) -> Result<BTreeMap<String, i64>, String> {
    if msg.args.len() % 2 != 0 {
        return Err(format!("{} expects key/value pairs", msg.addr));
    }

    let mut args = BTreeMap::new();
    for pair in msg.args.chunks(2) {
        let key = match &pair[0] {
            OscType::String(key) => key.clone(),
            other => return Err(format!("{} Unexpected argument name: {:?}", msg.addr, other)),
        };
        let value = match &pair[1] {
            OscType::Int(value) => i64::from(*value),
            OscType::Long(value) => *value,
            other => {
                return Err(format!(
                    "{} Unexpected value for {}: {:?}",
                    msg.addr, key, other
                ))
            }
        };
        if args.insert(key.clone(), value).is_some() {
            return Err(format!("{} Duplicate argument: {}", msg.addr, key));
        }
    }

    Ok(args)
}

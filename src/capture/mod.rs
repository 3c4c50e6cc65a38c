//! Packet capture: sources, header parsing, and the dispatch loop.

mod packet;
mod sniffer;
mod source;

pub use packet::{build_tcp_packet, parse_segment, FlowKey, LinkType, TcpSegment};
pub use sniffer::{CaptureHandle, PacketCapture, DEFAULT_STOP_TIMEOUT};
pub use source::{PacketSource, PcapFileSource, ReplaySource};

//! Link-layer / IPv4 / TCP header parsing.
//!
//! Just enough dissection to key flows and strip headers off captured
//! packets; anything that is not IPv4 TCP is skipped.

use std::net::{Ipv4Addr, SocketAddrV4};

/// Link-layer framing of a capture source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    /// Ethernet II (pcap linktype 1).
    Ethernet,
    /// Raw IPv4/IPv6 (pcap linktype 101).
    RawIp,
}

/// Ethernet header length.
const ETHERNET_HEADER_LEN: usize = 14;
/// EtherType for IPv4.
const ETHERTYPE_IPV4: u16 = 0x0800;
/// IP protocol number for TCP.
const IP_PROTO_TCP: u8 = 6;

/// One direction of a TCP flow: the (source, destination) endpoint pair.
///
/// The two directions of a connection yield two distinct keys, which is
/// what the reassembly layer wants - one buffer per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowKey {
    /// Sending endpoint.
    pub src: SocketAddrV4,
    /// Receiving endpoint.
    pub dst: SocketAddrV4,
}

/// A parsed TCP segment: endpoints plus payload bytes.
#[derive(Debug)]
pub struct TcpSegment<'a> {
    /// Sending endpoint.
    pub src: SocketAddrV4,
    /// Receiving endpoint.
    pub dst: SocketAddrV4,
    /// TCP payload (may be empty for pure ACKs).
    pub payload: &'a [u8],
}

impl TcpSegment<'_> {
    /// Directional flow key for this segment.
    pub fn flow_key(&self) -> FlowKey {
        FlowKey {
            src: self.src,
            dst: self.dst,
        }
    }
}

/// Parse a raw captured packet down to its TCP payload.
///
/// Returns `None` for anything that is not a well-formed IPv4 TCP packet
/// (other EtherTypes, truncated headers, non-TCP protocols). Never panics
/// on short input.
pub fn parse_segment(link: LinkType, data: &[u8]) -> Option<TcpSegment<'_>> {
    let ip = match link {
        LinkType::Ethernet => {
            if data.len() < ETHERNET_HEADER_LEN {
                return None;
            }
            let ethertype = u16::from_be_bytes([data[12], data[13]]);
            if ethertype != ETHERTYPE_IPV4 {
                return None;
            }
            &data[ETHERNET_HEADER_LEN..]
        }
        LinkType::RawIp => data,
    };

    // IPv4 fixed header is 20 bytes; IHL gives the real length.
    if ip.len() < 20 || ip[0] >> 4 != 4 {
        return None;
    }
    let ip_header_len = (ip[0] & 0x0F) as usize * 4;
    if ip_header_len < 20 || ip[9] != IP_PROTO_TCP || ip.len() < ip_header_len + 20 {
        return None;
    }

    let src_ip = Ipv4Addr::new(ip[12], ip[13], ip[14], ip[15]);
    let dst_ip = Ipv4Addr::new(ip[16], ip[17], ip[18], ip[19]);

    let tcp = &ip[ip_header_len..];
    let tcp_header_len = (tcp[12] >> 4) as usize * 4;
    if tcp_header_len < 20 || tcp.len() < tcp_header_len {
        return None;
    }

    let src_port = u16::from_be_bytes([tcp[0], tcp[1]]);
    let dst_port = u16::from_be_bytes([tcp[2], tcp[3]]);

    // Honor the IP total-length field so link-layer padding is not taken
    // for payload.
    let ip_total_len = u16::from_be_bytes([ip[2], ip[3]]) as usize;
    let payload_end = ip_total_len.clamp(ip_header_len + tcp_header_len, ip.len());

    Some(TcpSegment {
        src: SocketAddrV4::new(src_ip, src_port),
        dst: SocketAddrV4::new(dst_ip, dst_port),
        payload: &tcp[tcp_header_len..payload_end - ip_header_len],
    })
}

/// Build a synthetic Ethernet+IPv4+TCP packet around `payload`.
///
/// Checksums are zeroed; the parser does not verify them. Used by tests
/// and replay demos.
pub fn build_tcp_packet(src: SocketAddrV4, dst: SocketAddrV4, payload: &[u8]) -> Vec<u8> {
    let mut pkt = Vec::with_capacity(ETHERNET_HEADER_LEN + 40 + payload.len());

    // Ethernet: dst MAC, src MAC, EtherType.
    pkt.extend_from_slice(&[0u8; 12]);
    pkt.extend_from_slice(&ETHERTYPE_IPV4.to_be_bytes());

    // IPv4 header, IHL=5.
    let ip_total_len = (20 + 20 + payload.len()) as u16;
    pkt.push(0x45);
    pkt.push(0);
    pkt.extend_from_slice(&ip_total_len.to_be_bytes());
    pkt.extend_from_slice(&[0u8; 4]); // id, flags, fragment offset
    pkt.push(64); // TTL
    pkt.push(IP_PROTO_TCP);
    pkt.extend_from_slice(&[0u8; 2]); // checksum
    pkt.extend_from_slice(&src.ip().octets());
    pkt.extend_from_slice(&dst.ip().octets());

    // TCP header, data offset 5.
    pkt.extend_from_slice(&src.port().to_be_bytes());
    pkt.extend_from_slice(&dst.port().to_be_bytes());
    pkt.extend_from_slice(&[0u8; 8]); // seq, ack
    pkt.push(0x50); // data offset
    pkt.push(0x18); // PSH|ACK
    pkt.extend_from_slice(&[0u8; 6]); // window, checksum, urgent

    pkt.extend_from_slice(payload);
    pkt
}

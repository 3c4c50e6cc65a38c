//! Packet sources feeding the capture loop.
//!
//! Live device capture stays behind the [`PacketSource`] trait (opening a
//! device is an external concern); the crate ships a classic pcap file
//! reader for offline analysis and an in-memory replay source for tests
//! and demos.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{CaptureError, Result};

use super::packet::LinkType;

/// Anything that can hand the capture loop raw link-layer packets.
pub trait PacketSource {
    /// Link-layer framing of the packets this source produces.
    fn link_type(&self) -> LinkType;

    /// Next raw packet, or `None` at end of stream.
    fn next_packet(&mut self) -> Result<Option<Vec<u8>>>;
}

/// pcap magic, microsecond timestamps.
const PCAP_MAGIC_USEC: u32 = 0xA1B2_C3D4;
/// pcap magic, nanosecond timestamps.
const PCAP_MAGIC_NSEC: u32 = 0xA1B2_3C4D;
/// pcap linktype values understood by the parser.
const LINKTYPE_ETHERNET: u32 = 1;
const LINKTYPE_RAW: u32 = 101;
/// Sanity cap on a single captured packet.
const MAX_SNAP_LEN: u32 = 256 * 1024;

/// Reader for classic pcap capture files.
///
/// Handles both byte orders and both timestamp precisions; pcapng is not
/// supported.
#[derive(Debug)]
pub struct PcapFileSource {
    reader: BufReader<File>,
    swapped: bool,
    link: LinkType,
}

impl PcapFileSource {
    /// Open a pcap file and validate its global header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut header = [0u8; 24];
        reader.read_exact(&mut header)?;

        let magic = u32::from_be_bytes(header[0..4].try_into().expect("fixed slice"));
        let swapped = match magic {
            PCAP_MAGIC_USEC | PCAP_MAGIC_NSEC => false,
            m if m.swap_bytes() == PCAP_MAGIC_USEC || m.swap_bytes() == PCAP_MAGIC_NSEC => true,
            m => {
                return Err(CaptureError::Source(format!(
                    "not a pcap file (magic {m:#010x})"
                )))
            }
        };

        let read_u32 = |bytes: &[u8]| {
            let v = u32::from_be_bytes(bytes.try_into().expect("fixed slice"));
            if swapped {
                v.swap_bytes()
            } else {
                v
            }
        };

        let linktype = read_u32(&header[20..24]);
        let link = match linktype {
            LINKTYPE_ETHERNET => LinkType::Ethernet,
            LINKTYPE_RAW => LinkType::RawIp,
            other => {
                return Err(CaptureError::Source(format!(
                    "unsupported pcap linktype {other}"
                )))
            }
        };

        Ok(Self {
            reader,
            swapped,
            link,
        })
    }

    fn read_u32(&mut self, buf: &[u8; 4]) -> u32 {
        let v = u32::from_be_bytes(*buf);
        if self.swapped {
            v.swap_bytes()
        } else {
            v
        }
    }
}

impl PacketSource for PcapFileSource {
    fn link_type(&self) -> LinkType {
        self.link
    }

    fn next_packet(&mut self) -> Result<Option<Vec<u8>>> {
        // Per-record header: ts_sec, ts_frac, incl_len, orig_len.
        let mut record = [0u8; 16];
        match self.reader.read_exact(&mut record) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let incl_len = self.read_u32(&record[8..12].try_into().expect("fixed slice"));
        if incl_len > MAX_SNAP_LEN {
            return Err(CaptureError::Source(format!(
                "pcap record claims {incl_len} bytes"
            )));
        }

        let mut data = vec![0u8; incl_len as usize];
        self.reader.read_exact(&mut data)?;
        Ok(Some(data))
    }
}

/// In-memory packet source for tests and demos.
pub struct ReplaySource {
    packets: VecDeque<Vec<u8>>,
    link: LinkType,
}

impl ReplaySource {
    /// Replay the given packets in order.
    pub fn new(link: LinkType, packets: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            packets: packets.into_iter().collect(),
            link,
        }
    }
}

impl PacketSource for ReplaySource {
    fn link_type(&self) -> LinkType {
        self.link
    }

    fn next_packet(&mut self) -> Result<Option<Vec<u8>>> {
        Ok(self.packets.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Serialize packets into a classic little-endian pcap file.
    fn write_pcap(path: &Path, linktype: u32, packets: &[&[u8]]) {
        let mut file = File::create(path).unwrap();
        file.write_all(&PCAP_MAGIC_USEC.to_le_bytes()).unwrap();
        file.write_all(&2u16.to_le_bytes()).unwrap(); // version major
        file.write_all(&4u16.to_le_bytes()).unwrap(); // version minor
        file.write_all(&[0u8; 8]).unwrap(); // thiszone, sigfigs
        file.write_all(&65535u32.to_le_bytes()).unwrap(); // snaplen
        file.write_all(&linktype.to_le_bytes()).unwrap();
        for pkt in packets {
            file.write_all(&[0u8; 8]).unwrap(); // ts
            file.write_all(&(pkt.len() as u32).to_le_bytes()).unwrap();
            file.write_all(&(pkt.len() as u32).to_le_bytes()).unwrap();
            file.write_all(pkt).unwrap();
        }
    }

    #[test]
    fn test_pcap_file_roundtrip() {
        let dir = std::env::temp_dir();
        let path = dir.join("bpsr_test_roundtrip.pcap");
        write_pcap(&path, LINKTYPE_ETHERNET, &[b"first", b"second packet"]);

        let mut source = PcapFileSource::open(&path).unwrap();
        assert_eq!(source.link_type(), LinkType::Ethernet);
        assert_eq!(source.next_packet().unwrap().unwrap(), b"first");
        assert_eq!(source.next_packet().unwrap().unwrap(), b"second packet");
        assert!(source.next_packet().unwrap().is_none());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_pcap_raw_linktype() {
        let dir = std::env::temp_dir();
        let path = dir.join("bpsr_test_raw.pcap");
        write_pcap(&path, LINKTYPE_RAW, &[]);

        let source = PcapFileSource::open(&path).unwrap();
        assert_eq!(source.link_type(), LinkType::RawIp);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_pcap_bad_magic() {
        let dir = std::env::temp_dir();
        let path = dir.join("bpsr_test_bad_magic.pcap");
        std::fs::write(&path, [0u8; 24]).unwrap();

        let err = PcapFileSource::open(&path).unwrap_err();
        assert!(matches!(err, CaptureError::Source(_)));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_pcap_unsupported_linktype() {
        let dir = std::env::temp_dir();
        let path = dir.join("bpsr_test_linktype.pcap");
        write_pcap(&path, 105, &[]); // 802.11

        let err = PcapFileSource::open(&path).unwrap_err();
        assert!(err.to_string().contains("linktype"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_replay_source() {
        let mut source = ReplaySource::new(
            LinkType::Ethernet,
            vec![b"one".to_vec(), b"two".to_vec()],
        );
        assert_eq!(source.next_packet().unwrap().unwrap(), b"one");
        assert_eq!(source.next_packet().unwrap().unwrap(), b"two");
        assert!(source.next_packet().unwrap().is_none());
    }
}

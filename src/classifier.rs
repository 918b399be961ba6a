//! Handshake signature classifier.
//!
//! Recognises WireGuard message types the way a passive dissector does: the
//! first byte is the message type, the next three bytes are a reserved field
//! that must be zero, and the datagram is at least as long as the fixed size
//! for that type. No cryptographic field is parsed or validated.
//!
//! Wire header (first 4 bytes of every message):
//! ```text
//! [type: 1][reserved: 3 = 0x000000][...]
//! ```

/// Handshake initiation message type tag.
pub const MESSAGE_INITIATION_TYPE: u8 = 1;
/// Handshake response message type tag.
pub const MESSAGE_RESPONSE_TYPE: u8 = 2;
/// Cookie reply message type tag.
pub const MESSAGE_COOKIE_REPLY_TYPE: u8 = 3;
/// Transport data message type tag.
pub const MESSAGE_TRANSPORT_TYPE: u8 = 4;

/// Fixed size of a handshake initiation message.
pub const MESSAGE_INITIATION_SIZE: usize = 148;
/// Fixed size of a handshake response message.
pub const MESSAGE_RESPONSE_SIZE: usize = 92;
/// Fixed size of a cookie reply message.
pub const MESSAGE_COOKIE_REPLY_SIZE: usize = 64;
/// Minimum size of a transport data message (header + empty AEAD tag).
pub const MESSAGE_TRANSPORT_MIN_SIZE: usize = 32;

const HEADER_LEN: usize = 4;

/// Message kind as seen from the outside of the tunnel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    Initiation = MESSAGE_INITIATION_TYPE,
    Response = MESSAGE_RESPONSE_TYPE,
    CookieReply = MESSAGE_COOKIE_REPLY_TYPE,
    Transport = MESSAGE_TRANSPORT_TYPE,
}

impl MessageKind {
    fn from_u8(v: u8) -> Option<Self> {
        match v {
            MESSAGE_INITIATION_TYPE => Some(Self::Initiation),
            MESSAGE_RESPONSE_TYPE => Some(Self::Response),
            MESSAGE_COOKIE_REPLY_TYPE => Some(Self::CookieReply),
            MESSAGE_TRANSPORT_TYPE => Some(Self::Transport),
            _ => None,
        }
    }

    /// Smallest datagram that can carry this message kind.
    pub fn min_size(self) -> usize {
        match self {
            Self::Initiation => MESSAGE_INITIATION_SIZE,
            Self::Response => MESSAGE_RESPONSE_SIZE,
            Self::CookieReply => MESSAGE_COOKIE_REPLY_SIZE,
            Self::Transport => MESSAGE_TRANSPORT_MIN_SIZE,
        }
    }
}

/// Classify a single outbound datagram.
///
/// Returns `None` for anything that does not carry a known type tag followed
/// by a zeroed reserved field, or that is shorter than the kind's fixed size.
/// Longer buffers are accepted: the length check is "at least", so padded or
/// coalesced datagrams still classify.
pub fn classify(buf: &[u8]) -> Option<MessageKind> {
    if buf.len() < HEADER_LEN {
        return None;
    }
    let kind = MessageKind::from_u8(buf[0])?;
    if buf[1..HEADER_LEN] != [0, 0, 0] {
        return None;
    }
    if buf.len() < kind.min_size() {
        return None;
    }
    Some(kind)
}

/// True iff `buf` looks like a handshake initiation.
#[inline]
pub fn is_handshake_initiation(buf: &[u8]) -> bool {
    buf.len() >= MESSAGE_INITIATION_SIZE
        && buf[0] == MESSAGE_INITIATION_TYPE
        && buf[1] == 0
        && buf[2] == 0
        && buf[3] == 0
}

/// True iff any buffer of the batch looks like a handshake initiation.
/// Stops at the first match.
pub fn batch_contains_initiation<B: AsRef<[u8]>>(bufs: &[B]) -> bool {
    bufs.iter().any(|b| is_handshake_initiation(b.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initiation(len: usize) -> Vec<u8> {
        let mut buf = vec![0xA5u8; len];
        buf[..4].copy_from_slice(&[MESSAGE_INITIATION_TYPE, 0, 0, 0]);
        buf
    }

    #[test]
    fn test_exact_size_initiation_matches() {
        assert!(is_handshake_initiation(&initiation(MESSAGE_INITIATION_SIZE)));
        assert_eq!(
            classify(&initiation(MESSAGE_INITIATION_SIZE)),
            Some(MessageKind::Initiation)
        );
    }

    #[test]
    fn test_oversized_initiation_matches() {
        assert!(is_handshake_initiation(&initiation(MESSAGE_INITIATION_SIZE + 1)));
        assert!(is_handshake_initiation(&initiation(1500)));
    }

    #[test]
    fn test_short_buffers_never_match() {
        for len in 0..MESSAGE_INITIATION_SIZE {
            let mut buf = vec![0u8; len];
            if len > 0 {
                buf[0] = MESSAGE_INITIATION_TYPE;
            }
            assert!(!is_handshake_initiation(&buf), "len {} matched", len);
        }
    }

    #[test]
    fn test_nonzero_reserved_byte_rejected() {
        for i in 1..4 {
            let mut buf = initiation(MESSAGE_INITIATION_SIZE);
            buf[i] = 0x01;
            assert!(!is_handshake_initiation(&buf), "reserved byte {} ignored", i);
            assert_eq!(classify(&buf), None);
        }
    }

    #[test]
    fn test_wrong_tag_rejected() {
        let mut buf = initiation(MESSAGE_INITIATION_SIZE);
        for tag in [0u8, 2, 3, 4, 0xFF] {
            buf[0] = tag;
            assert!(!is_handshake_initiation(&buf));
        }
    }

    #[test]
    fn test_classify_other_kinds() {
        let response = [&[MESSAGE_RESPONSE_TYPE, 0, 0, 0][..], &[0u8; 88][..]].concat();
        assert_eq!(classify(&response), Some(MessageKind::Response));

        let cookie = [&[MESSAGE_COOKIE_REPLY_TYPE, 0, 0, 0][..], &[0u8; 60][..]].concat();
        assert_eq!(classify(&cookie), Some(MessageKind::CookieReply));

        let data = [&[MESSAGE_TRANSPORT_TYPE, 0, 0, 0][..], &[7u8; 28][..]].concat();
        assert_eq!(classify(&data), Some(MessageKind::Transport));
        assert_eq!(classify(&data[..31]), None);

        assert_eq!(classify(&[9, 0, 0, 0, 0, 0, 0, 0]), None);
        assert_eq!(classify(&[1, 0, 0]), None);
    }

    #[test]
    fn test_batch_matches_on_any_buffer() {
        let noise = vec![MESSAGE_TRANSPORT_TYPE, 0, 0, 0, 1, 2, 3];
        let init = initiation(MESSAGE_INITIATION_SIZE);

        assert!(!batch_contains_initiation::<Vec<u8>>(&[]));
        assert!(!batch_contains_initiation(&[noise.clone(), noise.clone()]));
        assert!(batch_contains_initiation(&[init.clone(), noise.clone()]));
        assert!(batch_contains_initiation(&[noise.clone(), init.clone()]));
        assert!(batch_contains_initiation(&[noise, vec![], init]));
    }
}

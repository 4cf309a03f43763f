//! Length suffix codec
//!
//! Content length is appended to the merkle root inside the multihash digest
//! as a minimal little-endian byte string. Zero encodes to no bytes at all,
//! and the most significant byte emitted is never zero.

/// Largest suffix a `u64` can produce
pub const MAX_SUFFIX_LEN: usize = 8;

/// Number of bytes needed to hold every set bit of `length`
pub fn encoded_len(length: u64) -> usize {
    MAX_SUFFIX_LEN - (length.leading_zeros() as usize / 8)
}

/// Encode `length` as minimal little-endian bytes
pub fn encode(length: u64) -> Vec<u8> {
    let n = encoded_len(length);
    length.to_le_bytes()[..n].to_vec()
}

/// Decode a little-endian suffix back into a length
///
/// Returns `None` when more than 8 bytes are supplied. Redundant high zero
/// bytes are accepted; `encode` simply never produces them.
pub fn decode(bytes: &[u8]) -> Option<u64> {
    if bytes.len() > MAX_SUFFIX_LEN {
        return None;
    }

    let length = bytes
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, &b)| acc | (u64::from(b) << (8 * i)));
    Some(length)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LENGTHS: [u64; 7] = [0, 1, 131072, 131073, 262144, u32::MAX as u64, u64::MAX];

    #[test]
    fn test_roundtrip_reference_lengths() {
        for &l in &LENGTHS {
            let encoded = encode(l);
            assert_eq!(decode(&encoded), Some(l), "roundtrip failed for {}", l);

            // No superfluous high zero byte
            if let Some(&last) = encoded.last() {
                assert_ne!(last, 0, "leading zero byte for {}", l);
            }
        }
    }

    #[test]
    fn test_zero_is_empty() {
        assert!(encode(0).is_empty());
        assert_eq!(decode(&[]), Some(0));
    }

    #[test]
    fn test_known_encodings() {
        assert_eq!(encode(1), vec![1]);
        assert_eq!(encode(255), vec![0xff]);
        assert_eq!(encode(256), vec![0, 1]);
        assert_eq!(encode(131072), vec![0x00, 0x00, 0x02]);
        assert_eq!(encode(131073), vec![0x01, 0x00, 0x02]);
        assert_eq!(encode(u32::MAX as u64), vec![0xff; 4]);
        assert_eq!(encode(u64::MAX), vec![0xff; 8]);
    }

    #[test]
    fn test_encoded_len_boundaries() {
        assert_eq!(encoded_len(0), 0);
        assert_eq!(encoded_len(0xff), 1);
        assert_eq!(encoded_len(0x100), 2);
        assert_eq!(encoded_len(1 << 56), 8);
    }

    #[test]
    fn test_decode_accepts_padded_input() {
        assert_eq!(decode(&[5, 0, 0]), Some(5));
    }

    #[test]
    fn test_decode_rejects_oversized_suffix() {
        assert_eq!(decode(&[1; 9]), None);
    }
}

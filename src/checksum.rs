//! FCS (Frame Check Sequence) computation.
//!
//! The protocol's integrity digest is a 32-bit "one-at-a-time" avalanche
//! hash.  Despite the name borrowed from 802.11, it is not a CRC — the
//! mixing constants (10, 6 per byte; 3, 11, 15 in finalization) define wire
//! compatibility between station and AP, so they must not be changed.
//!
//! # Null-termination caveat
//!
//! [`fcs32`] treats its input as a null-terminated byte sequence and stops
//! at the first zero byte.  Applied to a binary frame header full of
//! zero-valued reserved fields this means the digest depends only on the
//! bytes up to the first zero — in practice only the leading `type` byte,
//! since the reserved `subtype` byte that follows it is always zero.  Both
//! sides of the protocol compute the digest the same way, so the exchange
//! stays self-consistent, but callers must not rely on it for spans with
//! embedded zeros.  This is inherited behavior, kept deliberately; see
//! DESIGN.md.

/// Compute the 32-bit FCS over `bytes`, stopping at the first zero byte.
///
/// Deterministic and order-sensitive.  All arithmetic is modulo 2^32.
/// The empty input (or a leading zero byte) hashes to `0`.
pub fn fcs32(bytes: &[u8]) -> u32 {
    let mut acc: u32 = 0;
    for &b in bytes {
        if b == 0 {
            break;
        }
        acc = acc.wrapping_add(u32::from(b));
        acc = acc.wrapping_add(acc << 10);
        acc ^= acc >> 6;
    }
    acc = acc.wrapping_add(acc << 3);
    acc ^= acc >> 11;
    acc = acc.wrapping_add(acc << 15);
    acc
}

/// Alternate FCS: hash an ASCII bitstring rendering of `bytes`.
///
/// Each input byte is expanded to eight `'0'`/`'1'` characters (MSB first),
/// `skip_front` / `skip_back` whole bytes' worth of bits are trimmed from
/// the respective ends, and the remaining text is hashed with [`fcs32`].
///
/// Not used by the active AP/station flow — it exists as an illustrative
/// alternative encoding (embedded zeros survive the expansion, so the
/// null-termination caveat above does not apply here).
pub fn fcs32_bitstring(bytes: &[u8], skip_front: usize, skip_back: usize) -> u32 {
    let mut bits = String::with_capacity(bytes.len() * 8);
    for &b in bytes {
        for j in (0..8).rev() {
            bits.push(if (b >> j) & 1 == 1 { '1' } else { '0' });
        }
    }
    let start = (skip_front * 8).min(bits.len());
    let end = bits.len().saturating_sub(skip_back * 8).max(start);
    fcs32(bits[start..end].as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_hashes_to_zero() {
        assert_eq!(fcs32(b""), 0);
    }

    #[test]
    fn leading_zero_byte_hashes_like_empty() {
        assert_eq!(fcs32(&[0, 1, 2, 3]), fcs32(b""));
    }

    #[test]
    fn deterministic() {
        assert_eq!(fcs32(b"Hello, this is a data payload"), fcs32(b"Hello, this is a data payload"));
    }

    #[test]
    fn order_sensitive() {
        assert_ne!(fcs32(b"ab"), fcs32(b"ba"));
    }

    #[test]
    fn single_byte_change_in_nonzero_prefix_changes_digest() {
        assert_ne!(fcs32(b"hello"), fcs32(b"hellp"));
        assert_ne!(fcs32(&[0x10]), fcs32(&[0x02]));
    }

    #[test]
    fn fcs_ignores_bytes_after_first_zero() {
        // Null-terminated semantics: everything past the first zero byte is
        // invisible to the digest.
        assert_eq!(fcs32(b"abc\0def"), fcs32(b"abc"));
        assert_eq!(fcs32(b"abc\0xyz123"), fcs32(b"abc\0"));
    }

    #[test]
    fn bitstring_variant_sees_embedded_zeros() {
        // The bitstring expansion turns zero bytes into "00000000" text, so
        // unlike fcs32 the digest depends on bytes past a zero.
        assert_ne!(
            fcs32_bitstring(&[1, 0, 2], 0, 0),
            fcs32_bitstring(&[1, 0, 3], 0, 0)
        );
    }

    #[test]
    fn bitstring_trimming_drops_edge_bytes() {
        // Trimming one byte from each end of [A, B, C] leaves B's bits.
        assert_eq!(
            fcs32_bitstring(&[0xAA, 0x5C, 0xFF], 1, 1),
            fcs32_bitstring(&[0x00, 0x5C, 0x11], 1, 1)
        );
    }

    #[test]
    fn bitstring_trim_larger_than_input_hashes_empty() {
        assert_eq!(fcs32_bitstring(&[0xFF], 4, 4), fcs32(b""));
    }
}

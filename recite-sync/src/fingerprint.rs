//! Row fingerprints: CRC-32 with a non-default polynomial.
//!
//! Persisted history columns hold these values, so the parameters and the
//! rendering (8 lowercase hex digits, zero-padded) are a compatibility
//! surface: changing either makes every row look changed on the next run.

use crc::{Algorithm, Crc};

use recite_core::types::Fingerprint;

/// Reflected CRC-32, polynomial 0x814141AB (0xD5828281 in reversed form).
pub const ROW_CHECKSUM: Algorithm<u32> = Algorithm {
    width: 32,
    poly: 0x8141_41ab,
    init: 0xffff_ffff,
    refin: true,
    refout: true,
    xorout: 0xffff_ffff,
    check: 0xa9cc_8179,
    residue: 0x90a5_4352,
};

const ROW_CRC: Crc<u32> = Crc::<u32>::new(&ROW_CHECKSUM);

/// Fingerprint of a row's raw UTF-8 bytes.
pub fn fingerprint(text: &str) -> Fingerprint {
    let sum = ROW_CRC.checksum(text.as_bytes());
    Fingerprint(hex::encode(sum.to_be_bytes()))
}

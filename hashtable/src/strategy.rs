use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::io::Cursor;
use std::num::NonZeroUsize;

use hmac::{Hmac, Mac};
use md5::Md5;
use murmur3::murmur3_x64_128;
use rustc_hash::FxHasher;
use sha2::{Digest, Sha256};
use xxhash_rust::xxh32::xxh32;

/// The bucket-index algorithms a table can be constructed with.
///
/// Each variant is a pure function from a key and a capacity to an index in
/// `[0, capacity)`. A selection is fixed at table construction and reused for
/// every operation on that table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashKind {
    /// Raw content hash reduced modulo the capacity.
    Division,
    /// Knuth's multiplicative method with the reciprocal golden ratio.
    Multiplication,
    /// Leading four bytes of a SHA-256 digest of the key encoding.
    Sha256,
    /// Character-code sum over the hex form of an HMAC-MD5 digest. The key
    /// material and the message are both the key encoding; this is a demo
    /// construction, not adversarial hardening.
    HmacMd5,
    /// 32-bit xxHash of the key encoding, seed 0.
    XxHash32,
    /// Low four bytes of a 128-bit x64 MurmurHash3 digest of the key encoding.
    Murmur3,
}

impl HashKind {
    /// Catalog of every strategy, in selection order. Driver code iterates
    /// this to label and select algorithms.
    pub const ALL: [HashKind; 6] = [
        HashKind::Division,
        HashKind::Multiplication,
        HashKind::Sha256,
        HashKind::HmacMd5,
        HashKind::XxHash32,
        HashKind::Murmur3,
    ];

    /// Display label for reporting.
    pub fn name(self) -> &'static str {
        match self {
            HashKind::Division => "division",
            HashKind::Multiplication => "multiplication",
            HashKind::Sha256 => "sha256",
            HashKind::HmacMd5 => "hmac-md5",
            HashKind::XxHash32 => "xxhash32",
            HashKind::Murmur3 => "murmur3",
        }
    }

    /// Maps `key` to a bucket index in `[0, capacity)`.
    pub fn index<K: Hash + Display>(self, key: &K, capacity: NonZeroUsize) -> usize {
        let capacity = capacity.get();
        match self {
            HashKind::Division => (raw_hash(key) % capacity as u64) as usize,
            HashKind::Multiplication => {
                let golden = (5.0_f64.sqrt() - 1.0) / 2.0;
                let frac = (raw_hash(key) as f64 * golden).fract();
                (capacity as f64 * frac) as usize % capacity
            }
            HashKind::Sha256 => {
                let digest = Sha256::digest(key_encoding(key).as_bytes());
                let lead = i32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
                lead.unsigned_abs() as usize % capacity
            }
            HashKind::HmacMd5 => {
                let encoding = key_encoding(key);
                let mut mac = Hmac::<Md5>::new_from_slice(encoding.as_bytes())
                    .expect("HMAC accepts key material of any length");
                mac.update(encoding.as_bytes());
                let digest = mac.finalize().into_bytes();
                let sum: usize = digest
                    .iter()
                    .copied()
                    .flat_map(|byte| {
                        [
                            HEX_UPPER[(byte >> 4) as usize],
                            HEX_UPPER[(byte & 0x0f) as usize],
                        ]
                    })
                    .map(|digit| digit as usize)
                    .sum();
                sum % capacity
            }
            HashKind::XxHash32 => {
                let word = xxh32(key_encoding(key).as_bytes(), 0) as i32;
                word.unsigned_abs() as usize % capacity
            }
            HashKind::Murmur3 => {
                let encoding = key_encoding(key);
                let digest = murmur3_x64_128(&mut Cursor::new(encoding.as_bytes()), 0)
                    .expect("reading from an in-memory buffer cannot fail");
                (digest as u32 as i32).unsigned_abs() as usize % capacity
            }
        }
    }
}

const HEX_UPPER: [u8; 16] = *b"0123456789ABCDEF";

/// Stable 64-bit content hash backing the division and multiplication methods.
fn raw_hash<K: Hash>(key: &K) -> u64 {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Textual form of the key consumed by the digest-based methods. An empty
/// encoding marks a key the tables refuse to store.
pub(crate) fn key_encoding<K: Display>(key: &K) -> String {
    key.to_string()
}

//! Stable content fingerprint over a fact's sorted (key, value) pairs.
//!
//! Deliberately not a cryptographic hash and not seeded randomly: the
//! fingerprint must be identical across runs and across processes for
//! deduplication and snapshot round-trips to agree, so a plain FNV-1a over a
//! canonical byte encoding is used instead of `std::hash::Hash` (whose
//! default `SipHash` is randomly seeded per process).

use dlrete_lexicon::{Symbol, Value};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

struct Fnv1a(u64);

impl Fnv1a {
    fn new() -> Self {
        Fnv1a(FNV_OFFSET)
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }

    fn write_u8(&mut self, tag: u8) {
        self.write(&[tag]);
    }

    fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }
}

fn hash_value(h: &mut Fnv1a, v: &Value) {
    match v {
        Value::Symbol(s) => {
            h.write_u8(0);
            h.write_u64(s.as_u32() as u64);
        }
        Value::Int(i) => {
            h.write_u8(1);
            h.write_u64(*i as u64);
        }
        Value::Float(f) => {
            h.write_u8(2);
            h.write_u64(f.to_bits());
        }
        Value::Bool(b) => {
            h.write_u8(3);
            h.write_u8(*b as u8);
        }
        Value::Str(s) => {
            h.write_u8(4);
            h.write_u64(s.len() as u64);
            h.write(s.as_bytes());
        }
        Value::Null => h.write_u8(5),
    }
}

/// Compute the fingerprint of a fact from its attribute pairs. Order of
/// `attrs` does not matter — pairs are sorted by symbol id before hashing,
/// so two facts built with attributes in different orders but the same
/// content fingerprint identically.
pub fn fingerprint(attrs: &[(Symbol, Value)]) -> u64 {
    let mut sorted: Vec<&(Symbol, Value)> = attrs.iter().collect();
    sorted.sort_unstable_by_key(|(k, _)| k.as_u32());

    let mut h = Fnv1a::new();
    h.write_u64(sorted.len() as u64);
    for (k, v) in sorted {
        h.write_u64(k.as_u32() as u64);
        hash_value(&mut h, v);
    }
    h.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlrete_lexicon::SymbolTable;

    #[test]
    fn order_independent() {
        let t = SymbolTable::new();
        let a = t.intern("a");
        let b = t.intern("b");
        let f1 = vec![(a, Value::Int(1)), (b, Value::Int(2))];
        let f2 = vec![(b, Value::Int(2)), (a, Value::Int(1))];
        assert_eq!(fingerprint(&f1), fingerprint(&f2));
    }

    #[test]
    fn distinguishes_kinds() {
        let t = SymbolTable::new();
        let a = t.intern("a");
        let f1 = vec![(a, Value::Int(1))];
        let f2 = vec![(a, Value::Str("1".into()))];
        assert_ne!(fingerprint(&f1), fingerprint(&f2));
    }
}

// Property tests for the tagged-word representation.
//
// These pin the fundamental invariants the generated code relies on:
// round-trip fidelity, tag discrimination, and the fixed boolean words.

use proptest::prelude::*;
use sable::value::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // =========================================================================
    // Round-trips
    // =========================================================================

    #[test]
    fn fixnum_roundtrip(v in -(1i64 << 29)..(1i64 << 29)) {
        prop_assert_eq!(decode_fixnum(encode_fixnum(v)), v);
    }

    #[test]
    fn char_roundtrip(c in 0u8..128) {
        let c = c as char;
        prop_assert_eq!(decode_char(encode_char(c)), c);
    }

    #[test]
    fn bool_roundtrip(b in prop::bool::ANY) {
        prop_assert_eq!(decode_bool(encode_bool(b)), b);
    }

    // =========================================================================
    // Tag discrimination
    // =========================================================================

    #[test]
    fn fixnum_low_bits_are_clear(v in -(1i64 << 29)..(1i64 << 29)) {
        prop_assert_eq!(encode_fixnum(v) & FIXNUM_MASK, 0);
    }

    #[test]
    fn exactly_one_tag_for_fixnum(v in -(1i64 << 29)..(1i64 << 29)) {
        let w = encode_fixnum(v);
        let count = is_fixnum(w) as u8 + is_bool(w) as u8 + is_char(w) as u8
            + is_nil(w) as u8 + is_pair(w) as u8;
        prop_assert_eq!(count, 1, "word {:#x} matched {} tags", w, count);
    }

    #[test]
    fn exactly_one_tag_for_char(c in 0u8..128) {
        let w = encode_char(c as char);
        let count = is_fixnum(w) as u8 + is_bool(w) as u8 + is_char(w) as u8
            + is_nil(w) as u8 + is_pair(w) as u8;
        prop_assert_eq!(count, 1, "word {:#x} matched {} tags", w, count);
    }

    #[test]
    fn exactly_one_tag_for_bool(b in prop::bool::ANY) {
        let w = encode_bool(b);
        let count = is_fixnum(w) as u8 + is_bool(w) as u8 + is_char(w) as u8
            + is_nil(w) as u8 + is_pair(w) as u8;
        prop_assert_eq!(count, 1, "word {:#x} matched {} tags", w, count);
    }

    #[test]
    fn distinct_fixnums_encode_distinctly(
        a in -(1i64 << 29)..(1i64 << 29),
        b in -(1i64 << 29)..(1i64 << 29),
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(encode_fixnum(a), encode_fixnum(b));
    }
}

// =========================================================================
// Fixed words (no generation needed)
// =========================================================================

#[test]
fn true_word() {
    assert_eq!(encode_bool(true), 0x9f);
}

#[test]
fn false_word() {
    assert_eq!(encode_bool(false), 0x1f);
}

#[test]
fn nil_word_is_not_false() {
    assert_ne!(NIL_TAG, encode_bool(false));
    assert!(is_nil(NIL_TAG));
    assert!(!is_bool(NIL_TAG));
}

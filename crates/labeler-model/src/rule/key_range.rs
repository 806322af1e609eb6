use serde::{Deserialize, Serialize};

use crate::{
    RULE_TYPE_KEY_RANGE,
    error::{ModelError, ModelResult},
    rule::{IntoRuleContent, RuleContent},
};

/// Loosely-typed payload of a `key-range` rule as it appears on the wire.
///
/// Both keys are hex strings; an empty string means "no bound on this side".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRangeRuleConfig {
    #[serde(default)]
    pub start_key: String,
    #[serde(default)]
    pub end_key: String,
}

/// Decoded `key-range` payload: `[start_key, end_key)` over raw bytes.
///
/// An empty `start_key` is -inf and an empty `end_key` is +inf.
/// When both are set, `start_key < end_key` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyRangeRule {
    start_key: Vec<u8>,
    end_key: Vec<u8>,
}

impl KeyRangeRule {
    /// Build a range from raw keys, rejecting inverted or empty ranges.
    pub fn new(start_key: impl Into<Vec<u8>>, end_key: impl Into<Vec<u8>>) -> ModelResult<Self> {
        let start_key = start_key.into();
        let end_key = end_key.into();

        if !start_key.is_empty() && !end_key.is_empty() && start_key >= end_key {
            return Err(ModelError::InvalidKeyRange {
                start: hex::encode(&start_key),
                end: hex::encode(&end_key),
            });
        }
        Ok(Self { start_key, end_key })
    }

    /// Range covering the whole keyspace.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Build a range from hex-encoded keys.
    pub fn from_hex(start_key: &str, end_key: &str) -> ModelResult<Self> {
        let start = decode_key("start_key", start_key)?;
        let end = decode_key("end_key", end_key)?;
        Self::new(start, end)
    }

    #[inline]
    pub fn start_key(&self) -> &[u8] {
        &self.start_key
    }

    #[inline]
    pub fn end_key(&self) -> &[u8] {
        &self.end_key
    }

    /// Returns `true` if `[start_key, end_key)` lies entirely inside this range.
    ///
    /// Overlap alone is not enough: both ends of the queried range must be covered.
    pub fn contains(&self, start_key: &[u8], end_key: &[u8]) -> bool {
        let start_ok = self.start_key.as_slice() <= start_key;
        let end_ok = self.end_key.is_empty()
            || (!end_key.is_empty() && end_key <= self.end_key.as_slice());
        start_ok && end_ok
    }

    /// Wire representation with hex-encoded keys.
    pub fn to_config(&self) -> KeyRangeRuleConfig {
        KeyRangeRuleConfig {
            start_key: hex::encode(&self.start_key),
            end_key: hex::encode(&self.end_key),
        }
    }
}

impl IntoRuleContent for KeyRangeRule {
    const RULE_TYPE: &'static str = RULE_TYPE_KEY_RANGE;
    type Config = KeyRangeRuleConfig;

    fn from_config(config: Self::Config) -> ModelResult<RuleContent> {
        Self::from_hex(&config.start_key, &config.end_key).map(RuleContent::KeyRange)
    }
}

fn decode_key(field: &str, raw: &str) -> ModelResult<Vec<u8>> {
    hex::decode(raw).map_err(|e| ModelError::InvalidRuleContent {
        rule_type: RULE_TYPE_KEY_RANGE.to_string(),
        reason: format!("{field} {raw:?}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_decodes_both_keys() {
        let r = KeyRangeRule::from_hex("12abcd", "34cdef").unwrap();
        assert_eq!(r.start_key(), &[0x12, 0xab, 0xcd]);
        assert_eq!(r.end_key(), &[0x34, 0xcd, 0xef]);
    }

    #[test]
    fn empty_hex_means_unbounded() {
        let r = KeyRangeRule::from_hex("", "").unwrap();
        assert_eq!(r, KeyRangeRule::unbounded());
        assert!(r.contains(b"", b""));
        assert!(r.contains(b"\x00", b"\xff\xff"));
    }

    #[test]
    fn rejects_bad_hex() {
        for (start, end) in [("123", "abcd"), ("abcd", "123"), ("zz", ""), ("", "0g")] {
            let err = KeyRangeRule::from_hex(start, end).unwrap_err();
            assert!(
                matches!(err, ModelError::InvalidRuleContent { .. }),
                "({start:?}, {end:?}) gave {err:?}"
            );
        }
    }

    #[test]
    fn rejects_inverted_and_empty_ranges() {
        for (start, end) in [("abcd", "1234"), ("abcd", "abcd"), ("abcd00", "abcd")] {
            let err = KeyRangeRule::from_hex(start, end).unwrap_err();
            assert!(
                matches!(err, ModelError::InvalidKeyRange { .. }),
                "({start:?}, {end:?}) gave {err:?}"
            );
        }
    }

    #[test]
    fn one_sided_ranges_skip_ordering_check() {
        assert!(KeyRangeRule::from_hex("ffff", "").is_ok());
        assert!(KeyRangeRule::from_hex("", "0000").is_ok());
    }

    #[test]
    fn contains_is_containment_not_overlap() {
        let r = KeyRangeRule::new(vec![0x12u8, 0x34], vec![0x56u8, 0x78]).unwrap();

        assert!(r.contains(&[0x12, 0x34], &[0x56, 0x78]));
        assert!(r.contains(&[0x20], &[0x30]));
        assert!(!r.contains(&[0x12, 0x34], &[0xaa, 0xaa]));
        assert!(!r.contains(&[0x00], &[0x20]));
        // unbounded query end is never inside a bounded rule end
        assert!(!r.contains(&[0x20], &[]));
        // unbounded query start is only inside an unbounded rule start
        assert!(!r.contains(&[], &[0x20]));
    }

    #[test]
    fn half_bounded_rules() {
        let tail = KeyRangeRule::new(vec![0x80u8], Vec::<u8>::new()).unwrap();
        assert!(tail.contains(&[0x90], &[]));
        assert!(!tail.contains(&[0x70], &[0x90]));

        let head = KeyRangeRule::new(Vec::<u8>::new(), vec![0x80u8]).unwrap();
        assert!(head.contains(&[], &[0x80]));
        assert!(!head.contains(&[0x10], &[0x81]));
    }

    #[test]
    fn config_roundtrip_is_lowercase_hex() {
        let r = KeyRangeRule::from_hex("ABCD", "EF01").unwrap();
        let cfg = r.to_config();
        assert_eq!(cfg.start_key, "abcd");
        assert_eq!(cfg.end_key, "ef01");
        assert_eq!(KeyRangeRule::from_hex(&cfg.start_key, &cfg.end_key).unwrap(), r);
    }
}

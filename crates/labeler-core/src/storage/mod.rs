//! Persistence seam for label rules.
//!
//! The labeler only needs a flat string-keyed byte store. Values are the JSON form of
//! [`labeler_model::LabelRule`]; keys come from [`crate::LabelerConfig::rule_key`].
use thiserror::Error;
use tracing::warn;

mod memory;
pub use memory::MemoryKv;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Single write inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvOp {
    Put { key: String, value: Vec<u8> },
    Delete { key: String },
}

impl KvOp {
    pub fn key(&self) -> &str {
        match self {
            KvOp::Put { key, .. } | KvOp::Delete { key } => key,
        }
    }
}

/// Durable key-value store used to mirror the rule set.
pub trait KvStore: Send + Sync {
    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()>;

    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// All entries whose key starts with `prefix`, ordered by key.
    fn load_all(&self, prefix: &str) -> StorageResult<Vec<(String, Vec<u8>)>>;

    /// Apply `ops` in order, all or nothing.
    ///
    /// The default snapshots every touched key with [`KvStore::get`], applies the ops one
    /// by one and, on the first failure, writes the snapshot back before returning the error.
    /// Backends with native transactions should override this.
    fn write_batch(&self, ops: &[KvOp]) -> StorageResult<()> {
        let mut snapshot: Vec<(&str, Option<Vec<u8>>)> = Vec::new();
        for op in ops {
            if !snapshot.iter().any(|(key, _)| *key == op.key()) {
                snapshot.push((op.key(), self.get(op.key())?));
            }
        }

        for (applied, op) in ops.iter().enumerate() {
            let res = match op {
                KvOp::Put { key, value } => self.put(key, value),
                KvOp::Delete { key } => self.delete(key),
            };
            if let Err(e) = res {
                restore(self, &snapshot, &ops[..applied]);
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Write back the pre-batch value of every key touched by `applied`.
fn restore<S: KvStore + ?Sized>(
    store: &S,
    snapshot: &[(&str, Option<Vec<u8>>)],
    applied: &[KvOp],
) {
    for (key, previous) in snapshot.iter().rev() {
        if !applied.iter().any(|op| op.key() == *key) {
            continue;
        }
        let res = match previous {
            Some(value) => store.put(key, value),
            None => store.delete(key),
        };
        if let Err(e) = res {
            warn!(key = %key, error = %e, "failed to roll back batch write");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Store without a batch override whose `fail_at`-th write fails once.
    struct CountdownKv {
        inner: MemoryKv,
        writes: AtomicUsize,
        fail_at: usize,
    }

    impl CountdownKv {
        fn new(fail_at: usize) -> Self {
            Self {
                inner: MemoryKv::new(),
                writes: AtomicUsize::new(0),
                fail_at,
            }
        }

        fn tick(&self) -> StorageResult<()> {
            if self.writes.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_at {
                return Err(StorageError::Backend("injected write failure".into()));
            }
            Ok(())
        }
    }

    impl KvStore for CountdownKv {
        fn put(&self, key: &str, value: &[u8]) -> StorageResult<()> {
            self.tick()?;
            self.inner.put(key, value)
        }

        fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
            self.inner.get(key)
        }

        fn delete(&self, key: &str) -> StorageResult<()> {
            self.tick()?;
            self.inner.delete(key)
        }

        fn load_all(&self, prefix: &str) -> StorageResult<Vec<(String, Vec<u8>)>> {
            self.inner.load_all(prefix)
        }
    }

    fn put(key: &str, value: &[u8]) -> KvOp {
        KvOp::Put {
            key: key.into(),
            value: value.to_vec(),
        }
    }

    #[test]
    fn default_batch_applies_everything() {
        let kv = CountdownKv::new(usize::MAX);
        kv.put("a", b"1").unwrap();

        kv.write_batch(&[KvOp::Delete { key: "a".into() }, put("b", b"2")])
            .unwrap();

        assert_eq!(kv.get("a").unwrap(), None);
        assert_eq!(kv.get("b").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn default_batch_rolls_back_on_failure() {
        // Writes 1 and 2 seed the store, so the batch fails on its third op.
        let kv = CountdownKv::new(5);
        kv.put("a", b"1").unwrap();
        kv.put("b", b"2").unwrap();

        let err = kv.write_batch(&[
            KvOp::Delete { key: "a".into() },
            put("b", b"20"),
            put("c", b"3"),
        ]);

        assert!(matches!(err, Err(StorageError::Backend(_))));
        assert_eq!(kv.get("a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(kv.get("b").unwrap(), Some(b"2".to_vec()));
        assert_eq!(kv.get("c").unwrap(), None);
    }

    #[test]
    fn default_batch_restores_key_touched_twice() {
        let kv = CountdownKv::new(4);
        kv.put("k", b"old").unwrap();

        let err = kv.write_batch(&[
            KvOp::Delete { key: "k".into() },
            put("k", b"new"),
            put("j", b"j"),
        ]);

        assert!(err.is_err());
        assert_eq!(kv.get("k").unwrap(), Some(b"old".to_vec()));
        assert_eq!(kv.get("j").unwrap(), None);
    }
}

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::storage::{KvOp, KvStore, StorageResult};

/// In-process [`KvStore`] backed by a sorted map.
///
/// Batches are applied under a single write lock, so they are atomic.
#[derive(Debug, Default)]
pub struct MemoryKv {
    data: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl KvStore for MemoryKv {
    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        self.data.write().insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.data.write().remove(key);
        Ok(())
    }

    fn load_all(&self, prefix: &str) -> StorageResult<Vec<(String, Vec<u8>)>> {
        let data = self.data.read();
        Ok(data
            .range(prefix.to_owned()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn write_batch(&self, ops: &[KvOp]) -> StorageResult<()> {
        let mut data = self.data.write();
        for op in ops {
            match op {
                KvOp::Put { key, value } => {
                    data.insert(key.clone(), value.clone());
                }
                KvOp::Delete { key } => {
                    data.remove(key);
                }
            }
        }
        Ok(())
    }
}

use std::collections::BTreeSet;

use crate::app::{KeyValue, MapReduceApp};
use crate::wordcount::words;

/// Índice invertido: para cada palabra, en qué documentos aparece.
#[derive(Debug, Clone, Copy, Default)]
pub struct Indexer;

impl MapReduceApp for Indexer {
    fn map(&self, filename: &str, contents: &str) -> Vec<KeyValue> {
        let distinct: BTreeSet<&str> = words(contents).collect();
        distinct
            .into_iter()
            .map(|w| KeyValue::new(w, filename))
            .collect()
    }

    /// Salida: "<n> doc1,doc2,..." con los documentos ordenados y sin repetir.
    fn reduce(&self, _key: &str, values: &[String]) -> String {
        let docs: BTreeSet<&str> = values.iter().map(String::as_str).collect();
        let joined = docs.iter().copied().collect::<Vec<_>>().join(",");
        format!("{} {}", docs.len(), joined)
    }
}

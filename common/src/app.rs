use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{indexer::Indexer, wordcount::WordCount};

/// Par clave/valor emitido por `map`. Es también el formato de cada línea
/// de los shards intermedios.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Funciones de usuario de un job map/reduce.
///
/// El coordinador nunca las ve; sólo el worker y el runner secuencial.
pub trait MapReduceApp: Send + Sync {
    /// `filename` es el archivo de entrada y `contents` su contenido completo.
    fn map(&self, filename: &str, contents: &str) -> Vec<KeyValue>;

    /// Se llama una vez por clave distinta con todos sus valores.
    fn reduce(&self, key: &str, values: &[String]) -> String;
}

/// Nombres aceptados por `MR_APP` / `--app`.
pub const APP_NAMES: &[&str] = &["wc", "indexer"];

/// Busca una aplicación incorporada por nombre.
pub fn app_by_name(name: &str) -> Option<Arc<dyn MapReduceApp>> {
    match name {
        "wc" | "wordcount" => Some(Arc::new(WordCount)),
        "indexer" => Some(Arc::new(Indexer)),
        _ => None,
    }
}

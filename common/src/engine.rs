use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::app::{KeyValue, MapReduceApp};
use crate::error::{EngineError, EngineResult};
use crate::partition::{output_name, partition_for, publish_atomically, shard_name, shard_path};
use crate::task::{Assignment, TaskKind};

/// Ejecuta una tarea asignada por el coordinador dentro de `work_dir`.
pub fn execute(app: &dyn MapReduceApp, task: &Assignment, work_dir: &Path) -> EngineResult<()> {
    fs::create_dir_all(work_dir).map_err(|e| EngineError::io(work_dir, e))?;

    match task.kind {
        TaskKind::Map => {
            let input = task
                .input
                .as_deref()
                .ok_or(EngineError::MissingInput(task.index))?;
            execute_map(app, task.index, input, task.n_reduce, work_dir)?;
        }
        TaskKind::Reduce => {
            execute_reduce(app, task.index, task.n_map, work_dir)?;
        }
    }

    Ok(())
}

/* =========================
   Fase map
   ========================= */

/// Reparte los pares en `n_reduce` buckets según `ihash(key) % n_reduce`.
pub fn partition_pairs(pairs: Vec<KeyValue>, n_reduce: usize) -> Vec<Vec<KeyValue>> {
    let mut buckets: Vec<Vec<KeyValue>> = vec![Vec::new(); n_reduce];
    for kv in pairs {
        let pid = partition_for(&kv.key, n_reduce);
        buckets[pid].push(kv);
    }
    buckets
}

/// Lee `input`, aplica `map` y publica los R shards `mr-<map_index>-<r>`.
///
/// Se publican también los shards vacíos: cada reduce espera encontrar
/// exactamente M archivos. Devuelve las rutas publicadas.
pub fn execute_map(
    app: &dyn MapReduceApp,
    map_index: usize,
    input: &str,
    n_reduce: usize,
    work_dir: &Path,
) -> EngineResult<Vec<PathBuf>> {
    if n_reduce == 0 {
        return Err(EngineError::NoPartitions);
    }

    let contents = fs::read_to_string(input).map_err(|e| EngineError::io(input, e))?;
    let pairs = app.map(input, &contents);
    debug!("map {} emitió {} pares desde {}", map_index, pairs.len(), input);

    let buckets = partition_pairs(pairs, n_reduce);

    let mut published = Vec::with_capacity(n_reduce);
    for (reduce_index, bucket) in buckets.iter().enumerate() {
        let name = shard_name(map_index, reduce_index);
        let path = publish_atomically(work_dir, &name, |w| {
            for kv in bucket {
                serde_json::to_writer(&mut *w, kv)?;
                w.write_all(b"\n")?;
            }
            Ok(())
        })
        .map_err(|e| EngineError::io(work_dir.join(&name), e))?;
        published.push(path);
    }

    Ok(published)
}

/* =========================
   Fase reduce
   ========================= */

/// Lee un shard intermedio (JSONL de `KeyValue`).
pub fn read_shard(path: &Path) -> EngineResult<Vec<KeyValue>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(EngineError::MissingShard(path.to_path_buf()))
        }
        Err(e) => return Err(EngineError::io(path, e)),
    };

    let mut out = Vec::new();
    for (n, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| EngineError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let kv: KeyValue = serde_json::from_str(&line).map_err(|e| EngineError::Decode {
            path: path.to_path_buf(),
            line: n + 1,
            source: e,
        })?;
        out.push(kv);
    }

    Ok(out)
}

/// Agrupa todos los valores de cada clave, sin importar el orden de llegada.
pub fn group_by_key<I>(pairs: I) -> BTreeMap<String, Vec<String>>
where
    I: IntoIterator<Item = KeyValue>,
{
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for kv in pairs {
        groups.entry(kv.key).or_default().push(kv.value);
    }
    groups
}

/// Junta los M shards de la partición, agrupa por clave, aplica `reduce`
/// una vez por clave y publica `mr-out-<reduce_index>` con líneas "clave valor".
pub fn execute_reduce(
    app: &dyn MapReduceApp,
    reduce_index: usize,
    n_map: usize,
    work_dir: &Path,
) -> EngineResult<PathBuf> {
    let mut pairs = Vec::new();
    for map_index in 0..n_map {
        let path = shard_path(work_dir, map_index, reduce_index);
        pairs.extend(read_shard(&path)?);
    }
    debug!(
        "reduce {} juntó {} pares de {} shards",
        reduce_index,
        pairs.len(),
        n_map
    );

    let groups = group_by_key(pairs);

    let name = output_name(reduce_index);
    publish_atomically(work_dir, &name, |w| {
        for (key, values) in &groups {
            let output = app.reduce(key, values);
            writeln!(w, "{} {}", key, output)?;
        }
        Ok(())
    })
    .map_err(|e| EngineError::io(work_dir.join(&name), e))
}

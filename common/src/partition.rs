//! Convenciones de nombres y particionado que permiten que M mappers y R
//! reducers se encuentren en disco sin pasar datos por el coordinador.

use std::{
    hash::Hasher,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

/// Hash de una clave intermedia: FNV-1a de 64 bits recortado a 31 bits,
/// siempre no negativo.
pub fn ihash(key: &str) -> u32 {
    let mut hasher = fnv::FnvHasher::default();
    hasher.write(key.as_bytes());
    (hasher.finish() & 0x7fff_ffff) as u32
}

/// Partición de reduce que le toca a `key`: `ihash(key) % n_reduce`.
pub fn partition_for(key: &str, n_reduce: usize) -> usize {
    ihash(key) as usize % n_reduce
}

/// Shard intermedio escrito por el map `map_index` para el reduce `reduce_index`.
pub fn shard_name(map_index: usize, reduce_index: usize) -> String {
    format!("mr-{}-{}", map_index, reduce_index)
}

/// Archivo final de la partición `reduce_index`.
pub fn output_name(reduce_index: usize) -> String {
    format!("mr-out-{}", reduce_index)
}

pub fn shard_path(dir: &Path, map_index: usize, reduce_index: usize) -> PathBuf {
    dir.join(shard_name(map_index, reduce_index))
}

pub fn output_path(dir: &Path, reduce_index: usize) -> PathBuf {
    dir.join(output_name(reduce_index))
}

/// Escribe en un temporal dentro de `dir` y lo renombra a `final_name`.
///
/// El rename es atómico en el mismo sistema de archivos: si dos ejecuciones
/// de la misma tarea compiten, gana la última completa y nunca se mezclan.
pub fn publish_atomically<F>(dir: &Path, final_name: &str, write: F) -> io::Result<PathBuf>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        write(&mut writer)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;

    let final_path = dir.join(final_name);
    tmp.persist(&final_path)?;
    Ok(final_path)
}

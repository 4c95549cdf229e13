use std::{fs, path::Path};

use anyhow::{Context, Result};

use crate::app::MapReduceApp;
use crate::engine::group_by_key;
use crate::partition::publish_atomically;

/// Ejecuta el job completo en un solo proceso y escribe todas las claves en
/// `output_path`. Sirve como referencia para comparar con la versión distribuida.
pub fn run_sequential<P: AsRef<Path>>(
    app: &dyn MapReduceApp,
    files: &[P],
    output_path: &Path,
) -> Result<usize> {
    let mut intermediate = Vec::new();
    for f in files {
        let f = f.as_ref();
        let contents =
            fs::read_to_string(f).with_context(|| format!("no se pudo leer {}", f.display()))?;
        intermediate.extend(app.map(&f.to_string_lossy(), &contents));
    }

    let groups = group_by_key(intermediate);

    let dir = match output_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let name = output_path
        .file_name()
        .context("la ruta de salida no tiene nombre de archivo")?
        .to_string_lossy()
        .to_string();

    publish_atomically(dir, &name, |w| {
        for (key, values) in &groups {
            writeln!(w, "{} {}", key, app.reduce(key, values))?;
        }
        Ok(())
    })
    .with_context(|| format!("no se pudo escribir {}", output_path.display()))?;

    Ok(groups.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::Indexer;
    use crate::wordcount::WordCount;
    use tempfile::TempDir;

    #[test]
    fn run_sequential_wordcount_sobre_dos_archivos() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.txt");
        let b = tmp.path().join("b.txt");
        fs::write(&a, "the cat\nthe dog").unwrap();
        fs::write(&b, "a dog").unwrap();
        let out = tmp.path().join("out").join("mr-out-0");

        let keys = run_sequential(&WordCount, &[&a, &b], &out).unwrap();

        assert_eq!(keys, 4);
        let content = fs::read_to_string(&out).unwrap();
        assert_eq!(content, "a 1\ncat 1\ndog 2\nthe 2\n");
    }

    #[test]
    fn run_sequential_indexer_lista_documentos() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.txt");
        let b = tmp.path().join("b.txt");
        fs::write(&a, "x y").unwrap();
        fs::write(&b, "y").unwrap();
        let out = tmp.path().join("mr-out-0");

        run_sequential(&Indexer, &[&a, &b], &out).unwrap();

        let content = fs::read_to_string(&out).unwrap();
        let y_line = content.lines().find(|l| l.starts_with("y ")).unwrap();
        assert!(y_line.starts_with("y 2 "));
    }

    #[test]
    fn run_sequential_falla_si_falta_un_archivo() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("no_existe.txt");
        let out = tmp.path().join("mr-out-0");

        assert!(run_sequential(&WordCount, &[&missing], &out).is_err());
        assert!(!out.exists());
    }
}

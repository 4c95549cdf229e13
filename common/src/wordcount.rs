use crate::app::{KeyValue, MapReduceApp};

/// WordCount: una clave por palabra (secuencia máxima de letras), valor "1".
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCount;

/// Parte el texto en palabras: todo lo que no es letra separa.
pub(crate) fn words(contents: &str) -> impl Iterator<Item = &str> {
    contents
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
}

impl MapReduceApp for WordCount {
    fn map(&self, _filename: &str, contents: &str) -> Vec<KeyValue> {
        words(contents).map(|w| KeyValue::new(w, "1")).collect()
    }

    fn reduce(&self, _key: &str, values: &[String]) -> String {
        values.len().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_emite_un_par_por_palabra() {
        let out = WordCount.map("in.txt", "This is a test");

        assert_eq!(
            out,
            vec![
                KeyValue::new("This", "1"),
                KeyValue::new("is", "1"),
                KeyValue::new("a", "1"),
                KeyValue::new("test", "1"),
            ]
        );
    }

    /// Signos, números y saltos de línea separan palabras.
    #[test]
    fn map_ignora_signos_y_numeros() {
        let out = WordCount.map("in.txt", "Hola, hola!!\nmundo42mundo  ");
        let keys: Vec<&str> = out.iter().map(|kv| kv.key.as_str()).collect();

        assert_eq!(keys, vec!["Hola", "hola", "mundo", "mundo"]);
    }

    #[test]
    fn map_sobre_texto_vacio_no_emite_nada() {
        assert!(WordCount.map("in.txt", "  \n ").is_empty());
    }

    #[test]
    fn reduce_cuenta_los_valores() {
        let values = vec!["1".to_string(), "1".to_string(), "1".to_string()];
        assert_eq!(WordCount.reduce("test", &values), "3");
    }
}

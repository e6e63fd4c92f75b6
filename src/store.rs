use crate::prelude::*;
use std::path::Path;

/// The shared word sequence. Loaded once, never written afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordStore {
    words: Box<[String]>,
}

/// A contiguous run of words cut out of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub words: &'a [String],
    pub end_of_stream: bool,
}

impl WordStore {
    /// Reads a word file. Tokens are separated by commas or newlines, blank
    /// tokens are skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Resource {
            path: path.to_owned(),
            source,
        })?;
        let words = text
            .split(|c: char| c == ',' || c == '\n')
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_owned);
        Self::from_words(words).map_err(|_| Error::EmptySource { path: path.to_owned() })
    }

    pub fn from_words<I>(words: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let words: Box<[String]> = words.into_iter().map(Into::into).collect();
        if words.is_empty() {
            return Err(Error::EmptySource { path: Default::default() });
        }
        Ok(Self { words })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Cuts `count` words starting at `offset`, clamped to the end of the
    /// store. `end_of_stream` is set whenever the cut reaches the last word.
    pub fn slice(&self, offset: i64, count: i64) -> Result<Chunk<'_>> {
        if offset < 0 || count <= 0 {
            return Err(Error::InvalidRequest { offset, count });
        }
        let len = self.words.len();
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        if start >= len {
            return Ok(Chunk { words: &[], end_of_stream: true });
        }
        let end = start.saturating_add(usize::try_from(count).unwrap_or(usize::MAX));
        if end >= len {
            Ok(Chunk { words: &self.words[start..], end_of_stream: true })
        } else {
            Ok(Chunk { words: &self.words[start..end], end_of_stream: false })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn animals() -> WordStore {
        WordStore::from_words(["cat", "bat", "cat", "dog", "dog", "emu", "emu", "emu", "ant"]).unwrap()
    }

    fn words<'a>(chunk: &Chunk<'a>) -> Vec<&'a str> {
        chunk.words.iter().map(String::as_str).collect()
    }

    #[test]
    fn slices_within_bounds() {
        let store = animals();
        let chunk = store.slice(0, 5).unwrap();
        assert_eq!(words(&chunk), ["cat", "bat", "cat", "dog", "dog"]);
        assert!(!chunk.end_of_stream);
    }

    #[test]
    fn slice_reaching_the_end_is_clamped() {
        let store = animals();
        let chunk = store.slice(5, 10).unwrap();
        assert_eq!(words(&chunk), ["emu", "emu", "emu", "ant"]);
        assert!(chunk.end_of_stream);

        // exactly touching the last word also ends the stream
        let chunk = store.slice(4, 5).unwrap();
        assert_eq!(chunk.words.len(), 5);
        assert!(chunk.end_of_stream);
    }

    #[test]
    fn slice_past_the_end_is_empty() {
        let store = animals();
        for offset in [9, 10, i64::MAX] {
            let chunk = store.slice(offset, 5).unwrap();
            assert!(chunk.words.is_empty());
            assert!(chunk.end_of_stream);
        }
        let chunk = store.slice(3, i64::MAX).unwrap();
        assert_eq!(chunk.words.len(), 6);
    }

    #[test]
    fn rejects_invalid_ranges() {
        let store = animals();
        assert!(matches!(store.slice(-1, 5), Err(Error::InvalidRequest { offset: -1, count: 5 })));
        assert!(matches!(store.slice(0, 0), Err(Error::InvalidRequest { .. })));
        assert!(matches!(store.slice(0, -3), Err(Error::InvalidRequest { .. })));
    }

    #[test]
    fn slicing_is_repeatable() {
        let store = animals();
        for offset in 0..12 {
            for count in 1..12 {
                assert_eq!(store.slice(offset, count).unwrap(), store.slice(offset, count).unwrap());
            }
        }
    }

    #[test]
    fn loads_comma_and_newline_separated_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "apple, banana,cat\ndog,,\n\nemu\n").unwrap();
        let store = WordStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 5);
        assert_eq!(words(&store.slice(0, 5).unwrap()), ["apple", "banana", "cat", "dog", "emu"]);
    }

    #[test]
    fn missing_or_empty_sources_fail() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("words.txt");
        assert!(matches!(WordStore::load(&missing), Err(Error::Resource { .. })));

        std::fs::write(&missing, " ,\n, ").unwrap();
        assert!(matches!(WordStore::load(&missing), Err(Error::EmptySource { .. })));

        assert!(WordStore::from_words(Vec::<String>::new()).is_err());
    }
}

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use super::{SourceError, Uplink, UplinkEvent, UplinkSource};

const COMMENT_PREFIX: char = '#';

/// Reads one JSON uplink per line; blank and `#` lines are skipped.
pub struct JsonLinesSource<R> {
    lines: Lines<R>,
    line: usize,
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl<R: BufRead> UplinkSource for JsonLinesSource<R> {
    fn next_uplink(&mut self) -> Result<Option<UplinkEvent>, SourceError> {
        for text in self.lines.by_ref() {
            let text = text?;
            self.line += 1;
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
                continue;
            }
            let line = self.line;
            let uplink = serde_json::from_str::<Uplink>(trimmed).map_err(|err| SourceError::Json {
                line,
                message: err.to_string(),
            });
            return Ok(Some(UplinkEvent { line, uplink }));
        }
        Ok(None)
    }
}

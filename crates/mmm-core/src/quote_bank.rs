//! Quote source and its lazily loaded cache.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

/// Quotes compiled into the binary.
pub const BUNDLED_QUOTES: &str = include_str!("../assets/quotes.csv");

/// Parse a quotes CSV: the first column of every non-empty row is a quote.
pub fn parse_quotes<R: Read>(reader: R) -> Result<Vec<String>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut quotes = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if let Some(first) = record.get(0) {
            if !first.trim().is_empty() {
                quotes.push(first.to_string());
            }
        }
    }
    Ok(quotes)
}

/// Owns the quote list, loading it on first use.
#[derive(Debug, Default)]
pub struct QuoteBank {
    source: Option<PathBuf>,
    cache: Option<Arc<[String]>>,
}

impl QuoteBank {
    /// A bank reading from `source`, or the bundled list when `None`.
    pub fn new(source: Option<PathBuf>) -> Self {
        Self {
            source,
            cache: None,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Change the source path, dropping the cache if it differs.
    pub fn set_source(&mut self, source: Option<PathBuf>) {
        if self.source != source {
            self.source = source;
            self.invalidate();
        }
    }

    /// Force the next access to reload the source.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// The loaded quotes.
    pub fn quotes(&mut self) -> Arc<[String]> {
        if let Some(cached) = &self.cache {
            return Arc::clone(cached);
        }
        let loaded: Arc<[String]> = self.load().into();
        self.cache = Some(Arc::clone(&loaded));
        loaded
    }

    fn load(&self) -> Vec<String> {
        if let Some(path) = &self.source {
            match std::fs::File::open(path).map_err(csv::Error::from).and_then(parse_quotes) {
                Ok(quotes) if !quotes.is_empty() => {
                    debug!(target: "mmm::quotes", path = %path.display(), count = quotes.len(), "loaded quotes");
                    return quotes;
                }
                Ok(_) => {
                    warn!(target: "mmm::quotes", path = %path.display(), "quote file is empty, using bundled quotes");
                }
                Err(e) => {
                    warn!(target: "mmm::quotes", path = %path.display(), error = %e, "cannot read quote file, using bundled quotes");
                }
            }
        }
        bundled_quotes()
    }
}

/// The bundled quote list.
pub fn bundled_quotes() -> Vec<String> {
    match parse_quotes(BUNDLED_QUOTES.as_bytes()) {
        Ok(quotes) => quotes,
        Err(e) => {
            warn!(target: "mmm::quotes", error = %e, "bundled quotes are malformed");
            Vec::new()
        }
    }
}

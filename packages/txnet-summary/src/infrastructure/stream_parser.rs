//! Chunked transition loading
//!
//! [`TransitionStreamParser`] is a fold over text chunks: each `feed` takes
//! whatever the I/O layer produced (a line, a 64 KiB block, a whole file) and
//! emits one result per completed line. Carry-over state is the partial line
//! and the previous sample's edge set, so chunk boundaries never change the
//! output.
//!
//! [`TransitionLoader`] applies a [`LoadPolicy`] on top and collects the
//! frozen [`TransitionSequence`].

use tracing::{debug, info, warn};

use crate::config::LoadPolicy;
use crate::domain::{
    EdgeIndexCodec, EdgeSet, NetworkTransition, NodeLookup, TransitionSequence,
    TransitionSequenceStore,
};
use crate::errors::ParseError;

use super::diff_parser::parse_edges;

/// Line-splitting fold from text chunks to transitions
///
/// Accepts `\n` and `\r\n` line endings (also when the `\r\n` pair straddles
/// two chunks). A zero-length line carries no sample and is skipped; a line
/// of only whitespace is an empty sample. A failed line leaves the cumulative
/// edge set untouched.
pub struct TransitionStreamParser<'r, L: NodeLookup + ?Sized> {
    lookup: &'r L,
    codec: EdgeIndexCodec,
    buffer: String,
    previous: EdgeSet,
    line: usize,
}

impl<'r, L: NodeLookup + ?Sized> TransitionStreamParser<'r, L> {
    pub fn new(lookup: &'r L) -> Self {
        Self {
            lookup,
            codec: lookup.codec(),
            buffer: String::new(),
            previous: EdgeSet::default(),
            line: 0,
        }
    }

    /// Consume a chunk; returns results for every line it completed
    pub fn feed(&mut self, chunk: &str) -> Vec<Result<NetworkTransition, ParseError>> {
        let scan_from = self.buffer.len();
        self.buffer.push_str(chunk);
        let buffer = std::mem::take(&mut self.buffer);

        let mut results = Vec::new();
        let mut start = 0;
        // Only the new bytes can hold a newline
        let mut search = scan_from;
        while let Some(offset) = buffer[search..].find('\n') {
            let end = search + offset;
            if let Some(result) = self.process_line(&buffer[start..end]) {
                results.push(result);
            }
            start = end + 1;
            search = start;
        }

        self.buffer = buffer;
        self.buffer.drain(..start);
        results
    }

    /// Flush a trailing unterminated line
    pub fn finish(&mut self) -> Option<Result<NetworkTransition, ParseError>> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        self.process_line(&line)
    }

    /// Lines consumed so far (including blank and failed ones)
    pub fn lines_seen(&self) -> usize {
        self.line
    }

    /// Cumulative edge set after the last successfully parsed sample
    pub fn current_edges(&self) -> &EdgeSet {
        &self.previous
    }

    fn process_line(&mut self, raw: &str) -> Option<Result<NetworkTransition, ParseError>> {
        self.line += 1;
        let text = raw.strip_suffix('\r').unwrap_or(raw);
        if text.is_empty() {
            return None;
        }

        match parse_edges(text, self.lookup, &self.codec) {
            Ok(current) => {
                let transition = NetworkTransition::between(&self.previous, &current);
                self.previous = current;
                Some(Ok(transition))
            }
            Err(err) => Some(Err(err.at_line(self.line))),
        }
    }
}

/// Outcome of a transition load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Samples parsed into transitions
    pub parsed: usize,
    /// Samples dropped under [`LoadPolicy::SkipMalformed`]
    pub skipped: Vec<ParseError>,
}

/// Policy-aware accumulator around [`TransitionStreamParser`]
pub struct TransitionLoader<'r, L: NodeLookup + ?Sized> {
    parser: TransitionStreamParser<'r, L>,
    policy: LoadPolicy,
    store: TransitionSequenceStore,
    report: LoadReport,
}

impl<'r, L: NodeLookup + ?Sized> TransitionLoader<'r, L> {
    pub fn new(lookup: &'r L, policy: LoadPolicy) -> Self {
        Self {
            parser: TransitionStreamParser::new(lookup),
            policy,
            store: TransitionSequenceStore::new(),
            report: LoadReport::default(),
        }
    }

    pub fn feed(&mut self, chunk: &str) -> Result<(), ParseError> {
        for result in self.parser.feed(chunk) {
            self.accept(result)?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<(TransitionSequence, LoadReport), ParseError> {
        if let Some(result) = self.parser.finish() {
            self.accept(result)?;
        }

        info!(
            "Loaded {} network samples ({} skipped, {} lines)",
            self.report.parsed,
            self.report.skipped.len(),
            self.parser.lines_seen()
        );
        Ok((self.store.freeze(), self.report))
    }

    fn accept(&mut self, result: Result<NetworkTransition, ParseError>) -> Result<(), ParseError> {
        match result {
            Ok(transition) => {
                self.store.push(transition);
                self.report.parsed += 1;
                Ok(())
            }
            Err(err) => match self.policy {
                LoadPolicy::Abort => {
                    debug!("Aborting load: {}", err);
                    Err(err)
                }
                LoadPolicy::SkipMalformed => {
                    warn!("Skipping sample: {}", err);
                    self.report.skipped.push(err);
                    Ok(())
                }
            },
        }
    }
}

/// Load a whole in-memory text into a frozen sequence
pub fn load_transitions<L: NodeLookup + ?Sized>(
    text: &str,
    lookup: &L,
    policy: LoadPolicy,
) -> Result<(TransitionSequence, LoadReport), ParseError> {
    let mut loader = TransitionLoader::new(lookup, policy);
    loader.feed(text)?;
    loader.finish()
}

//! Orchestrates indexing and search over the analyzer, segment store,
//! document store, and stats (spec C5 `Indexer` + C7 `Searcher`).
//!
//! Grounded on the teacher's `lib.rs::index_documents` orchestration shape
//! (save document, derive terms, update segments, bump stats) and
//! `tree::MainIndex::search`'s two-pass collect-then-score structure.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::analyzer::{ngramize, tokenize};
use crate::document_store::DocumentStore;
use crate::error::{Error, Result, SchemaReason};
use crate::scorer;
use crate::segment::{Posting, SaveMode, SegmentStore};
use crate::stats::StatsStore;

const DEFAULT_LIMIT: usize = 20;

/// A single engine instance, parameterized by its base directory. Each
/// instance over a distinct directory is independent; there is no
/// process-wide state (spec §9).
pub struct Engine {
    segments: SegmentStore,
    documents: DocumentStore,
    stats: StatsStore,
}

/// The result of a `search` call: the number of candidates scored before
/// pagination, and the hydrated, ranked slice.
pub struct SearchResult {
    pub total_hits: usize,
    pub results: Vec<Value>,
}

impl Engine {
    /// Opens an engine rooted at `base_dir`, laying out `index/`,
    /// `documents/`, and `stats.json` under it on demand (spec §6).
    ///
    /// # Arguments
    /// * `base_dir` - The engine's base directory. Distinct directories are
    ///   fully independent corpora; there is no process-wide state.
    ///
    /// # Returns
    /// The opened engine, or an `Error::Io` if a store directory could not
    /// be created.
    pub fn open(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        Ok(Self {
            segments: SegmentStore::new(base_dir.join("index"))?,
            documents: DocumentStore::new(base_dir.join("documents"))?,
            stats: StatsStore::new(base_dir.join("stats.json")),
        })
    }

    /// Indexes `document` under `doc_id`. `document` must be a JSON object
    /// carrying a `text` string field.
    ///
    /// # Arguments
    /// * `doc_id` - The document's id; re-indexing an existing id overwrites
    ///   its stored payload but does not remove previously emitted postings
    ///   (spec §3, accepted limitation).
    /// * `document` - A JSON object with at least a string `text` field.
    ///
    /// # Returns
    /// `Ok(())` once the document, its postings, and stats have all been
    /// persisted. Fails with `Error::Schema` if `document` is not an object
    /// or has no `text` field, before anything is written.
    pub fn index(&self, doc_id: &str, document: &Value) -> Result<()> {
        let text = extract_text(document)?;

        self.documents.save(doc_id, document)?;

        let tokens = tokenize(text);
        let terms = ngramize(&tokens);

        for (term, positions) in &terms {
            let mut posting = Posting::new();
            posting.insert(doc_id.to_string(), positions.clone());
            self.segments.save(term, &posting, SaveMode::Merge)?;
        }

        self.stats.increment()?;
        Ok(())
    }

    /// Searches the index, returning up to `limit` hydrated results starting
    /// at `offset`, ranked by descending BM25-style score.
    ///
    /// # Arguments
    /// * `query` - The query text; analyzed the same way indexed text is.
    ///   An empty (or whitespace-only) query always yields no results.
    /// * `offset` - How many ranked candidates to skip before returning
    ///   results.
    /// * `limit` - The maximum number of hydrated results to return.
    ///
    /// # Returns
    /// A `SearchResult` whose `total_hits` is the number of scored
    /// candidates before slicing, and whose `results` are the requested
    /// page, each carrying its stored fields plus `id` and `score`. Fails
    /// with `Error::NotFound`/`Error::Io` if a candidate's document could
    /// not be hydrated.
    pub fn search(&self, query: &str, offset: usize, limit: usize) -> Result<SearchResult> {
        let stats = self.stats.read()?;
        if query.trim().is_empty() || stats.total_docs == 0 {
            return Ok(SearchResult {
                total_hits: 0,
                results: Vec::new(),
            });
        }

        let tokens = tokenize(query);
        let grams = ngramize(&tokens);
        let mut terms: Vec<String> = grams.keys().cloned().collect();
        terms.sort();

        let mut df: HashMap<String, u64> = HashMap::new();
        let mut tf_by_doc: HashMap<String, HashMap<String, u64>> = HashMap::new();
        let mut candidates: BTreeSet<String> = BTreeSet::new();

        for term in &terms {
            let posting = self.segments.load(term)?;
            df.insert(term.clone(), posting.len() as u64);

            for (doc_id, positions) in &posting {
                candidates.insert(doc_id.clone());
                *tf_by_doc
                    .entry(doc_id.clone())
                    .or_default()
                    .entry(term.clone())
                    .or_insert(0) += positions.len() as u64;
            }
        }

        let mut scored: Vec<(String, f64)> = candidates
            .into_iter()
            .map(|doc_id| {
                let empty = HashMap::new();
                let tf = tf_by_doc.get(&doc_id).unwrap_or(&empty);
                let score = scorer::score(&terms, &df, tf, stats.total_docs);
                (doc_id, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let total_hits = scored.len();
        let page = scored.into_iter().skip(offset).take(limit);

        let mut results = Vec::new();
        for (doc_id, score) in page {
            let payload = self.documents.load(&doc_id)?;
            results.push(hydrate(&doc_id, score, payload));
        }

        Ok(SearchResult {
            total_hits,
            results,
        })
    }
}

/// Default page size used by callers that don't specify one (spec §4.7's
/// `limit=20` default).
pub fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn extract_text(document: &Value) -> Result<&str> {
    let obj = document
        .as_object()
        .ok_or(Error::Schema(SchemaReason::NotAnObject))?;
    obj.get("text")
        .and_then(Value::as_str)
        .ok_or(Error::Schema(SchemaReason::MissingText))
}

fn hydrate(doc_id: &str, score: f64, payload: Value) -> Value {
    let mut fields = match payload {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };
    fields.insert("id".to_string(), Value::String(doc_id.to_string()));
    fields.insert(
        "score".to_string(),
        serde_json::Number::from_f64(score)
            .map(Value::Number)
            .unwrap_or(Value::Null),
    );
    Value::Object(fields)
}

/// The engine's base directory layout, rooted at a caller-supplied path
/// (spec §6). Exposed so external collaborators (a CLI, a benchmark
/// harness) can lay out a base directory consistently.
pub fn base_paths(base_dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
    (
        base_dir.join("index"),
        base_dir.join("documents"),
        base_dir.join("stats.json"),
    )
}

//! Relevance-filtered context payload rendered from a pack.

use serde::Serialize;

use super::archive::Snapshot;

/// Characters of file text kept in a repo hit preview
const PREVIEW_CHARS: usize = 2000;

/// One line of the export payload
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExportHit {
    Chat {
        data: String,
    },
    Repo {
        path: String,
        start: u64,
        length: u64,
        hits: usize,
        preview: String,
    },
}

/// Rendered JSONL payload
#[derive(Debug, Clone, Default)]
pub struct ExportPayload {
    pub text: String,
    pub bytes: usize,
    pub hits: usize,
}

/// Collect hits for `query` (case-insensitive substring)
///
/// Chat lines come first in log order, then repository files ordered
/// by occurrence count, highest first.
pub fn collect_hits(query: &str, chat_log: &str, snapshot: &Snapshot) -> Vec<ExportHit> {
    let needle = query.to_lowercase();
    let mut hits: Vec<ExportHit> = chat_log
        .lines()
        .filter(|line| !line.is_empty() && line.to_lowercase().contains(&needle))
        .map(|line| ExportHit::Chat {
            data: line.to_string(),
        })
        .collect();

    let mut repo: Vec<(usize, ExportHit)> = snapshot
        .index
        .iter()
        .filter_map(|entry| {
            let text = snapshot.text_of(entry);
            let count = text.to_lowercase().matches(needle.as_str()).count();
            (count > 0).then(|| {
                (
                    count,
                    ExportHit::Repo {
                        path: entry.path.clone(),
                        start: entry.offset,
                        length: entry.length,
                        hits: count,
                        preview: text.chars().take(PREVIEW_CHARS).collect(),
                    },
                )
            })
        })
        .collect();
    repo.sort_by(|a, b| b.0.cmp(&a.0));

    hits.extend(repo.into_iter().map(|(_, hit)| hit));
    hits
}

/// Render hits as JSONL, stopping at the first line that would push the
/// total (line plus newline) past `max_bytes`
pub fn render(hits: &[ExportHit], max_bytes: usize) -> ExportPayload {
    let mut payload = ExportPayload::default();
    for hit in hits {
        let Ok(line) = serde_json::to_string(hit) else {
            continue;
        };
        let need = line.len() + 1;
        if payload.bytes + need > max_bytes {
            break;
        }
        payload.text.push_str(&line);
        payload.text.push('\n');
        payload.bytes += need;
        payload.hits += 1;
    }
    payload
}

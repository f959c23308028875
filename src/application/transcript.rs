//! # Transcript
//!
//! Accumulates question/answer entries into size-bounded chunks, each of which
//! becomes one message in the response room.

/// Maximum characters per chunk.
pub const MAX_CHUNK_LEN: usize = 2048;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    chunks: Vec<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the `__question__\nanswer\n\n` entry.
    pub fn entry(question: &str, answer: &str) -> String {
        format!("__{question}__\n{answer}\n\n")
    }

    pub fn record(&mut self, question: &str, answer: &str) {
        self.append(&Self::entry(question, answer));
    }

    /// Appends to the last chunk, or starts a new one when the chunk would exceed
    /// `MAX_CHUNK_LEN`. An entry longer than a whole chunk is split at char boundaries.
    pub fn append(&mut self, entry: &str) {
        let entry_len = entry.chars().count();

        match self.chunks.last_mut() {
            Some(last) if last.chars().count() + entry_len <= MAX_CHUNK_LEN => {
                last.push_str(entry);
                return;
            }
            _ => {}
        }

        if entry_len <= MAX_CHUNK_LEN {
            self.chunks.push(entry.to_string());
            return;
        }

        let chars: Vec<char> = entry.chars().collect();
        for piece in chars.chunks(MAX_CHUNK_LEN) {
            self.chunks.push(piece.iter().collect());
        }
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// Chunks ready to send, each stripped of its trailing blank line.
    pub fn finish(self) -> Vec<String> {
        self.chunks
            .into_iter()
            .map(|mut chunk| {
                if chunk.ends_with("\n\n") {
                    chunk.truncate(chunk.len() - 2);
                }
                chunk
            })
            .filter(|chunk| !chunk.is_empty())
            .collect()
    }
}

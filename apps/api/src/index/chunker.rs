//! Document chunking: heading-aware sectioning plus size-bounded splitting.
//!
//! Pass one keeps each section contiguous with its heading path as metadata
//! (`#`..`###` ATX headings; deeper levels are content). Pass two splits any
//! section still larger than `CHUNK_SIZE` along paragraph, line, and word
//! boundaries, overlapping adjacent pieces by roughly `CHUNK_OVERLAP` so a
//! fact cut at a boundary stays recoverable from the neighbor chunk.

/// Target maximum chunk length, in characters.
pub const CHUNK_SIZE: usize = 800;
/// Characters of trailing context carried into the next chunk.
pub const CHUNK_OVERLAP: usize = 100;

/// Up to three levels of heading context, outermost first.
pub type HeadingPath = [Option<String>; 3];

/// A chunk of document text ready for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub text: String,
    pub headings: HeadingPath,
}

/// Splits converted document text (markdown heading markers expected, plain
/// text tolerated) into tagged, size-bounded chunks.
pub fn chunk_text(text: &str) -> Vec<TextChunk> {
    let mut chunks = Vec::new();
    for section in sections(text) {
        for piece in split_section(&section.body, CHUNK_SIZE, CHUNK_OVERLAP) {
            chunks.push(TextChunk {
                text: piece,
                headings: section.headings.clone(),
            });
        }
    }
    chunks
}

struct Section {
    headings: HeadingPath,
    body: String,
}

/// Heading-aware pass: every `#`/`##`/`###` line closes the current section
/// and updates the heading path. Content before the first heading becomes a
/// section with an empty path.
fn sections(text: &str) -> Vec<Section> {
    let mut out = Vec::new();
    let mut path: HeadingPath = Default::default();
    let mut body = String::new();

    for line in text.lines() {
        if let Some((level, title)) = heading_line(line) {
            flush_section(&mut out, &path, &mut body);
            path[level - 1] = Some(title.to_string());
            for slot in path.iter_mut().skip(level) {
                *slot = None;
            }
        } else {
            body.push_str(line);
            body.push('\n');
        }
    }
    flush_section(&mut out, &path, &mut body);
    out
}

fn flush_section(out: &mut Vec<Section>, path: &HeadingPath, body: &mut String) {
    if !body.trim().is_empty() {
        out.push(Section {
            headings: path.clone(),
            body: std::mem::take(body),
        });
    } else {
        body.clear();
    }
}

/// Recognizes ATX headings of level 1-3. `####` and deeper stay content, as
/// does `#text` without a space.
fn heading_line(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start();
    let level = trimmed.bytes().take_while(|b| *b == b'#').count();
    if level == 0 || level > 3 {
        return None;
    }
    let rest = trimmed[level..].strip_prefix(' ')?;
    let title = rest.trim();
    if title.is_empty() {
        return None;
    }
    Some((level, title))
}

/// Size-bounded pass: sections within the limit pass through whole; larger
/// ones are split along coarse-to-fine separators and re-merged into
/// overlapping windows.
fn split_section(body: &str, size: usize, overlap: usize) -> Vec<String> {
    let body = body.trim();
    if body.is_empty() {
        return Vec::new();
    }
    if char_len(body) <= size {
        return vec![body.to_string()];
    }
    let pieces = split_by_separators(body, &["\n\n", "\n", " "], size);
    merge_with_overlap(pieces, size, overlap)
}

fn split_by_separators(text: &str, separators: &[&str], size: usize) -> Vec<String> {
    if char_len(text) <= size {
        return vec![text.to_string()];
    }
    let Some((separator, finer)) = separators.split_first() else {
        return hard_split(text, size);
    };
    let mut out = Vec::new();
    for part in text.split(separator) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if char_len(part) <= size {
            out.push(part.to_string());
        } else {
            out.extend(split_by_separators(part, finer, size));
        }
    }
    if out.is_empty() {
        hard_split(text, size)
    } else {
        out
    }
}

/// Last resort for a single run longer than `size` with no separators.
fn hard_split(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size)
        .map(|window| window.iter().collect())
        .collect()
}

/// Greedily packs pieces into chunks of at most `size` characters, retaining
/// up to `overlap` trailing characters of each closed chunk as the start of
/// the next.
fn merge_with_overlap(pieces: Vec<String>, size: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut window: Vec<String> = Vec::new();
    let mut total = 0usize;

    for piece in pieces {
        let piece_len = char_len(&piece);
        if !window.is_empty() && total + piece_len + window.len() > size {
            chunks.push(window.join("\n"));
            while !window.is_empty()
                && (total > overlap || total + piece_len + window.len() > size)
            {
                total -= char_len(&window[0]);
                window.remove(0);
            }
        }
        total += piece_len;
        window.push(piece);
    }
    if !window.is_empty() {
        chunks.push(window.join("\n"));
    }
    chunks
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

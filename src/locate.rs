//! Find the XMP `rdf:Description` island inside an R-JPEG.
//!
//! # Implementation
//!
//! Only a bounded window of the file is searched at a time:
//!
//! - the first window covers the first `0x2800` bytes;
//! - if the opening tag is not in the window, the next one
//!   starts `0x20` bytes before the end of the current one
//!   (so a tag straddling the boundary is still seen) and is
//!   at most as long as the current one;
//! - the search gives up once no more than `0x100` bytes
//!   remain from the next window start.
//!
//! Once the tag is found, at most `0xa00` bytes starting at
//! the tag make up the island.
use lazy_static::lazy_static;
use regex::bytes::Regex;
use tracing::trace;

pub const OPEN_TAG: &[u8] = b"<rdf:Description";
pub const CLOSE_TAG: &str = "</rdf:Description>";

pub const FIRST_WINDOW: usize = 0x2800;
pub const WINDOW_OVERLAP: usize = 0x20;
pub const MIN_REMAINING: usize = 0x100;
pub const ISLAND_LEN: usize = 0xa00;

lazy_static! {
    static ref OPEN_TAG_RE: Regex = Regex::new("<rdf:Description").unwrap();
}

/// Locate the metadata island in `bytes`. Returns the raw
/// span starting at the opening tag, or `None` if there is
/// no island.
pub fn locate(bytes: &[u8]) -> Option<&[u8]> {
    let mut start = 0;
    let mut len = bytes.len().min(FIRST_WINDOW);

    loop {
        let window = &bytes[start..start + len];
        trace!(start, len, "searching window for metadata island");

        if let Some(m) = OPEN_TAG_RE.find(window) {
            let begin = start + m.start();
            let end = bytes.len().min(begin + ISLAND_LEN);
            return Some(&bytes[begin..end]);
        }

        let next = match (start + len).checked_sub(WINDOW_OVERLAP) {
            Some(next) if next > start => next,
            _ => return None,
        };
        let remaining = bytes.len() - next;
        if remaining <= MIN_REMAINING {
            return None;
        }
        start = next;
        len = remaining.min(len);
    }
}

/// Locate the island and decode it as text.
///
/// Bytes outside ASCII are replaced by `?`. The text ends
/// after the last closing tag in the span; if the closing tag
/// is cut off, the whole span is returned since the
/// attributes of the opening tag are still usable.
pub fn island(bytes: &[u8]) -> Option<String> {
    let span = locate(bytes)?;
    let text: String = span
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect();

    Some(match text.rfind(CLOSE_TAG) {
        Some(idx) => text[..idx + CLOSE_TAG.len()].to_string(),
        None => text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTION: &[u8] =
        b"<rdf:Description drone-dji:RtkFlag=\"16\"></rdf:Description>";

    fn buffer_with_island_at(offset: usize, total: usize) -> Vec<u8> {
        let mut bytes = vec![0xffu8; total];
        bytes[offset..offset + DESCRIPTION.len()].copy_from_slice(DESCRIPTION);
        bytes
    }

    #[test]
    fn island_in_first_window() {
        let bytes = buffer_with_island_at(0x40, 0x4000);
        let span = locate(&bytes).unwrap();
        assert!(span.starts_with(OPEN_TAG));
        assert_eq!(span.len(), ISLAND_LEN);

        let text = island(&bytes).unwrap();
        assert_eq!(text.as_bytes(), DESCRIPTION);
    }

    #[test]
    fn island_after_first_window() {
        let bytes = buffer_with_island_at(0x6000, 0x8000);
        let span = locate(&bytes).unwrap();
        assert!(span.starts_with(OPEN_TAG));
    }

    #[test]
    fn island_straddling_window_boundary() {
        // tag starts 8 bytes before the end of the first window
        let bytes = buffer_with_island_at(FIRST_WINDOW - 8, 0x4000);
        assert!(locate(&bytes).is_some());
    }

    #[test]
    fn span_is_cut_at_end_of_buffer() {
        let total = 0x3000;
        let offset = total - DESCRIPTION.len();
        let bytes = buffer_with_island_at(offset, total);
        let span = locate(&bytes).unwrap();
        assert_eq!(span, DESCRIPTION);
    }

    #[test]
    fn short_tail_is_not_searched() {
        // the only tag lies in a tail shorter than the minimum
        let total = FIRST_WINDOW + 0x80;
        let bytes = buffer_with_island_at(total - DESCRIPTION.len(), total);
        assert!(locate(&bytes).is_none());
    }

    #[test]
    fn no_island() {
        assert!(locate(&[]).is_none());
        assert!(locate(&vec![0u8; 0x10000]).is_none());
        assert!(island(b"<rdf:Descriptio").is_none());
    }

    #[test]
    fn small_buffer() {
        assert_eq!(island(DESCRIPTION).unwrap().as_bytes(), DESCRIPTION);
    }

    #[test]
    fn non_ascii_bytes_are_replaced() {
        let mut bytes = DESCRIPTION.to_vec();
        bytes.insert(16, 0xc3);
        let text = island(&bytes).unwrap();
        assert!(text.starts_with("<rdf:Description? drone-dji"));
    }

    #[test]
    fn unterminated_island_keeps_span() {
        let bytes = b"<rdf:Description drone-dji:RtkFlag=\"16\" and more".to_vec();
        let text = island(&bytes).unwrap();
        assert_eq!(text.as_bytes(), &bytes[..]);
    }
}

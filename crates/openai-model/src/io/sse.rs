use super::{Chunks, ChunksError};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    ChunksError(ChunksError),
}

/// A type for reading server-sent events from a chunk stream.
///
/// Only the `data` field is surfaced. Comments, events without data and
/// events that are not valid UTF-8 are skipped.
pub struct Sse {
    buf: Vec<u8>,
    chunks: Chunks,
}

impl Sse {
    #[inline]
    pub fn new(chunks: Chunks) -> Self {
        Self {
            buf: Vec::new(),
            chunks,
        }
    }

    pub async fn next_event(&mut self) -> Result<Option<String>, Error> {
        loop {
            // Drain complete events in the buffer before reading more, an
            // earlier chunk may carry several of them.
            while let Some(block) = self.take_block() {
                if let Some(data) = parse_block(&block) {
                    return Ok(Some(data));
                }
            }

            // Abort if no more data available. A trailing partial event
            // is dropped.
            let Some(bytes) =
                self.chunks.next_chunk().await.map_err(Error::ChunksError)?
            else {
                return Ok(None);
            };
            self.buf.extend_from_slice(&bytes);
        }
    }

    /// Takes the bytes of the first complete event out of the buffer,
    /// excluding the terminating blank line.
    fn take_block(&mut self) -> Option<Vec<u8>> {
        let (idx, sep_len) = find_boundary(&self.buf)?;
        let block = self.buf[..idx].to_vec();
        self.buf.drain(..idx + sep_len);
        Some(block)
    }
}

fn find_boundary(buf: &[u8]) -> Option<(usize, usize)> {
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|i| (i, 2));
    let crlf = buf
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|i| (i, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

// event         = *( comment / field ) end-of-line
// comment       = colon *any-char end-of-line
// field         = 1*name-char [ colon [ space ] *any-char ] end-of-line
fn parse_block(block: &[u8]) -> Option<String> {
    let block = match std::str::from_utf8(block) {
        Ok(block) => block,
        Err(err) => {
            warn!("skipping sse event with invalid payload: {err}");
            return None;
        }
    };

    let mut data: Option<String> = None;
    for line in block.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (name, value) = line.split_once(':').unwrap_or((line, ""));
        if name != "data" {
            trace!("skipping sse field: {name}");
            continue;
        }
        let value = value.strip_prefix(' ').unwrap_or(value);
        match &mut data {
            Some(data) => {
                data.push('\n');
                data.push_str(value);
            }
            None => data = Some(value.to_owned()),
        }
    }
    data
}

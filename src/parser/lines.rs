/// Reassembles arbitrary output chunks into complete lines.
///
/// Bytes after the last `\n` stay in the accumulator until a later chunk
/// terminates them. The accumulator has no size bound.
#[derive(Debug, Default)]
pub struct LineAssembler {
    pending: Vec<u8>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk` and drain every complete line, terminator included.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let complete: Vec<u8> = self.pending.drain(..=last_newline).collect();
        complete
            .split_inclusive(|&b| b == b'\n')
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The unterminated remainder, cut back to its longest valid UTF-8
    /// prefix so a character split across chunks is left alone.
    pub fn partial(&self) -> &str {
        match std::str::from_utf8(&self.pending) {
            Ok(text) => text,
            Err(err) => std::str::from_utf8(&self.pending[..err.valid_up_to()]).unwrap_or_default(),
        }
    }

    /// Remove and return the first `len` bytes of the remainder.
    ///
    /// `len` must fall on a boundary of [`LineAssembler::partial`].
    pub fn take_partial(&mut self, len: usize) -> String {
        let len = len.min(self.pending.len());
        let head: Vec<u8> = self.pending.drain(..len).collect();
        String::from_utf8_lossy(&head).into_owned()
    }

    /// Remove and return the whole remainder.
    pub fn take_all(&mut self) -> String {
        let rest = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&rest).into_owned()
    }
}

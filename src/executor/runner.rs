use crate::debugger::{FilterOutput, FilterSession};
use crate::error::FilterError;
use crate::nav::NavEmitter;
use std::io::{self, Read, Write};

const CHUNK_SIZE: usize = 4096;

/// Counters reported once the stream ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub chunks: usize,
    pub bytes_in: usize,
    pub bytes_out: usize,
    pub location_updates: usize,
}

/// Pump `input` through `session` until end of stream.
///
/// Display text goes to `output` as soon as each chunk is processed; location
/// updates go to `nav` when one is attached.
pub fn run_filter<R, W, N>(
    session: &mut FilterSession,
    input: &mut R,
    output: &mut W,
    mut nav: Option<&mut NavEmitter<N>>,
) -> Result<RunStats, FilterError>
where
    R: Read,
    W: Write,
    N: Write,
{
    let mut stats = RunStats::default();
    let mut buf = [0u8; CHUNK_SIZE];

    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        stats.chunks += 1;
        stats.bytes_in += n;
        tracing::trace!(chunk = stats.chunks, bytes = n, "chunk received");

        let out = session.feed(&buf[..n]);
        deliver(out, output, nav.as_deref_mut(), &mut stats)?;
    }

    let out = session.finish();
    deliver(out, output, nav.as_deref_mut(), &mut stats)?;

    tracing::info!(
        chunks = stats.chunks,
        bytes_in = stats.bytes_in,
        bytes_out = stats.bytes_out,
        updates = stats.location_updates,
        "stream ended"
    );
    Ok(stats)
}

fn deliver<W: Write, N: Write>(
    out: FilterOutput,
    output: &mut W,
    nav: Option<&mut NavEmitter<N>>,
    stats: &mut RunStats,
) -> Result<(), FilterError> {
    if !out.text.is_empty() {
        output.write_all(out.text.as_bytes())?;
        output.flush()?;
        stats.bytes_out += out.text.len();
    }

    stats.location_updates += out.updates.len();
    if let Some(nav) = nav {
        for update in &out.updates {
            nav.send(update)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::read_message;
    use std::io::Cursor;

    /// Hands out at most `step` bytes per read.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let end = (self.pos + self.step).min(self.data.len()).min(self.pos + buf.len());
            let n = end - self.pos;
            buf[..n].copy_from_slice(&self.data[self.pos..end]);
            self.pos = end;
            Ok(n)
        }
    }

    const TRANSCRIPT: &str = "(lldb) Process 7 stopped\n* thread #1, stop reason = breakpoint 1.1\n    frame #0: 0x1 prog`main at /src/main.c:4:1\nTarget 0: (prog) stopped.\n(lldb) ";

    #[test]
    fn test_run_filter_writes_text_and_events() {
        let mut session = FilterSession::lldb().unwrap();
        let mut input = Trickle {
            data: TRANSCRIPT.as_bytes().to_vec(),
            pos: 0,
            step: 5,
        };
        let mut output = Vec::new();
        let mut nav = NavEmitter::new(Vec::new());

        let stats = run_filter(&mut session, &mut input, &mut output, Some(&mut nav)).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Target 0: (prog) stopped. - breakpoint 1.1.\n"));
        assert_eq!(text.matches("(lldb) ").count(), 2);
        assert_eq!(stats.bytes_in, TRANSCRIPT.len());
        assert_eq!(stats.location_updates, 1);

        let mut events = Cursor::new(nav.into_inner());
        let msg = read_message(&mut events).unwrap().unwrap();
        assert_eq!(msg.body.line, 4);
        assert_eq!(msg.body.source.path, "/src/main.c");
    }

    #[test]
    fn test_run_filter_without_nav_flushes_tail() {
        let mut session = FilterSession::lldb().unwrap();
        let mut input = Cursor::new(b"frame #1: 0x2 prog`f at /a.c:8\nno newline".to_vec());
        let mut output = Vec::new();

        let stats =
            run_filter::<_, _, Vec<u8>>(&mut session, &mut input, &mut output, None).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "frame #1: 0x2 prog`f at /a.c:8\nno newline"
        );
        assert_eq!(stats.location_updates, 1);
        assert_eq!(session.location().map(|l| l.line), Some(8));
    }
}

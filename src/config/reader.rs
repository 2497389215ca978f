//! Line-comment filtering for config input.
//!
//! Lines whose first non-blank characters are `//` or `;` are blanked out
//! before the text reaches the decoder. The newline is kept so the decoder's
//! line numbers still point at the right place in the file.

use std::io::{self, BufRead, Read};

const COMMENT_PREFIXES: [&[u8]; 2] = [b"//", b";"];

/// An [`io::Read`] adapter that blanks out comment lines.
///
/// Reads one line at a time from the underlying reader and never holds more
/// than that line in memory.
#[derive(Debug)]
pub struct CommentFilter<R> {
    inner: R,
    line: Vec<u8>,
    pos: usize,
    pending: Option<io::Error>,
}

impl<R: BufRead> CommentFilter<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: Vec::new(),
            pos: 0,
            pending: None,
        }
    }

    /// Refills the line buffer. Returns `Ok(false)` at end of stream.
    fn fill_line(&mut self) -> io::Result<bool> {
        if let Some(err) = self.pending.take() {
            return Err(err);
        }

        self.line.clear();
        self.pos = 0;

        let read = self.inner.read_until(b'\n', &mut self.line);
        match read {
            Ok(0) => return Ok(false),
            Ok(_) => {}
            // Serve what was read before the failure, report it afterwards.
            Err(e) if !self.line.is_empty() => self.pending = Some(e),
            Err(e) => return Err(e),
        }

        if is_comment(&self.line) {
            let newline = self.line.ends_with(b"\n");
            self.line.clear();
            if newline {
                self.line.push(b'\n');
            }
        }
        Ok(true)
    }
}

impl<R: BufRead> Read for CommentFilter<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.pos >= self.line.len() {
            if !self.fill_line()? {
                return Ok(0);
            }
        }

        let available = &self.line[self.pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}

fn is_comment(line: &[u8]) -> bool {
    let start = line
        .iter()
        .position(|b| *b != b' ' && *b != b'\t')
        .unwrap_or(line.len());
    let trimmed = &line[start..];
    COMMENT_PREFIXES
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(input: &str) -> String {
        let mut out = String::new();
        CommentFilter::new(input.as_bytes())
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn test_blanks_comment_lines() {
        let input = "{\n// a comment\n  a: 1,\n; another\n}\n";
        assert_eq!(filter(input), "{\n\n  a: 1,\n\n}\n");
    }

    #[test]
    fn test_indented_comments() {
        let input = "{\n  \t// indented\n\t; tabbed\n}";
        assert_eq!(filter(input), "{\n\n\n}");
    }

    #[test]
    fn test_keeps_inline_slashes() {
        let input = "{ url: \"http://example.com\" } // trailing\n";
        assert_eq!(filter(input), input);
    }

    #[test]
    fn test_preserves_line_count() {
        let input = "a\n//b\nc\n;d\ne";
        let out = filter(input);
        assert_eq!(out.lines().count(), input.lines().count());
    }

    #[test]
    fn test_comment_without_trailing_newline_is_dropped() {
        assert_eq!(filter("{}\n// end"), "{}\n");
    }

    #[test]
    fn test_small_reads() {
        let input = "line one\n// skipped\nline two\n";
        let mut reader = CommentFilter::new(input.as_bytes());
        let mut out = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            let n = reader.read(&mut byte).unwrap();
            if n == 0 {
                break;
            }
            out.push(byte[0]);
        }
        assert_eq!(String::from_utf8(out).unwrap(), "line one\n\nline two\n");
    }

    struct FailingReader {
        data: &'static [u8],
        done: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.done {
                return Err(io::Error::new(io::ErrorKind::Other, "boom"));
            }
            self.done = true;
            let n = self.data.len().min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            Ok(n)
        }
    }

    #[test]
    fn test_error_after_buffered_bytes() {
        let source = FailingReader {
            data: b"{ a: 1",
            done: false,
        };
        let mut reader = CommentFilter::new(io::BufReader::new(source));
        let mut buf = [0u8; 64];

        let n = reader.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"{ a: 1");

        let err = reader.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert_eq!(err.to_string(), "boom");
    }

    struct InterruptedOnce {
        data: &'static [u8],
        interrupted: bool,
    }

    impl Read for InterruptedOnce {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::ErrorKind::Interrupted.into());
            }
            let n = self.data.len().min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_interrupted_source_is_retried() {
        let source = InterruptedOnce {
            data: b"// header\n{ a: 1 }\n",
            interrupted: false,
        };
        let mut out = String::new();
        CommentFilter::new(io::BufReader::new(source))
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "\n{ a: 1 }\n");
    }
}

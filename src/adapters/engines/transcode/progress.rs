//! ffmpeg diagnostic stream parsing
//!
//! ffmpeg rewrites its status line in place with `\r`, so stderr is split on
//! both `\r` and `\n` before looking for the `time=` marker.

use std::collections::VecDeque;

/// Splits a byte stream into lines on `\r` or `\n`
///
/// Bytes are buffered across [`push`](Self::push) calls until a terminator
/// arrives. Empty lines are dropped.
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and collect the lines it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in chunk {
            if byte == b'\r' || byte == b'\n' {
                self.take_line(&mut lines);
            } else {
                self.pending.push(byte);
            }
        }
        lines
    }

    /// Flush whatever is left once the stream ends
    pub fn finish(&mut self) -> Option<String> {
        let mut lines = Vec::new();
        self.take_line(&mut lines);
        lines.pop()
    }

    fn take_line(&mut self, lines: &mut Vec<String>) {
        if self.pending.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.pending).trim().to_string();
        self.pending.clear();
        if !line.is_empty() {
            lines.push(line);
        }
    }
}

/// Extract elapsed seconds from a `time=HH:MM:SS.xx` marker
///
/// Returns `None` for lines without a marker, `time=N/A`, or anything that
/// does not parse.
pub fn parse_elapsed_secs(line: &str) -> Option<f64> {
    let start = line.find("time=")? + "time=".len();
    let value = line[start..].split_whitespace().next()?;

    let mut parts = value.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    let total = hours * 3600.0 + minutes * 60.0 + seconds;
    (total.is_finite() && total >= 0.0).then_some(total)
}

/// Convert elapsed seconds into a percentage of `duration`, clamped to `[0, 100]`
pub fn percent_of(elapsed: f64, duration: f64) -> Option<f64> {
    if duration <= 0.0 || !duration.is_finite() {
        return None;
    }
    Some((elapsed / duration * 100.0).clamp(0.0, 100.0))
}

/// Bounded tail of diagnostic lines
#[derive(Debug)]
pub struct DiagnosticTail {
    lines: VecDeque<String>,
    capacity: usize,
}

impl DiagnosticTail {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: String) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Retained lines joined with newlines, oldest first
    pub fn render(&self) -> String {
        self.lines.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("frame=  120 fps= 30 q=28.0 size=     512kB time=00:00:04.00 bitrate=1048.6kbits/s", Some(4.0) ; "status line")]
    #[test_case("time=01:02:03.50", Some(3723.5) ; "hours and minutes")]
    #[test_case("size=N/A time=N/A bitrate=N/A", None ; "not available")]
    #[test_case("time=00:xx:01.00", None ; "garbage")]
    #[test_case("time=00:01", None ; "too few fields")]
    #[test_case("Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'in.mp4':", None ; "no marker")]
    fn test_parse_elapsed_secs(line: &str, expected: Option<f64>) {
        assert_eq!(parse_elapsed_secs(line), expected);
    }

    #[test]
    fn test_percent_of_clamps() {
        assert_eq!(percent_of(30.0, 60.0), Some(50.0));
        assert_eq!(percent_of(90.0, 60.0), Some(100.0));
        assert_eq!(percent_of(5.0, 0.0), None);
    }

    #[test]
    fn test_line_splitter_handles_carriage_returns_across_chunks() {
        let mut splitter = LineSplitter::new();
        assert!(splitter.push(b"frame=1 time=00:00:0").is_empty());
        let lines = splitter.push(b"1.00\rframe=2 time=00:00:02.00\r\nError");
        assert_eq!(
            lines,
            vec!["frame=1 time=00:00:01.00", "frame=2 time=00:00:02.00"]
        );
        assert_eq!(splitter.finish().as_deref(), Some("Error"));
        assert_eq!(splitter.finish(), None);
    }

    #[test]
    fn test_diagnostic_tail_keeps_last_lines() {
        let mut tail = DiagnosticTail::new(2);
        tail.push("one".into());
        tail.push("two".into());
        tail.push("three".into());
        assert_eq!(tail.render(), "two\nthree");
    }
}

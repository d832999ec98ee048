// Incremental `text/event-stream` decoder
//
// Only the `data:` field matters to this client. Bytes arrive in arbitrary
// chunks, so lines are reassembled here before UTF-8 decoding; a multi-byte
// character split across chunks is never mangled.

use std::collections::VecDeque;

/// Reassembles SSE events from raw body chunks.
///
/// Each completed event yields its `data` payload; multiple `data:` lines
/// in one event are joined with `\n`, as the SSE format prescribes.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    data: Vec<String>,
    ready: VecDeque<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of body bytes.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            self.process_line(&String::from_utf8_lossy(&line));
        }
    }

    /// Take the next completed event payload, if any.
    pub fn next_event(&mut self) -> Option<String> {
        self.ready.pop_front()
    }

    /// Flush whatever is buffered at end of stream.
    ///
    /// A server that closes without the trailing blank line still gets its
    /// last event delivered.
    pub fn finish(&mut self) {
        if !self.buf.is_empty() {
            let rest = std::mem::take(&mut self.buf);
            self.process_line(&String::from_utf8_lossy(&rest));
        }
        self.dispatch();
    }

    fn process_line(&mut self, line: &str) {
        if line.is_empty() {
            self.dispatch();
            return;
        }
        if line.starts_with(':') {
            return;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_owned());
        }
    }

    fn dispatch(&mut self) {
        if !self.data.is_empty() {
            let event = self.data.join("\n");
            self.data.clear();
            self.ready.push_back(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(decoder: &mut SseDecoder) -> Vec<String> {
        std::iter::from_fn(|| decoder.next_event()).collect()
    }

    #[test]
    fn decodes_events_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        decoder.push(b"data: 64 bytes from 10.0.0.2");
        assert!(decoder.next_event().is_none());
        decoder.push(b": icmp_seq=1\n\ndata: Fin del ping\n\n");
        assert_eq!(
            drain(&mut decoder),
            vec!["64 bytes from 10.0.0.2: icmp_seq=1", "Fin del ping"]
        );
    }

    #[test]
    fn keeps_multibyte_characters_split_between_chunks() {
        let mut decoder = SseDecoder::new();
        let line = "data: error de conexión\n\n".as_bytes();
        let split = line.iter().position(|b| *b >= 0x80).unwrap_or(0) + 1;
        decoder.push(&line[..split]);
        decoder.push(&line[split..]);
        assert_eq!(drain(&mut decoder), vec!["error de conexión"]);
    }

    #[test]
    fn ignores_comments_and_other_fields() {
        let mut decoder = SseDecoder::new();
        decoder.push(b": keepalive\nevent: ping\nid: 7\ndata: hello\r\n\r\n");
        assert_eq!(drain(&mut decoder), vec!["hello"]);
    }

    #[test]
    fn joins_multi_line_data_and_flushes_on_finish() {
        let mut decoder = SseDecoder::new();
        decoder.push(b"data: a\ndata: b\n\ndata: tail");
        assert_eq!(drain(&mut decoder), vec!["a\nb"]);
        decoder.finish();
        assert_eq!(drain(&mut decoder), vec!["tail"]);
    }
}

//! Bounded output buffer.

/// Writes into a fixed-capacity buffer while counting every byte the
/// output would have had.
///
/// At most `capacity - 1` bytes are stored so the terminator always fits.
pub(crate) struct Sink<'b> {
    buf: &'b mut [u8],
    len: usize,
}

impl<'b> Sink<'b> {
    pub(crate) fn new(buf: &'b mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    pub(crate) fn push(&mut self, b: u8) {
        if self.len + 1 < self.buf.len() {
            self.buf[self.len] = b;
        }
        self.len += 1;
    }

    pub(crate) fn extend(&mut self, bytes: &[u8]) {
        let room = self.buf.len().saturating_sub(1).saturating_sub(self.len);
        let stored = bytes.len().min(room);
        if stored > 0 {
            self.buf[self.len..self.len + stored].copy_from_slice(&bytes[..stored]);
        }
        self.len = self.len.saturating_add(bytes.len());
    }

    pub(crate) fn fill(&mut self, b: u8, count: usize) {
        let room = self.buf.len().saturating_sub(1).saturating_sub(self.len);
        let stored = count.min(room);
        if stored > 0 {
            self.buf[self.len..self.len + stored].fill(b);
        }
        self.len = self.len.saturating_add(count);
    }

    /// Write the NUL terminator and return the intended length.
    pub(crate) fn finish(self) -> usize {
        if let Some(last) = self.buf.len().checked_sub(1) {
            self.buf[self.len.min(last)] = 0;
        }
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_and_terminates() {
        let mut buf = [0xffu8; 4];
        let mut sink = Sink::new(&mut buf);
        sink.extend(b"ab");
        sink.fill(b'-', 3);
        sink.push(b'z');
        assert_eq!(sink.finish(), 6);
        assert_eq!(&buf, b"ab-\0");
    }

    #[test]
    fn zero_capacity_counts_only() {
        let mut sink = Sink::new(&mut []);
        sink.extend(b"hello");
        assert_eq!(sink.finish(), 5);
    }

    #[test]
    fn fits_exactly_below_capacity() {
        let mut buf = [0xffu8; 6];
        let mut sink = Sink::new(&mut buf);
        sink.extend(b"hello");
        assert_eq!(sink.finish(), 5);
        assert_eq!(&buf, b"hello\0");
    }
}

use std::io::{self, Read};

/// Reader over a buffered response body.
#[derive(Debug, Clone)]
pub struct BodyStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BodyStream<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Next byte as `0..=255`, or `-1` at the end of the body
    pub fn read_byte(&mut self) -> i32 {
        self.next_byte().map_or(-1, i32::from)
    }

    /// Next byte, or `None` at the end of the body
    pub fn next_byte(&mut self) -> Option<u8> {
        let b = self.data.get(self.pos).copied()?;
        self.pos += 1;
        Some(b)
    }

    /// Bytes left to read
    #[must_use]
    pub fn available(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl Read for BodyStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let rest = &self.data[self.pos..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_byte_ends_with_minus_one() {
        let mut s = BodyStream::new(&[0x41, 0xff]);
        assert_eq!(s.read_byte(), 0x41);
        assert_eq!(s.read_byte(), 255);
        assert_eq!(s.read_byte(), -1);
        assert_eq!(s.read_byte(), -1);
    }

    #[test]
    fn implements_read() {
        let mut s = BodyStream::new(b"hello world");
        let mut head = [0u8; 5];
        s.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"hello");
        assert_eq!(s.available(), 6);
        let mut rest = String::new();
        s.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, " world");
    }
}

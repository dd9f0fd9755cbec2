use std::io::Read;

/// Applies a position-dependent XOR mask to every byte read through `inner`,
/// starting the position counter at `skip` bytes already consumed upstream.
///
/// This mirrors the teacher's `XorRead`, generalized with a starting offset so
/// it can be layered directly onto a reader already positioned past a header.
pub struct XorRead<R, F> {
    inner: R,
    xor_lookup: F,
    index: usize,
}

impl<R: Read, F: Fn(usize) -> u8> XorRead<R, F> {
    pub fn new(reader: R, xor_lookup: F) -> Self {
        Self::with_start(reader, xor_lookup, 0)
    }

    pub fn with_start(reader: R, xor_lookup: F, start: usize) -> Self {
        Self {
            inner: reader,
            xor_lookup,
            index: start,
        }
    }
}

impl<R: Read, F: Fn(usize) -> u8> Read for XorRead<R, F> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let read_amt = self.inner.read(buf)?;
        for b in &mut buf[..read_amt] {
            *b ^= (self.xor_lookup)(self.index);
            self.index += 1;
        }
        Ok(read_amt)
    }
}

/// Decrypt `data` in place using a rolling key stream, leaving the first
/// `header_size` bytes untouched. `stream` must be non-empty.
///
/// The inner loop is a straight `for` over a slice with no early exits or
/// data-dependent branches, so the optimizer can vectorize it.
pub fn xor_in_place(data: &mut [u8], header_size: usize, stream: &[u8]) {
    if stream.is_empty() || data.len() <= header_size {
        return;
    }
    let stream_len = stream.len();
    for (offset, byte) in data[header_size..].iter_mut().enumerate() {
        *byte ^= stream[offset % stream_len];
    }
}

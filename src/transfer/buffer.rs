//! Fixed-capacity chunk buffer shared by the send and receive loops.

/// Scratch space for one transfer loop.
///
/// Owned by the engine invocation that creates it and dropped with it.
/// Every chunk handed out is zeroed first so no bytes from a previous
/// read can leak into the next write.
pub struct TransferBuffer {
    data: Vec<u8>,
}

impl TransferBuffer {
    /// Capacity of zero is clamped to one byte so reads always make progress
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity.max(1)],
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Zero and return the first `min(len, capacity)` bytes
    pub fn zeroed_chunk(&mut self, len: usize) -> &mut [u8] {
        let len = len.min(self.data.len());
        let chunk = &mut self.data[..len];
        chunk.fill(0);
        chunk
    }

    /// Zeroed chunk of full capacity
    pub fn full_chunk(&mut self) -> &mut [u8] {
        let len = self.data.len();
        self.zeroed_chunk(len)
    }
}

#[cfg(test)]
mod tests {
    use super::TransferBuffer;

    #[test]
    fn chunk_is_zeroed_between_reads() {
        let mut buf = TransferBuffer::new(8);

        buf.full_chunk().copy_from_slice(b"abcdefgh");
        let next = buf.zeroed_chunk(4);

        assert_eq!(next, &[0u8; 4]);
    }

    #[test]
    fn chunk_never_exceeds_capacity() {
        let mut buf = TransferBuffer::new(4);
        assert_eq!(buf.zeroed_chunk(100).len(), 4);
        assert_eq!(buf.zeroed_chunk(3).len(), 3);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let buf = TransferBuffer::new(0);
        assert_eq!(buf.capacity(), 1);
    }
}

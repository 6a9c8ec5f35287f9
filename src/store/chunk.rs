/// Default block size for chunking fetched documents (bytes)
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Splits input into consecutive fixed-size chunks
///
/// Every chunk except possibly the last has exactly `chunk_size` bytes;
/// the final chunk holds the remainder. Empty input yields an empty
/// sequence. This is a pure function with no effect on the store.
pub fn chunk_data(data: &[u8], chunk_size: usize) -> Vec<Vec<u8>> {
    assert!(chunk_size > 0, "chunk size must be non-zero");
    data.chunks(chunk_size).map(|c| c.to_vec()).collect()
}

/// Regroups streamed fragments into display-sized increments.
///
/// Fragments accumulate until the buffer holds at least `threshold` characters, then
/// the whole buffer is released. Whatever is left at the end is released by `finish`.
#[derive(Debug)]
pub struct ChunkCoalescer {
    buffer: String,
    buffered_chars: usize,
    threshold: usize,
}

impl ChunkCoalescer {
    pub fn new(threshold: usize) -> Self {
        Self {
            buffer: String::new(),
            buffered_chars: 0,
            threshold: threshold.max(1),
        }
    }

    pub fn push(&mut self, fragment: &str) -> Option<String> {
        self.buffer.push_str(fragment);
        self.buffered_chars += fragment.chars().count();
        if self.buffered_chars >= self.threshold {
            return self.take();
        }
        None
    }

    pub fn finish(&mut self) -> Option<String> {
        self.take()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn take(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        self.buffered_chars = 0;
        Some(std::mem::take(&mut self.buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flushes_once_threshold_is_reached() {
        let mut coalescer = ChunkCoalescer::new(3);
        assert_eq!(coalescer.push("a"), None);
        assert_eq!(coalescer.push("b"), None);
        assert_eq!(coalescer.push("c"), Some("abc".to_string()));
        assert_eq!(coalescer.push("d"), None);
        assert_eq!(coalescer.finish(), Some("d".to_string()));
        assert_eq!(coalescer.finish(), None);
    }

    #[test]
    fn large_fragment_is_released_whole() {
        let mut coalescer = ChunkCoalescer::new(3);
        assert_eq!(coalescer.push("A "), None);
        assert_eq!(coalescer.push(" cat."), Some("A  cat.".to_string()));
        assert!(coalescer.is_empty());
    }

    #[test]
    fn threshold_counts_characters() {
        let mut coalescer = ChunkCoalescer::new(3);
        assert_eq!(coalescer.push("日本"), None);
        assert_eq!(coalescer.push("語"), Some("日本語".to_string()));
    }

    #[test]
    fn finish_on_empty_buffer_yields_nothing() {
        let mut coalescer = ChunkCoalescer::new(3);
        assert_eq!(coalescer.finish(), None);
    }
}

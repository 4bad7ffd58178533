/// Knobs for a single decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Check every chunk's CRC against its type and data.
    pub verify_crc: bool,
    /// Initial output estimate for decompression. Twice the packed size when unset.
    /// Never exceeds the filtered size the header describes.
    pub inflate_size_hint: Option<usize>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            verify_crc: true,
            inflate_size_hint: None,
        }
    }
}

impl DecodeOptions {
    pub fn with_verify_crc(mut self, verify_crc: bool) -> Self {
        self.verify_crc = verify_crc;
        self
    }

    pub fn with_inflate_size_hint(mut self, size_hint: usize) -> Self {
        self.inflate_size_hint = Some(size_hint);
        self
    }
}

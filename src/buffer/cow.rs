//! Copy-on-write buffer module.
//!
//! A [`CowBuffer`] is a handle to a reference-counted block of bytes tagged with
//! an [`Encoding`] and a code-unit count. Cloning a handle shares the block;
//! the first mutation through a shared handle copies the block so that no
//! other handle observes the change.

use std::sync::Arc;

use super::encoding::{Encoding, TERMINATOR_LEN};
use super::error::{BufferError, BufferResult};

/// Storage shared between handles.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Block {
    encoding: Encoding,
    /// Code units, not bytes, terminator excluded.
    units: usize,
    /// Payload followed by `TERMINATOR_LEN` zero bytes.
    bytes: Vec<u8>,
}

impl Block {
    fn zeroed(encoding: Encoding, units: usize) -> Self {
        Self { encoding, units, bytes: vec![0; encoding.byte_len(units)] }
    }

    fn payload_len(&self) -> usize {
        self.units * self.encoding.unit_width()
    }

    /// Ansi copy of an Ansi16 block, keeping the low byte of every unit.
    fn narrowed(&self) -> Self {
        let mut dest = Block::zeroed(Encoding::Ansi, self.units);
        for (dst, unit) in dest.bytes.iter_mut().zip(self.bytes.chunks_exact(2).take(self.units)) {
            *dst = unit[0];
        }
        dest
    }

    /// 16-bit copy of an Ansi block, zero-extending every unit.
    fn widened(&self, encoding: Encoding) -> Self {
        let mut dest = Block::zeroed(encoding, self.units);
        for (unit, &byte) in dest.bytes.chunks_exact_mut(2).zip(&self.bytes[..self.units]) {
            unit[0] = byte;
        }
        dest
    }
}

impl Default for Block {
    fn default() -> Self {
        Block::zeroed(Encoding::Binary, 0)
    }
}

/// Shareable byte buffer with lazy copy on mutation.
///
/// `Clone` never copies bytes; it hands out another reference to the same
/// storage. Every method taking `&mut self` that changes content goes through
/// [`CowBuffer::ensure_exclusive`] first.
#[derive(Debug, Clone, Default)]
pub struct CowBuffer {
    block: Option<Arc<Block>>,
}

impl CowBuffer {
    /// A handle without storage.
    pub fn empty() -> Self {
        Self { block: None }
    }

    /// A zeroed buffer of `units` code units.
    pub fn with_size(encoding: Encoding, units: usize) -> Self {
        let mut buffer = Self::empty();
        buffer.allocate(encoding, units);
        buffer
    }

    /// Ansi buffer holding the bytes of `text` verbatim.
    pub fn from_narrow_text(text: &str) -> Self {
        Self::from_bytes(Encoding::Ansi, text.as_bytes())
    }

    /// Utf16 buffer holding `units` verbatim.
    pub fn from_wide_text(units: &[u16]) -> Self {
        let mut buffer = Self::empty();
        let payload = buffer.allocate(Encoding::Utf16, units.len());
        for (dst, unit) in payload.chunks_exact_mut(2).zip(units) {
            dst.copy_from_slice(&unit.to_le_bytes());
        }
        buffer
    }

    /// Utf16 buffer holding `text` encoded as UTF-16.
    pub fn from_wide_str(text: &str) -> Self {
        let units: Vec<u16> = text.encode_utf16().collect();
        Self::from_wide_text(&units)
    }

    /// Buffer of `encoding` holding `bytes` verbatim.
    ///
    /// A trailing partial unit of a 16-bit encoding is padded with a zero byte.
    pub fn from_bytes(encoding: Encoding, bytes: &[u8]) -> Self {
        let mut buffer = Self::empty();
        let units = bytes.len().div_ceil(encoding.unit_width());
        buffer.allocate(encoding, units)[..bytes.len()].copy_from_slice(bytes);
        buffer
    }

    /// Buffer of `encoding` holding the units of `bytes` up to the first zero unit.
    pub fn from_terminated(encoding: Encoding, bytes: &[u8]) -> Self {
        let width = encoding.unit_width();
        let end = bytes
            .chunks_exact(width)
            .position(|unit| unit.iter().all(|&b| b == 0))
            .map(|units| units * width)
            .unwrap_or(bytes.len());
        Self::from_bytes(encoding, &bytes[..end])
    }

    /// Replace this handle's storage with `units` zeroed code units of `encoding`.
    ///
    /// Storage this handle owns exclusively is reused; shared storage is left
    /// to its other handles. Returns the writable payload.
    pub fn allocate(&mut self, encoding: Encoding, units: usize) -> &mut [u8] {
        let byte_len = encoding.byte_len(units);
        tracing::trace!(%encoding, units, byte_len, "Allocating buffer");

        if let Some(block) = self.block.as_mut().and_then(Arc::get_mut) {
            block.encoding = encoding;
            block.units = units;
            block.bytes.clear();
            block.bytes.resize(byte_len, 0);
        } else {
            self.block = Some(Arc::new(Block::zeroed(encoding, units)));
        }
        self.bytes_mut()
    }

    /// Make this handle the sole owner of its storage.
    ///
    /// Absent storage becomes an empty Binary block. Shared storage is copied.
    pub fn ensure_exclusive(&mut self) {
        self.block_mut();
    }

    fn block_mut(&mut self) -> &mut Block {
        let block = self.block.get_or_insert_with(|| {
            tracing::trace!("Creating buffer storage from empty");
            Arc::new(Block::default())
        });
        let share_count = Arc::strong_count(block);
        if share_count > 1 {
            tracing::trace!(share_count, units = block.units, "Copying shared buffer storage");
        }
        Arc::make_mut(block)
    }

    /// Reinterpret or narrow the content as Ansi text.
    ///
    /// Binary is retagged in place and Ansi16 is narrowed by dropping the high
    /// byte of every unit. Ansi and Utf16 content is returned unchanged.
    pub fn to_ansi(&mut self) -> Option<&[u8]> {
        let encoding = self.block.as_ref()?.encoding;
        match encoding {
            Encoding::Binary => self.block_mut().encoding = Encoding::Ansi,
            Encoding::Ansi | Encoding::Utf16 => {}
            Encoding::Ansi16 => {
                tracing::trace!(units = self.size(), "Narrowing ansi16 buffer to ansi");
                let narrowed = self.block.as_ref().map(|block| block.narrowed());
                self.block = narrowed.map(Arc::new);
            }
        }
        Some(self.bytes())
    }

    /// Change the encoding of the buffer to `target`.
    ///
    /// - to Binary: the payload bytes are kept, the unit count becomes the byte count
    /// - to Ansi: see [`CowBuffer::to_ansi`]
    /// - Binary to a 16-bit encoding: bytes are reinterpreted as 16-bit units
    /// - Ansi to a 16-bit encoding: every byte is zero-extended
    /// - between Ansi16 and Utf16: tag change only
    ///
    /// A handle without storage is left as is.
    pub fn convert(&mut self, target: Encoding) {
        let Some(current) = self.block.as_ref().map(|block| block.encoding) else {
            return;
        };
        if current == target {
            return;
        }
        tracing::trace!(from = %current, to = %target, units = self.size(), "Converting buffer");

        match (current, target) {
            (_, Encoding::Ansi) => {
                self.to_ansi();
            }
            (_, Encoding::Binary) => {
                let block = self.block_mut();
                block.units = block.payload_len();
                block.encoding = Encoding::Binary;
            }
            (Encoding::Binary, wide) => {
                let block = self.block_mut();
                let len = block.payload_len();
                if len % 2 == 1 {
                    block.bytes.insert(len, 0);
                }
                block.units = len.div_ceil(2);
                block.encoding = wide;
            }
            (Encoding::Ansi, wide) => {
                let widened = self.block.as_ref().map(|block| block.widened(wide));
                self.block = widened.map(Arc::new);
            }
            (Encoding::Ansi16 | Encoding::Utf16, wide) => self.block_mut().encoding = wide,
        }
    }

    /// Remove `count` code units starting at `offset`.
    pub fn erase(&mut self, offset: usize, count: usize) -> BufferResult<()> {
        let size = self.size();
        let end = offset
            .checked_add(count)
            .filter(|&end| end <= size)
            .ok_or(BufferError::OutOfRange { offset, count, size })?;

        let block = self.block_mut();
        let width = block.encoding.unit_width();
        block.bytes.drain(offset * width..end * width);
        block.units -= count;
        Ok(())
    }

    /// Insert `count` code units of `source`, starting at `source_offset`, at `offset`.
    ///
    /// Both buffers must use the same unit width.
    pub fn insert(
        &mut self,
        offset: usize,
        source: &CowBuffer,
        source_offset: usize,
        count: usize,
    ) -> BufferResult<()> {
        let size = self.size();
        if offset > size {
            return Err(BufferError::OutOfRange { offset, count: 0, size });
        }
        let source_size = source.size();
        let source_end = source_offset
            .checked_add(count)
            .filter(|&end| end <= source_size)
            .ok_or(BufferError::OutOfRange { offset: source_offset, count, size: source_size })?;

        let width = self.encoding().unit_width();
        if count > 0 && source.encoding().unit_width() != width {
            return Err(BufferError::EncodingMismatch {
                source_encoding: source.encoding(),
                target: self.encoding(),
            });
        }

        let source_width = source.encoding().unit_width();
        let chunk = source.bytes()[source_offset * source_width..source_end * source_width].to_vec();
        let block = self.block_mut();
        let at = offset * width;
        block.bytes.splice(at..at, chunk);
        block.units += count;
        Ok(())
    }

    /// Returns true when the handle references storage.
    pub fn is_allocated(&self) -> bool {
        self.block.is_some()
    }

    /// Number of code units.
    pub fn size(&self) -> usize {
        self.block.as_ref().map(|block| block.units).unwrap_or(0)
    }

    pub fn encoding(&self) -> Encoding {
        self.block.as_ref().map(|block| block.encoding).unwrap_or_default()
    }

    /// Number of handles referencing this handle's storage.
    pub fn share_count(&self) -> usize {
        self.block.as_ref().map(Arc::strong_count).unwrap_or(0)
    }

    /// Total byte length including the terminator, 0 without storage.
    pub fn byte_len(&self) -> usize {
        self.block.as_ref().map(|block| block.bytes.len()).unwrap_or(0)
    }

    /// Payload bytes without the terminator.
    pub fn bytes(&self) -> &[u8] {
        match &self.block {
            Some(block) => &block.bytes[..block.payload_len()],
            None => &[],
        }
    }

    /// Payload bytes followed by the terminator.
    pub fn bytes_with_terminator(&self) -> &[u8] {
        match &self.block {
            Some(block) => &block.bytes,
            None => &[],
        }
    }

    /// Writable payload, copying shared storage first.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        let block = self.block_mut();
        let len = block.payload_len();
        debug_assert_eq!(block.bytes.len(), len + TERMINATOR_LEN);
        &mut block.bytes[..len]
    }

    /// 16-bit code units of a wide buffer, read little-endian.
    pub fn wide_units(&self) -> Vec<u16> {
        if !self.encoding().is_wide() {
            return Vec::new();
        }
        self.bytes().chunks_exact(2).map(|unit| u16::from_le_bytes([unit[0], unit[1]])).collect()
    }

    /// Render text content as a host string. Binary content yields `None`.
    pub fn to_text(&self) -> Option<String> {
        let block = self.block.as_ref()?;
        match block.encoding {
            Encoding::Binary => None,
            Encoding::Ansi => {
                let bytes = self.bytes();
                match std::str::from_utf8(bytes) {
                    Ok(text) => Some(text.to_string()),
                    Err(_) => Some(bytes.iter().map(|&b| b as char).collect()),
                }
            }
            Encoding::Ansi16 => Some(self.wide_units().into_iter().map(|u| (u as u8) as char).collect()),
            Encoding::Utf16 => Some(String::from_utf16_lossy(&self.wide_units())),
        }
    }
}

impl From<&str> for CowBuffer {
    fn from(text: &str) -> Self {
        CowBuffer::from_narrow_text(text)
    }
}

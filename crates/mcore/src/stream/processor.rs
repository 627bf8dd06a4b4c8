// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Stock stream processors.
//!
//! Processors decorate a wrapped device, transparently transforming the
//! byte flow: [`BufferedDevice`] coalesces small operations into page
//! transfers, [`TextDevice`] translates newlines when the stream is in
//! text mode, and [`CryptoDevice`] encrypts with the AES key carried by
//! the stream's `Key` slot.

use super::StreamDevice;
use crate::crypto::Aes;
use crate::error::{MError, MErrorCode, MResult};
use zeroize::Zeroize;

/// Page size of the buffered processor.
const BUFFER_PAGE_SIZE: usize = 0x1000;

/// Coalesces reads and writes into fixed-size page transfers.
pub struct BufferedDevice {
    inner: Box<dyn StreamDevice>,
    /// Read-ahead page and the unserved window into it.
    page: Vec<u8>,
    page_from: usize,
    /// Pending write bytes not yet pushed down.
    pending: Vec<u8>,
}

impl BufferedDevice {
    pub fn new(inner: Box<dyn StreamDevice>) -> Self {
        BufferedDevice {
            inner,
            page: Vec::new(),
            page_from: 0,
            pending: Vec::new(),
        }
    }

    fn unread(&self) -> usize {
        self.page.len() - self.page_from
    }

    fn flush_pending(&mut self) -> MResult<()> {
        if !self.pending.is_empty() {
            let pending = std::mem::take(&mut self.pending);
            self.inner.write_bytes(&pending)?;
        }
        Ok(())
    }

    /// Reposition the wrapped device past read-ahead the caller never
    /// consumed, best effort for devices without positions.
    fn drop_read_ahead(&mut self) -> MResult<()> {
        if self.unread() > 0 {
            let unread = self.unread() as u64;
            if let Ok(position) = self.inner.position() {
                self.inner.set_position(position.saturating_sub(unread))?;
            }
        }
        self.page.clear();
        self.page_from = 0;
        Ok(())
    }
}

impl StreamDevice for BufferedDevice {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn inner(&self) -> Option<&dyn StreamDevice> {
        Some(self.inner.as_ref())
    }

    fn inner_mut(&mut self) -> Option<&mut dyn StreamDevice> {
        Some(self.inner.as_mut())
    }

    fn read_some(&mut self, buf: &mut [u8]) -> MResult<usize> {
        if self.unread() == 0 {
            self.page.resize(BUFFER_PAGE_SIZE, 0);
            let len = self.inner.read_some(&mut self.page)?;
            self.page.truncate(len);
            self.page_from = 0;
            if len == 0 {
                return Ok(0);
            }
        }
        let len = buf.len().min(self.unread());
        buf[..len].copy_from_slice(&self.page[self.page_from..self.page_from + len]);
        self.page_from += len;
        Ok(len)
    }

    fn write_bytes(&mut self, buf: &[u8]) -> MResult<()> {
        self.pending.extend_from_slice(buf);
        if self.pending.len() >= BUFFER_PAGE_SIZE {
            self.flush_pending()?;
        }
        Ok(())
    }

    fn position(&self) -> MResult<u64> {
        let below = self.inner.position()?;
        Ok(below - self.unread() as u64 + self.pending.len() as u64)
    }

    fn set_position(&mut self, position: u64) -> MResult<()> {
        self.flush_pending()?;
        self.page.clear();
        self.page_from = 0;
        self.inner.set_position(position)
    }

    fn size(&self) -> MResult<u64> {
        Ok(self.inner.size()? + self.pending.len() as u64)
    }

    fn set_size(&mut self, size: u64) -> MResult<()> {
        self.flush_pending()?;
        self.inner.set_size(size)
    }

    fn flush(&mut self, soft: bool) -> MResult<()> {
        self.flush_pending()?;
        self.inner.flush(soft)
    }

    fn close(&mut self) -> MResult<()> {
        let result = self.flush_pending();
        let inner_result = self.inner.close();
        result?;
        inner_result
    }

    fn set_key(&mut self, key: Option<&[u8]>) -> MResult<()> {
        self.inner.set_key(key)
    }

    fn switch_direction(&mut self, writing: bool) -> MResult<()> {
        if writing {
            self.drop_read_ahead()?;
        } else {
            self.flush_pending()?;
        }
        self.inner.switch_direction(writing)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Newline translation: `\n` becomes `\r\n` on write, every `\r` is
/// dropped on read. Installed only when the stream carries the text flag.
pub struct TextDevice {
    inner: Box<dyn StreamDevice>,
}

impl TextDevice {
    pub fn new(inner: Box<dyn StreamDevice>) -> Self {
        TextDevice { inner }
    }
}

impl StreamDevice for TextDevice {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn inner(&self) -> Option<&dyn StreamDevice> {
        Some(self.inner.as_ref())
    }

    fn inner_mut(&mut self) -> Option<&mut dyn StreamDevice> {
        Some(self.inner.as_mut())
    }

    fn read_some(&mut self, buf: &mut [u8]) -> MResult<usize> {
        // Keep reading until at least one byte survives the \r strip.
        loop {
            let len = self.inner.read_some(buf)?;
            if len == 0 {
                return Ok(0);
            }
            let mut kept = 0;
            for i in 0..len {
                if buf[i] != b'\r' {
                    buf[kept] = buf[i];
                    kept += 1;
                }
            }
            if kept > 0 {
                return Ok(kept);
            }
        }
    }

    fn write_bytes(&mut self, buf: &[u8]) -> MResult<()> {
        let mut from = 0;
        for (i, &b) in buf.iter().enumerate() {
            if b == b'\n' {
                if i > from {
                    self.inner.write_bytes(&buf[from..i])?;
                }
                self.inner.write_bytes(b"\r\n")?;
                from = i + 1;
            }
        }
        if from < buf.len() {
            self.inner.write_bytes(&buf[from..])?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// AES block size used by the crypto layer.
const CRYPTO_BLOCK_SIZE: usize = 16;

/// Transparent AES encryption fed by the stream's key slot.
///
/// The byte flow is processed in 16-byte blocks; terminal partial blocks
/// are zero-padded when the soft flush of a close releases them, so an
/// encrypted stream always stores a whole number of blocks.
pub struct CryptoDevice {
    inner: Box<dyn StreamDevice>,
    aes: Option<Aes>,
    /// Plaintext bytes awaiting a full block on the write side.
    pending: Vec<u8>,
    /// Decrypted bytes awaiting the reader.
    decrypted: Vec<u8>,
    decrypted_from: usize,
}

impl CryptoDevice {
    pub fn new(inner: Box<dyn StreamDevice>) -> Self {
        CryptoDevice {
            inner,
            aes: None,
            pending: Vec::new(),
            decrypted: Vec::new(),
            decrypted_from: 0,
        }
    }

    fn require_aes(&self) -> MResult<&Aes> {
        self.aes.as_ref().ok_or_else(|| {
            MError::new(
                crate::error::MErrorKind::Security,
                MErrorCode::InvalidKeySize,
                "Key is not set",
            )
        })
    }

    fn write_block(&mut self, block: &mut [u8; CRYPTO_BLOCK_SIZE]) -> MResult<()> {
        self.require_aes()?.encrypt_block(block)?;
        self.inner.write_bytes(block)
    }

    /// Pull one stored block and decrypt it. A well-formed encrypted
    /// stream holds whole blocks only; a trailing fragment is corruption.
    fn read_block(&mut self) -> MResult<usize> {
        let mut block = [0u8; CRYPTO_BLOCK_SIZE];
        let mut filled = 0;
        while filled < CRYPTO_BLOCK_SIZE {
            let len = self.inner.read_some(&mut block[filled..])?;
            if len == 0 {
                break;
            }
            filled += len;
        }
        if filled == 0 {
            return Ok(0);
        }
        if filled != CRYPTO_BLOCK_SIZE {
            return Err(MError::plain(
                MErrorCode::EndOfStream,
                format!("End of stream '{}'", self.inner.name()),
            ));
        }
        self.require_aes()?.decrypt_block(&mut block)?;
        self.decrypted.clear();
        self.decrypted.extend_from_slice(&block);
        self.decrypted_from = 0;
        block.zeroize();
        Ok(CRYPTO_BLOCK_SIZE)
    }
}

impl StreamDevice for CryptoDevice {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn inner(&self) -> Option<&dyn StreamDevice> {
        Some(self.inner.as_ref())
    }

    fn inner_mut(&mut self) -> Option<&mut dyn StreamDevice> {
        Some(self.inner.as_mut())
    }

    fn read_some(&mut self, buf: &mut [u8]) -> MResult<usize> {
        if self.decrypted_from == self.decrypted.len() && self.read_block()? == 0 {
            return Ok(0);
        }
        let available = self.decrypted.len() - self.decrypted_from;
        let len = buf.len().min(available);
        buf[..len].copy_from_slice(&self.decrypted[self.decrypted_from..self.decrypted_from + len]);
        self.decrypted_from += len;
        Ok(len)
    }

    fn write_bytes(&mut self, buf: &[u8]) -> MResult<()> {
        self.pending.extend_from_slice(buf);
        while self.pending.len() >= CRYPTO_BLOCK_SIZE {
            let mut block = [0u8; CRYPTO_BLOCK_SIZE];
            block.copy_from_slice(&self.pending[..CRYPTO_BLOCK_SIZE]);
            self.pending.drain(..CRYPTO_BLOCK_SIZE);
            self.write_block(&mut block)?;
        }
        Ok(())
    }

    fn flush(&mut self, soft: bool) -> MResult<()> {
        if soft && !self.pending.is_empty() {
            // The terminal partial block is zero-padded on close
            let mut block = [0u8; CRYPTO_BLOCK_SIZE];
            block[..self.pending.len()].copy_from_slice(&self.pending);
            self.pending.zeroize();
            self.pending.clear();
            self.write_block(&mut block)?;
        }
        self.inner.flush(soft)
    }

    fn close(&mut self) -> MResult<()> {
        self.inner.close()
    }

    fn set_key(&mut self, key: Option<&[u8]>) -> MResult<()> {
        match key {
            Some(key) => {
                self.aes = Some(Aes::with_key(key)?);
            }
            None => {
                self.aes = None;
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

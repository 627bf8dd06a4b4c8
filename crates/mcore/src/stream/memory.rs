// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Growable in-memory random-access stream device.

use super::{Stream, StreamDevice, FLAG_READ_WRITE};
use crate::error::MResult;
use crate::reflect::{MClass, PropertyDef, PropertyGetter, ServiceDef, ServiceMethod};
use crate::variant::{Variant, VariantKind};

/// In-memory device; writing past the end grows the buffer.
pub struct MemoryDevice {
    buffer: Vec<u8>,
    position: usize,
}

impl MemoryDevice {
    pub fn new(bytes: &[u8]) -> Self {
        MemoryDevice {
            buffer: bytes.to_vec(),
            position: 0,
        }
    }

    /// Snapshot of the stored bytes.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }
}

impl StreamDevice for MemoryDevice {
    fn name(&self) -> String {
        "<memory>".to_string()
    }

    fn is_open(&self) -> bool {
        true // a memory stream is always open, even when closed
    }

    fn read_some(&mut self, buf: &mut [u8]) -> MResult<usize> {
        let available = self.buffer.len() - self.position;
        let len = buf.len().min(available);
        buf[..len].copy_from_slice(&self.buffer[self.position..self.position + len]);
        self.position += len;
        Ok(len)
    }

    fn write_bytes(&mut self, buf: &[u8]) -> MResult<()> {
        let overwrite = (self.buffer.len() - self.position).min(buf.len());
        self.buffer[self.position..self.position + overwrite].copy_from_slice(&buf[..overwrite]);
        self.buffer.extend_from_slice(&buf[overwrite..]);
        self.position += buf.len();
        Ok(())
    }

    fn position(&self) -> MResult<u64> {
        Ok(self.position as u64)
    }

    fn set_position(&mut self, position: u64) -> MResult<()> {
        if position as usize > self.buffer.len() {
            return Err(crate::error::MError::plain(
                crate::error::MErrorCode::EndOfStream,
                "End of stream '<memory>'",
            ));
        }
        self.position = position as usize;
        Ok(())
    }

    fn size(&self) -> MResult<u64> {
        Ok(self.buffer.len() as u64)
    }

    fn set_size(&mut self, size: u64) -> MResult<()> {
        let size = size as usize;
        if size > self.buffer.len() {
            return Err(crate::error::MError::plain(
                crate::error::MErrorCode::EndOfStream,
                "End of stream '<memory>'",
            ));
        }
        if size < self.buffer.len() {
            self.buffer.truncate(size);
            self.position = self.buffer.len();
        }
        Ok(())
    }

    fn close(&mut self) -> MResult<()> {
        self.position = 0;
        // Intentionally keep the buffer
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl Stream {
    /// Empty read-write memory stream.
    pub fn memory() -> Stream {
        Stream::memory_from_bytes(&[], FLAG_READ_WRITE)
    }

    /// Memory stream over a copy of `bytes`, open with `flags`.
    pub fn memory_from_bytes(bytes: &[u8], flags: u32) -> Stream {
        Stream::open_with_class(
            &STREAM_MEMORY_CLASS,
            Box::new(MemoryDevice::new(bytes)),
            flags,
        )
    }

    /// Stored bytes of a memory stream, buffered layers included only
    /// after a flush. `None` for non-memory streams.
    pub fn memory_buffer(&self) -> Option<Vec<u8>> {
        self.bottom_device()?
            .as_any()
            .downcast_ref::<MemoryDevice>()
            .map(|device| device.buffer().to_vec())
    }
}

pub static STREAM_MEMORY_CLASS: MClass = MClass {
    name: "StreamMemory",
    type_name: "StreamMemory",
    parent: Some(&super::STREAM_CLASS),
    properties: &[PropertyDef::readonly(
        "Buffer",
        VariantKind::ByteString,
        PropertyGetter::Object(|o| {
            let stream = o.downcast_ref::<Stream>()?;
            Ok(Variant::byte_string(stream.memory_buffer().unwrap_or_default()))
        }),
    )],
    services: &[
        ServiceDef::overloaded(
            "New",
            ServiceMethod::Class0(|| {
                Ok(Variant::from_object(std::sync::Arc::new(Stream::memory())))
            }),
            0,
            "() -> StreamMemory",
        ),
        ServiceDef::overloaded(
            "New",
            ServiceMethod::Class1(|bytes| {
                Ok(Variant::from_object(std::sync::Arc::new(
                    Stream::memory_from_bytes(&bytes.as_byte_string()?, FLAG_READ_WRITE),
                )))
            }),
            1,
            "(bytes: ByteString) -> StreamMemory",
        ),
        ServiceDef::overloaded(
            "New",
            ServiceMethod::Class2(|bytes, flags| {
                Ok(Variant::from_object(std::sync::Arc::new(
                    Stream::memory_from_bytes(&bytes.as_byte_string()?, flags.as_uint()?),
                )))
            }),
            2,
            "(bytes: ByteString, flags: UInt) -> StreamMemory",
        ),
    ],
};

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Self-describing stream abstraction with pluggable processors.
//!
//! A [`Stream`] owns a chain of [`StreamDevice`] layers: the innermost is
//! the real storage (memory, a file descriptor, ...), and decorators wrap
//! it for buffering, text-mode newline translation, and transparent
//! encryption. Every operation validates the open flags against its
//! direction before touching the chain; read operations return "nothing"
//! at end of stream rather than failing, except the strict paths used
//! when an exact count is required.
//!
//! Setting the [`Stream::set_key`] property at any nesting level reaches
//! the cryptographic layer, installing one on first use.

mod memory;
mod processor;
mod raw;


pub use memory::{MemoryDevice, STREAM_MEMORY_CLASS};
pub use processor::{BufferedDevice, CryptoDevice, TextDevice};

use crate::error::{MError, MErrorCode, MResult};
use crate::reflect::{MClass, PropertyDef, PropertyGetter, PropertySetter, ServiceDef, ServiceMethod};
use crate::variant::{Variant, VariantKind};

// Open flags. A stream opened with neither direction bit defaults to
// read-only by convention.
pub const FLAG_READ_ONLY: u32 = 0x01;
pub const FLAG_WRITE_ONLY: u32 = 0x02;
pub const FLAG_READ_WRITE: u32 = FLAG_READ_ONLY | FLAG_WRITE_ONLY;
pub const FLAG_TEXT: u32 = 0x04;
pub const FLAG_BUFFERED: u32 = 0x08;

/// Direction of the last stream operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamOp {
    None,
    Read,
    Write,
}

/// One layer of a stream chain: either real storage or a decorator
/// delegating downward.
pub trait StreamDevice: Send + Sync {
    /// Identification of the stream for error messages.
    fn name(&self) -> String;

    fn is_open(&self) -> bool {
        true
    }

    /// Read up to `buf.len()` bytes; 0 means end of stream.
    fn read_some(&mut self, buf: &mut [u8]) -> MResult<usize>;

    /// Write the whole buffer.
    fn write_bytes(&mut self, buf: &[u8]) -> MResult<()>;

    /// The wrapped layer, for decorators.
    fn inner(&self) -> Option<&dyn StreamDevice> {
        None
    }

    fn inner_mut(&mut self) -> Option<&mut dyn StreamDevice> {
        None
    }

    fn position(&self) -> MResult<u64> {
        match self.inner() {
            Some(inner) => inner.position(),
            None => Err(unsupported_op("Cannot get position from this stream type")),
        }
    }

    fn set_position(&mut self, position: u64) -> MResult<()> {
        match self.inner_mut() {
            Some(inner) => inner.set_position(position),
            None => Err(unsupported_op("Cannot set position for this stream type")),
        }
    }

    fn size(&self) -> MResult<u64> {
        match self.inner() {
            Some(inner) => inner.size(),
            None => Err(unsupported_op("Cannot get size from this stream type")),
        }
    }

    fn set_size(&mut self, size: u64) -> MResult<()> {
        match self.inner_mut() {
            Some(inner) => inner.set_size(size),
            None => Err(unsupported_op("Cannot set size for this stream type")),
        }
    }

    /// Flush buffered state downward. The soft form runs during close and
    /// may release terminal unwritten bytes differently than a mid-stream
    /// flush.
    fn flush(&mut self, soft: bool) -> MResult<()> {
        match self.inner_mut() {
            Some(inner) => inner.flush(soft),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> MResult<()> {
        match self.inner_mut() {
            Some(inner) => inner.close(),
            None => Ok(()),
        }
    }

    /// Propagate key material down to the cryptographic layer.
    fn set_key(&mut self, key: Option<&[u8]>) -> MResult<()> {
        match self.inner_mut() {
            Some(inner) => inner.set_key(key),
            None => Ok(()),
        }
    }

    /// The stream direction is about to change; buffering layers sync.
    fn switch_direction(&mut self, writing: bool) -> MResult<()> {
        match self.inner_mut() {
            Some(inner) => inner.switch_direction(writing),
            None => Ok(()),
        }
    }

    fn as_any(&self) -> &dyn std::any::Any;
}

#[track_caller]
fn unsupported_op(message: &str) -> MError {
    MError::software(MErrorCode::OperationNotSupported, message)
}

/// Stream over a device chain, with direction discipline and a reflected
/// surface.
pub struct Stream {
    class: &'static MClass,
    device: Option<Box<dyn StreamDevice>>,
    flags: u32,
    last_op: StreamOp,
    /// Tiny pushback buffer serving unread bytes before the chain.
    saved: [u8; 2],
    saved_count: usize,
    key: Vec<u8>,
}

impl Stream {
    /// Open over a device, assembling the decorator chain from the flags.
    pub fn open_device(device: Box<dyn StreamDevice>, flags: u32) -> Stream {
        Stream::open_with_class(&STREAM_CLASS, device, flags)
    }

    pub(crate) fn open_with_class(
        class: &'static MClass,
        device: Box<dyn StreamDevice>,
        mut flags: u32,
    ) -> Stream {
        if flags & FLAG_READ_WRITE == 0 {
            flags |= FLAG_READ_ONLY; // by convention
        }
        let mut chain = device;
        if flags & FLAG_BUFFERED != 0 {
            chain = Box::new(BufferedDevice::new(chain));
        }
        if flags & FLAG_TEXT != 0 {
            chain = Box::new(TextDevice::new(chain));
        }
        log::debug!("opening stream '{}' with flags {:#x}", chain.name(), flags);
        Stream {
            class,
            device: Some(chain),
            flags,
            last_op: StreamOp::None,
            saved: [0; 2],
            saved_count: 0,
            key: Vec::new(),
        }
    }

    pub fn name(&self) -> String {
        match &self.device {
            Some(device) => device.name(),
            None => "<closed>".to_string(),
        }
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn is_open(&self) -> bool {
        self.device.as_ref().is_some_and(|d| d.is_open()) && self.flags != 0
    }

    /// Key as a hex string; empty when no key is set.
    pub fn key(&self) -> String {
        hex::encode_upper(&self.key)
    }

    /// Assign the encryption key from a hex string. A nonempty key
    /// installs the cryptographic layer at the outer end of the chain on
    /// first use; an empty string removes the key.
    pub fn set_key(&mut self, key_hex: &str) -> MResult<()> {
        let key = if key_hex.is_empty() {
            Vec::new()
        } else {
            crate::codec::hex_to_bytes(key_hex)?
        };
        if !key.is_empty() {
            crate::crypto::AesEax::check_key_size_valid(&key)?;
        }
        if self.device.is_some() {
            if key.is_empty() {
                self.device.as_mut().expect("device present").set_key(None)?;
            } else if !device_has_crypto(self.device.as_deref().expect("device present")) {
                let inner = self.device.take().expect("device present");
                let mut crypto = Box::new(CryptoDevice::new(inner));
                crypto.set_key(Some(&key))?;
                self.device = Some(crypto);
            } else {
                self.device.as_mut().expect("device present").set_key(Some(&key))?;
            }
        }
        self.key = key;
        Ok(())
    }

    pub fn position(&self) -> MResult<u64> {
        let position = self.require_device()?.position()?;
        Ok(position.saturating_sub(self.saved_count as u64))
    }

    pub fn set_position(&mut self, position: u64) -> MResult<()> {
        self.saved_count = 0;
        self.require_device_mut()?.set_position(position)
    }

    pub fn size(&self) -> MResult<u64> {
        self.require_device()?.size()
    }

    pub fn set_size(&mut self, size: u64) -> MResult<()> {
        self.prepare_for_op(StreamOp::Write)?;
        self.require_device_mut()?.set_size(size)
    }

    // Reading -----------------------------------------------------------

    /// One byte, or `None` at end of stream.
    pub fn read_byte(&mut self) -> MResult<Option<u8>> {
        let mut byte = [0u8; 1];
        Ok(if self.read_available_bytes(&mut byte)? == 0 {
            None
        } else {
            Some(byte[0])
        })
    }

    /// Exactly `count` bytes; a short read is an error.
    pub fn read(&mut self, count: usize) -> MResult<Vec<u8>> {
        let mut buffer = vec![0u8; count];
        self.read_bytes(&mut buffer)?;
        Ok(buffer)
    }

    /// Up to `count` bytes, whatever is available.
    pub fn read_available(&mut self, count: usize) -> MResult<Vec<u8>> {
        let mut buffer = vec![0u8; count];
        let len = self.read_available_bytes(&mut buffer)?;
        buffer.truncate(len);
        Ok(buffer)
    }

    /// Everything to the end of the stream.
    pub fn read_all(&mut self) -> MResult<Vec<u8>> {
        let mut result = Vec::new();
        let mut buffer = [0u8; 0x1000];
        loop {
            let len = self.read_available_bytes(&mut buffer)?;
            result.extend_from_slice(&buffer[..len]);
            if len < buffer.len() {
                break;
            }
        }
        Ok(result)
    }

    /// One line without its terminator; `\r` is dropped by convention.
    /// `None` at end of stream.
    pub fn read_line(&mut self) -> MResult<Option<String>> {
        let mut line = String::new();
        loop {
            match self.read_byte()? {
                None => {
                    return Ok(if line.is_empty() { None } else { Some(line) });
                }
                Some(b'\n') => return Ok(Some(line)),
                Some(b'\r') => {}
                Some(byte) => line.push(byte as char),
            }
        }
    }

    pub fn read_all_lines(&mut self) -> MResult<Vec<String>> {
        let mut result = Vec::new();
        while let Some(line) = self.read_line()? {
            result.push(line);
        }
        Ok(result)
    }

    /// Fill the whole buffer or fail with `EndOfStream`.
    pub fn read_bytes(&mut self, buffer: &mut [u8]) -> MResult<()> {
        let len = self.read_available_bytes(buffer)?;
        if len != buffer.len() {
            return Err(self.throw_end_of_stream());
        }
        Ok(())
    }

    /// Read into the buffer, serving pushback bytes first. Returns the
    /// number of bytes stored, 0 at end of stream.
    pub fn read_available_bytes(&mut self, buffer: &mut [u8]) -> MResult<usize> {
        self.prepare_for_op(StreamOp::Read)?;
        if buffer.is_empty() {
            return Ok(0);
        }
        let mut filled = 0;
        while self.saved_count > 0 && filled < buffer.len() {
            buffer[filled] = self.saved[0];
            self.saved[0] = self.saved[1];
            self.saved_count -= 1;
            filled += 1;
        }
        let device = self.require_device_mut()?;
        while filled < buffer.len() {
            let len = device.read_some(&mut buffer[filled..])?;
            if len == 0 {
                break;
            }
            filled += len;
        }
        Ok(filled)
    }

    /// Return bytes to the stream; at most two are held.
    pub fn unread_bytes(&mut self, bytes: &[u8]) -> MResult<()> {
        if self.saved_count + bytes.len() > 2 {
            return Err(MError::software(
                MErrorCode::OperationNotSupported,
                "Pushback buffer can hold no more than two bytes",
            ));
        }
        for &b in bytes.iter().rev() {
            self.saved[1] = self.saved[0];
            self.saved[0] = b;
            self.saved_count += 1;
        }
        Ok(())
    }

    /// Skip `count` bytes by reading them.
    pub fn skip(&mut self, count: usize) -> MResult<()> {
        let mut buffer = [0u8; 256];
        let mut remaining = count;
        while remaining > 0 {
            let chunk = remaining.min(buffer.len());
            self.read_bytes(&mut buffer[..chunk])?;
            remaining -= chunk;
        }
        Ok(())
    }

    // Writing -----------------------------------------------------------

    pub fn write_byte(&mut self, byte: u8) -> MResult<()> {
        self.write_bytes(&[byte])
    }

    pub fn write(&mut self, bytes: &[u8]) -> MResult<()> {
        self.write_bytes(bytes)
    }

    /// Write the line, appending `\n` unless the text already ends with
    /// one.
    pub fn write_line(&mut self, line: &str) -> MResult<()> {
        if !line.is_empty() {
            self.write_bytes(line.as_bytes())?;
            if line.ends_with('\n') {
                return Ok(());
            }
        }
        self.write_byte(b'\n')
    }

    pub fn write_all_lines(&mut self, lines: &[String]) -> MResult<()> {
        for line in lines {
            self.write_line(line)?;
        }
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> MResult<()> {
        self.prepare_for_op(StreamOp::Write)?;
        self.require_device_mut()?.write_bytes(bytes)
    }

    /// Hard flush of every buffering layer.
    pub fn flush(&mut self) -> MResult<()> {
        self.prepare_for_op(StreamOp::Write)?;
        self.require_device_mut()?.flush(false)
    }

    /// Close the stream: soft-flush terminal writes, close the chain, and
    /// zero the flags. The chain is torn down even when the flush fails.
    /// Idempotent.
    pub fn close(&mut self) -> MResult<()> {
        if self.flags == 0 {
            return Ok(());
        }
        let flush_result = if self.last_op == StreamOp::Write {
            match self.device.as_mut() {
                Some(device) => device.flush(true),
                None => Ok(()),
            }
        } else {
            Ok(())
        };
        let close_result = match self.device.as_mut() {
            Some(device) => device.close(),
            None => Ok(()),
        };
        self.flags = 0;
        self.last_op = StreamOp::None;
        self.saved_count = 0;
        log::debug!("closed stream '{}'", self.name());
        flush_result?;
        close_result
    }

    // Internals ---------------------------------------------------------

    /// Validate and cache the operation direction; the first byte of
    /// every operation lands here.
    fn prepare_for_op(&mut self, op: StreamOp) -> MResult<()> {
        debug_assert!(op != StreamOp::None);
        if self.flags == 0 {
            return Err(MError::plain(
                MErrorCode::BadStreamFlag,
                format!("Stream '{}' not open", self.name()),
            ));
        }
        if op != self.last_op {
            match op {
                StreamOp::Write => {
                    if self.flags & FLAG_WRITE_ONLY == 0 {
                        return Err(MError::plain(
                            MErrorCode::CannotWriteToReadonlyStream,
                            format!("Cannot write to readonly stream '{}'", self.name()),
                        ));
                    }
                }
                StreamOp::Read => {
                    if self.flags & FLAG_READ_ONLY == 0 {
                        return Err(MError::plain(
                            MErrorCode::CannotReadFromWriteonlyStream,
                            format!("Cannot read from writeonly stream '{}'", self.name()),
                        ));
                    }
                }
                StreamOp::None => {}
            }
            if self.last_op != StreamOp::None {
                if let Some(device) = self.device.as_mut() {
                    device.switch_direction(op == StreamOp::Write)?;
                }
            }
            self.last_op = op;
        }
        Ok(())
    }

    fn require_device(&self) -> MResult<&dyn StreamDevice> {
        match &self.device {
            Some(device) => Ok(device.as_ref()),
            None => Err(MError::plain(
                MErrorCode::BadStreamFlag,
                "Stream '<closed>' not open",
            )),
        }
    }

    fn require_device_mut(&mut self) -> MResult<&mut dyn StreamDevice> {
        match &mut self.device {
            Some(device) => Ok(device.as_mut()),
            None => Err(MError::plain(
                MErrorCode::BadStreamFlag,
                "Stream '<closed>' not open",
            )),
        }
    }

    /// Innermost device of the chain.
    pub(crate) fn bottom_device(&self) -> Option<&dyn StreamDevice> {
        let mut device = self.device.as_deref()?;
        while let Some(inner) = device.inner() {
            device = inner;
        }
        Some(device)
    }

    #[track_caller]
    pub(crate) fn throw_end_of_stream(&self) -> MError {
        MError::plain(
            MErrorCode::EndOfStream,
            format!("End of stream '{}'", self.name()),
        )
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        // Best effort, silent on error
        let _ = self.close();
    }
}

fn device_has_crypto(device: &dyn StreamDevice) -> bool {
    if device.as_any().is::<CryptoDevice>() {
        return true;
    }
    match device.inner() {
        Some(inner) => device_has_crypto(inner),
        None => false,
    }
}

// Reflection -------------------------------------------------------------

impl crate::reflect::MObject for Stream {
    fn class(&self) -> &'static MClass {
        self.class
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

pub static STREAM_CLASS: MClass = MClass {
    name: "Stream",
    type_name: "Stream",
    parent: Some(&crate::reflect::OBJECT_CLASS),
    properties: &[
        PropertyDef::enumeration("FlagReadOnly", FLAG_READ_ONLY),
        PropertyDef::enumeration("FlagWriteOnly", FLAG_WRITE_ONLY),
        PropertyDef::enumeration("FlagReadWrite", FLAG_READ_WRITE),
        PropertyDef::enumeration("FlagText", FLAG_TEXT),
        PropertyDef::enumeration("FlagBuffered", FLAG_BUFFERED),
        PropertyDef::readonly(
            "Name",
            VariantKind::String,
            PropertyGetter::Object(|o| Ok(Variant::from(o.downcast_ref::<Stream>()?.name()))),
        ),
        PropertyDef::read_write(
            "Position",
            VariantKind::UInt,
            PropertyGetter::Object(|o| {
                Ok(Variant::UInt(o.downcast_ref::<Stream>()?.position()? as u32))
            }),
            PropertySetter::Object(|o, v| {
                o.downcast_mut::<Stream>()?.set_position(u64::from(v.as_uint()?))
            }),
        ),
        PropertyDef::read_write(
            "Size",
            VariantKind::UInt,
            PropertyGetter::Object(|o| {
                Ok(Variant::UInt(o.downcast_ref::<Stream>()?.size()? as u32))
            }),
            PropertySetter::Object(|o, v| {
                o.downcast_mut::<Stream>()?.set_size(u64::from(v.as_uint()?))
            }),
        ),
        PropertyDef::readonly(
            "Flags",
            VariantKind::UInt,
            PropertyGetter::Object(|o| Ok(Variant::UInt(o.downcast_ref::<Stream>()?.flags()))),
        ),
        PropertyDef::readonly(
            "IsOpen",
            VariantKind::Bool,
            PropertyGetter::Object(|o| Ok(Variant::Bool(o.downcast_ref::<Stream>()?.is_open()))),
        ),
        PropertyDef::read_write(
            "Key",
            VariantKind::String,
            PropertyGetter::Object(|o| Ok(Variant::from(o.downcast_ref::<Stream>()?.key()))),
            PropertySetter::Object(|o, v| o.downcast_mut::<Stream>()?.set_key(&v.as_string()?)),
        ),
    ],
    services: &[
        ServiceDef::of(
            "ReadByte",
            ServiceMethod::Mut0(|o| {
                Ok(match o.downcast_mut::<Stream>()?.read_byte()? {
                    Some(byte) => Variant::Byte(byte),
                    None => Variant::Int(-1),
                })
            }),
            "() -> Int",
        ),
        ServiceDef::of(
            "Read",
            ServiceMethod::Mut1(|o, n| {
                Ok(Variant::byte_string(
                    o.downcast_mut::<Stream>()?.read(n.as_uint()? as usize)?,
                ))
            }),
            "(count: UInt) -> ByteString",
        ),
        ServiceDef::of(
            "ReadLine",
            ServiceMethod::Mut0(|o| {
                Ok(match o.downcast_mut::<Stream>()?.read_line()? {
                    Some(line) => Variant::from(line),
                    None => Variant::Empty,
                })
            }),
            "() -> String",
        ),
        ServiceDef::of(
            "ReadAll",
            ServiceMethod::Mut0(|o| {
                Ok(Variant::byte_string(o.downcast_mut::<Stream>()?.read_all()?))
            }),
            "() -> ByteString",
        ),
        ServiceDef::of(
            "ReadAvailable",
            ServiceMethod::Mut1(|o, n| {
                Ok(Variant::byte_string(
                    o.downcast_mut::<Stream>()?.read_available(n.as_uint()? as usize)?,
                ))
            }),
            "(count: UInt) -> ByteString",
        ),
        ServiceDef::of(
            "ReadAllLines",
            ServiceMethod::Mut0(|o| {
                Ok(Variant::from(o.downcast_mut::<Stream>()?.read_all_lines()?))
            }),
            "() -> StringCollection",
        ),
        ServiceDef::of(
            "WriteByte",
            ServiceMethod::Mut1(|o, b| {
                o.downcast_mut::<Stream>()?.write_byte(b.as_byte()?)?;
                Ok(Variant::Empty)
            }),
            "(byte: Byte)",
        ),
        ServiceDef::of(
            "Write",
            ServiceMethod::Mut1(|o, bytes| {
                o.downcast_mut::<Stream>()?.write(&bytes.as_byte_string()?)?;
                Ok(Variant::Empty)
            }),
            "(bytes: ByteString)",
        ),
        ServiceDef::of(
            "WriteLine",
            ServiceMethod::Mut1(|o, line| {
                o.downcast_mut::<Stream>()?.write_line(&line.as_string()?)?;
                Ok(Variant::Empty)
            }),
            "(line: String)",
        ),
        ServiceDef::of(
            "WriteAllLines",
            ServiceMethod::Mut1(|o, lines| {
                o.downcast_mut::<Stream>()?
                    .write_all_lines(&lines.as_string_collection()?)?;
                Ok(Variant::Empty)
            }),
            "(lines: StringCollection)",
        ),
        ServiceDef::of(
            "Skip",
            ServiceMethod::Mut1(|o, n| {
                o.downcast_mut::<Stream>()?.skip(n.as_uint()? as usize)?;
                Ok(Variant::Empty)
            }),
            "(count: UInt)",
        ),
        ServiceDef::of(
            "Flush",
            ServiceMethod::Mut0(|o| {
                o.downcast_mut::<Stream>()?.flush()?;
                Ok(Variant::Empty)
            }),
            "()",
        ),
        ServiceDef::of(
            "Close",
            ServiceMethod::Mut0(|o| {
                o.downcast_mut::<Stream>()?.close()?;
                Ok(Variant::Empty)
            }),
            "()",
        ),
    ],
};

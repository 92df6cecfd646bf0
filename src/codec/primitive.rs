//! Byte level primitives the metadata codec is written against.
//!
//! ```text
//! byte             1 raw byte
//! small int        unsigned LEB128, at most 5 bytes
//! string           small int byte length | UTF-8 bytes
//! nullable string  presence byte (0 | 1) | string when present
//! boolean          1 byte (0 | 1)
//! long             8 bytes, big-endian
//! ```

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

const MAX_SMALL_INT_BYTES: u32 = 5;

pub trait Encoder {
    fn write_byte(&mut self, value: u8) -> io::Result<()>;
    fn write_small_int(&mut self, value: u32) -> io::Result<()>;
    fn write_string(&mut self, value: &str) -> io::Result<()>;
    fn write_nullable_string(&mut self, value: Option<&str>) -> io::Result<()>;
    fn write_boolean(&mut self, value: bool) -> io::Result<()>;
    fn write_long(&mut self, value: i64) -> io::Result<()>;
}

pub trait Decoder {
    fn read_byte(&mut self) -> io::Result<u8>;
    fn read_small_int(&mut self) -> io::Result<u32>;
    fn read_string(&mut self) -> io::Result<String>;
    fn read_nullable_string(&mut self) -> io::Result<Option<String>>;
    fn read_boolean(&mut self) -> io::Result<bool>;
    fn read_long(&mut self) -> io::Result<i64>;
}

pub struct BinaryEncoder<W> {
    inner: W,
}

impl<W: Write> BinaryEncoder<W> {
    pub fn new(inner: W) -> Self {
        BinaryEncoder { inner }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Encoder for BinaryEncoder<W> {
    fn write_byte(&mut self, value: u8) -> io::Result<()> {
        self.inner.write_u8(value)
    }

    fn write_small_int(&mut self, mut value: u32) -> io::Result<()> {
        loop {
            let low = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                return self.inner.write_u8(low);
            }
            self.inner.write_u8(low | 0x80)?;
        }
    }

    fn write_string(&mut self, value: &str) -> io::Result<()> {
        let len = u32::try_from(value.len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("string of {} bytes is too long to encode", value.len()),
            )
        })?;
        self.write_small_int(len)?;
        self.inner.write_all(value.as_bytes())
    }

    fn write_nullable_string(&mut self, value: Option<&str>) -> io::Result<()> {
        match value {
            None => self.write_boolean(false),
            Some(value) => {
                self.write_boolean(true)?;
                self.write_string(value)
            }
        }
    }

    fn write_boolean(&mut self, value: bool) -> io::Result<()> {
        self.inner.write_u8(u8::from(value))
    }

    fn write_long(&mut self, value: i64) -> io::Result<()> {
        self.inner.write_i64::<BigEndian>(value)
    }
}

pub struct BinaryDecoder<R> {
    inner: R,
}

impl<R: Read> BinaryDecoder<R> {
    pub fn new(inner: R) -> Self {
        BinaryDecoder { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

fn invalid_data(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

impl<R: Read> Decoder for BinaryDecoder<R> {
    fn read_byte(&mut self) -> io::Result<u8> {
        self.inner.read_u8()
    }

    fn read_small_int(&mut self) -> io::Result<u32> {
        let mut result: u32 = 0;
        for index in 0..MAX_SMALL_INT_BYTES {
            let byte = self.inner.read_u8()?;
            let bits = u32::from(byte & 0x7F);
            let shift = index * 7;
            if shift == 28 && bits > 0x0F {
                return Err(invalid_data("small int overflows 32 bits".to_string()));
            }
            result |= bits << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(invalid_data(format!(
            "small int is longer than {} bytes",
            MAX_SMALL_INT_BYTES
        )))
    }

    fn read_string(&mut self) -> io::Result<String> {
        let len = self.read_small_int()?;
        let mut bytes = Vec::new();
        self.inner
            .by_ref()
            .take(u64::from(len))
            .read_to_end(&mut bytes)?;
        if bytes.len() as u64 != u64::from(len) {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {} string bytes, found {}", len, bytes.len()),
            ));
        }
        String::from_utf8(bytes).map_err(|e| invalid_data(e.to_string()))
    }

    fn read_nullable_string(&mut self) -> io::Result<Option<String>> {
        if self.read_boolean()? {
            self.read_string().map(Some)
        } else {
            Ok(None)
        }
    }

    fn read_boolean(&mut self) -> io::Result<bool> {
        match self.inner.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(invalid_data(format!("invalid boolean byte {}", other))),
        }
    }

    fn read_long(&mut self) -> io::Result<i64> {
        self.inner.read_i64::<BigEndian>()
    }
}

use crate::error::DecodeError;

/// A byte buffer meant for reading command payloads.
///
/// All multi-byte scalars are little-endian and fixed width. Strings are
/// NUL-terminated. Every successful read advances the index by exactly the
/// number of bytes consumed, so a sequence of reads walks the payload at the
/// same offsets the schema declares.
///
/// Example usage:
///
/// ```
/// let mut bb = arcmd_schema::ByteBuffer::new(&[0x0A, 0x00, 0x68, 0x69, 0x00]);
/// assert_eq!(bb.read_i16(), Ok(10));
/// assert_eq!(bb.read_string(), Ok("hi".to_owned()));
/// ```
///
pub struct ByteBuffer<'a> {
    data: &'a [u8],
    index: usize,
}

impl<'a> ByteBuffer<'a> {
    /// Create a new ByteBuffer that wraps the provided byte slice. The lifetime
    /// of the returned ByteBuffer must not outlive the lifetime of the byte
    /// slice.
    pub fn new(data: &'a [u8]) -> ByteBuffer<'a> {
        ByteBuffer { data, index: 0 }
    }

    /// Retrieves the underlying byte slice.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Retrieves the current offset into the underlying byte slice. This starts
    /// off as 0 and ends up as `self.data().len()` when everything has been
    /// read.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of bytes left after the current offset.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.index
    }

    /// Try to read a byte starting at the current index.
    pub fn read_byte(&mut self) -> Result<u8, DecodeError> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    /// Try to read `len` bytes starting at the current index.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            Err(DecodeError::UnexpectedEof {
                offset: self.index,
                needed: len - self.remaining(),
            })
        } else {
            let value = &self.data[self.index..self.index + len];
            self.index += len;
            Ok(value)
        }
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        self.read_byte()
    }

    pub fn read_i8(&mut self) -> Result<i8, DecodeError> {
        Ok(i8::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    /// Try to read an IEEE-754 single precision float.
    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Try to read an IEEE-754 double precision float.
    pub fn read_f64(&mut self) -> Result<f64, DecodeError> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    /// Try to read a NUL-terminated string starting at the current index.
    ///
    /// The terminator is consumed, so the index moves past it, but it is not
    /// part of the returned value. Invalid UTF-8 is replaced lossily. When no
    /// terminator exists before the end of the data the index is left where
    /// it was.
    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let start = self.index;
        match self.data[start..].iter().position(|&b| b == 0) {
            Some(len) => {
                self.index = start + len + 1;
                Ok(String::from_utf8_lossy(&self.data[start..start + len]).into_owned())
            }
            None => Err(DecodeError::UnterminatedString { offset: start }),
        }
    }
}

#[test]
fn read_byte() {
    let read = |bytes| ByteBuffer::new(bytes).read_byte();
    assert_eq!(read(&[]), Err(DecodeError::UnexpectedEof { offset: 0, needed: 1 }));
    assert_eq!(read(&[0]), Ok(0));
    assert_eq!(read(&[1]), Ok(1));
    assert_eq!(read(&[254]), Ok(254));
    assert_eq!(read(&[255]), Ok(255));
}

#[test]
fn read_bytes() {
    let read = |bytes, len| ByteBuffer::new(bytes).read_bytes(len);
    assert_eq!(read(&[], 0), Ok(vec![].as_slice()));
    assert_eq!(read(&[], 1), Err(DecodeError::UnexpectedEof { offset: 0, needed: 1 }));
    assert_eq!(read(&[0], 0), Ok(vec![].as_slice()));
    assert_eq!(read(&[0], 1), Ok(vec![0].as_slice()));
    assert_eq!(read(&[0], 3), Err(DecodeError::UnexpectedEof { offset: 0, needed: 2 }));
}

#[test]
fn read_bytes_with_huge_length() {
    let mut bb = ByteBuffer::new(&[1, 2, 3]);
    assert_eq!(bb.read_byte(), Ok(1));
    assert_eq!(
        bb.read_bytes(usize::MAX),
        Err(DecodeError::UnexpectedEof { offset: 1, needed: usize::MAX - 2 })
    );
    assert_eq!(bb.index(), 1);
}

#[test]
fn read_signed_scalars() {
    assert_eq!(ByteBuffer::new(&[0xFF]).read_i8(), Ok(-1));
    assert_eq!(ByteBuffer::new(&[0xFE, 0xFF]).read_i16(), Ok(-2));
    assert_eq!(ByteBuffer::new(&[0x00, 0x00, 0x00, 0x80]).read_i32(), Ok(i32::MIN));
    assert_eq!(
        ByteBuffer::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F]).read_i64(),
        Ok(i64::MAX)
    );
}

#[test]
fn read_unsigned_scalars_are_little_endian() {
    assert_eq!(ByteBuffer::new(&[0x34, 0x12]).read_u16(), Ok(0x1234));
    assert_eq!(ByteBuffer::new(&[0x78, 0x56, 0x34, 0x12]).read_u32(), Ok(0x1234_5678));
    assert_eq!(
        ByteBuffer::new(&[1, 0, 0, 0, 0, 0, 0, 0x01]).read_u64(),
        Ok(0x0100_0000_0000_0001)
    );
}

#[test]
fn read_floats() {
    assert_eq!(ByteBuffer::new(&0.5f32.to_le_bytes()).read_f32(), Ok(0.5));
    assert_eq!(ByteBuffer::new(&(-1.25f64).to_le_bytes()).read_f64(), Ok(-1.25));
    assert_eq!(
        ByteBuffer::new(&[0, 0, 0]).read_f32(),
        Err(DecodeError::UnexpectedEof { offset: 0, needed: 1 })
    );
}

#[test]
fn read_string() {
    let read = |bytes| ByteBuffer::new(bytes).read_string();
    assert_eq!(read(&[]), Err(DecodeError::UnterminatedString { offset: 0 }));
    assert_eq!(read(&[0]), Ok("".to_owned()));
    assert_eq!(read(&[97]), Err(DecodeError::UnterminatedString { offset: 0 }));
    assert_eq!(read(&[97, 0]), Ok("a".to_owned()));
    assert_eq!(read(&[97, 98, 99, 0]), Ok("abc".to_owned()));
    assert_eq!(read(&[240, 159, 141, 149, 0]), Ok("🍕".to_owned()));
    assert_eq!(read(&[97, 0, 98, 0]), Ok("a".to_owned()));
}

#[test]
fn read_string_consumes_terminator() {
    let mut bb = ByteBuffer::new(&[b'A', b'B', 0, 0x0A, 0x00]);
    assert_eq!(bb.read_string(), Ok("AB".to_owned()));
    assert_eq!(bb.index(), 3);
    assert_eq!(bb.read_i16(), Ok(10));
    assert_eq!(bb.remaining(), 0);
}

#[test]
fn failed_string_read_keeps_offset() {
    let mut bb = ByteBuffer::new(&[7, b'x', b'y']);
    assert_eq!(bb.read_u8(), Ok(7));
    assert_eq!(bb.read_string(), Err(DecodeError::UnterminatedString { offset: 1 }));
    assert_eq!(bb.index(), 1);
}

#[test]
fn read_sequence() {
    let data = [0x05, 0x01, 0x00, 0x00, 0x00, 0x41, 0x42, 0x00, 0x0A, 0x00];
    let mut bb = ByteBuffer::new(&data);
    assert_eq!(bb.read_u8(), Ok(5));
    assert_eq!(bb.index(), 1);
    assert_eq!(bb.read_u32(), Ok(1));
    assert_eq!(bb.index(), 5);
    assert_eq!(bb.read_string(), Ok("AB".to_owned()));
    assert_eq!(bb.index(), 8);
    assert_eq!(bb.read_i16(), Ok(10));
    assert_eq!(bb.index(), 10);
    assert_eq!(bb.read_byte(), Err(DecodeError::UnexpectedEof { offset: 10, needed: 1 }));
}

/// A byte buffer meant for writing command payloads and frames.
///
/// Example usage:
///
/// ```
/// let mut bb = arcmd_schema::ByteBufferMut::new();
/// bb.write_u8(5);
/// bb.write_u32(1);
/// bb.write_string("AB");
/// assert_eq!(bb.data(), [5, 1, 0, 0, 0, 65, 66, 0]);
/// ```
///
#[derive(Default)]
pub struct ByteBufferMut {
    data: Vec<u8>,
}

impl ByteBufferMut {
    /// Creates an empty ByteBufferMut ready for writing.
    pub fn new() -> ByteBufferMut {
        ByteBufferMut { data: vec![] }
    }

    /// Consumes this buffer and returns the underlying backing store. Use this
    /// to get the data out when you're done writing to the buffer.
    pub fn data(self) -> Vec<u8> {
        self.data
    }

    /// Returns the number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn write_bytes(&mut self, value: &[u8]) {
        self.data.extend_from_slice(value);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_i16(&mut self, value: i16) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Writes the UTF-8 bytes of `value` followed by a NUL terminator.
    pub fn write_string(&mut self, value: &str) {
        self.data.extend_from_slice(value.as_bytes());
        self.data.push(0);
    }
}

#[cfg(test)]
fn write_once(cb: fn(&mut ByteBufferMut)) -> Vec<u8> {
    let mut bb = ByteBufferMut::new();
    cb(&mut bb);
    bb.data()
}

#[test]
fn write_scalars() {
    assert_eq!(write_once(|bb| bb.write_u8(255)), [255]);
    assert_eq!(write_once(|bb| bb.write_i8(-1)), [255]);
    assert_eq!(write_once(|bb| bb.write_u16(0x1234)), [0x34, 0x12]);
    assert_eq!(write_once(|bb| bb.write_i16(-2)), [0xFE, 0xFF]);
    assert_eq!(write_once(|bb| bb.write_u32(1)), [1, 0, 0, 0]);
    assert_eq!(write_once(|bb| bb.write_i32(-1)), [255, 255, 255, 255]);
    assert_eq!(write_once(|bb| bb.write_u64(2)), [2, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(write_once(|bb| bb.write_i64(-1)), [255; 8]);
    assert_eq!(write_once(|bb| bb.write_f32(0.5)), 0.5f32.to_le_bytes());
    assert_eq!(write_once(|bb| bb.write_f64(0.5)), 0.5f64.to_le_bytes());
}

#[test]
fn write_string() {
    assert_eq!(write_once(|bb| bb.write_string("")), [0]);
    assert_eq!(write_once(|bb| bb.write_string("abc")), [97, 98, 99, 0]);
    assert_eq!(write_once(|bb| bb.write_string("🍕")), [240, 159, 141, 149, 0]);
}

#[test]
fn write_then_read_sequence() {
    let mut out = ByteBufferMut::new();
    out.write_u8(5);
    out.write_u32(1);
    out.write_string("AB");
    out.write_i16(10);
    assert_eq!(out.len(), 10);

    let data = out.data();
    let mut bb = ByteBuffer::new(&data);
    assert_eq!(bb.read_u8(), Ok(5));
    assert_eq!(bb.read_u32(), Ok(1));
    assert_eq!(bb.read_string(), Ok("AB".to_owned()));
    assert_eq!(bb.read_i16(), Ok(10));
}

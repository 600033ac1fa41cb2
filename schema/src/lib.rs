//! Runtime helpers linked by the Rust code that `arcmd` generates from an
//! ARSDK-style command schema.
//!
//! Generated decoders read their arguments sequentially, little-endian, out
//! of a [ByteBuffer]. Every generated command also implements [Decoder], so
//! a table of them can route a raw frame to the right decode procedure.
//!
//! ```
//! use arcmd_schema::*;
//!
//! let mut bb = ByteBuffer::new(&[0x05, 0x01, 0x00, 0x00, 0x00, b'A', b'B', 0x00]);
//! assert_eq!(bb.read_u8(), Ok(5));
//! assert_eq!(bb.read_u32(), Ok(1));
//! assert_eq!(bb.read_string(), Ok("AB".to_owned()));
//! assert_eq!(bb.index(), 8);
//! ```

pub mod bb;
pub mod command;
pub mod error;
pub mod value;

pub use bb::*;
pub use command::*;
pub use error::DecodeError;
pub use value::*;

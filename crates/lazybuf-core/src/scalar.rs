//! Decoded scalar values and their wire codecs.
//!
//! Every protobuf scalar type gets its own [`Scalar`] variant so a decoded
//! entry keeps enough fidelity to re-serialize canonically: a `sint32`
//! re-emits zig-zag, a `fixed32` re-emits four little-endian bytes, and a
//! negative `int32` re-emits its full ten-byte sign extension.

use std::ops::Range;

use bytes::Bytes;
use lazybuf_wire::{
    decode_zigzag32, decode_zigzag64, encode_zigzag32, encode_zigzag64, WireError, WireReader,
    WireType, WireWriter,
};

use crate::checks;
use crate::error::AccessorError;

/// Selector for one of the fifteen scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScalarKind {
    Bool,
    Int32,
    Uint32,
    Sint32,
    Int64,
    Uint64,
    Sint64,
    Fixed32,
    Sfixed32,
    Fixed64,
    Sfixed64,
    Float,
    Double,
    String,
    Bytes,
}

impl ScalarKind {
    /// The canonical wire type a write of this kind produces.
    pub(crate) fn wire_type(self) -> WireType {
        use ScalarKind::*;
        match self {
            Bool | Int32 | Uint32 | Sint32 | Int64 | Uint64 | Sint64 => WireType::Varint,
            Fixed64 | Sfixed64 | Double => WireType::Fixed64,
            String | Bytes => WireType::LengthDelimited,
            Fixed32 | Sfixed32 | Float => WireType::Fixed32,
        }
    }

    #[inline]
    pub(crate) fn is_packable(self) -> bool {
        self.wire_type().is_packable()
    }

    /// Decodes one value from a payload range of the source buffer.
    ///
    /// For the delimited kinds the range is the content after the length
    /// prefix; `Bytes` payloads are shared zero-copy with the source.
    pub(crate) fn decode(self, src: &Bytes, range: Range<usize>) -> Result<Scalar, AccessorError> {
        match self {
            ScalarKind::String => Ok(Scalar::String(decode_utf8(&src[range])?)),
            ScalarKind::Bytes => Ok(Scalar::Bytes(src.slice(range))),
            _ => {
                let mut r = WireReader::new(&src[range]);
                self.decode_next(&mut r)
            }
        }
    }

    /// Decodes the next value of this kind from a reader; used both for
    /// single payloads and for the elements of a packed run.
    pub(crate) fn decode_next(self, r: &mut WireReader<'_>) -> Result<Scalar, AccessorError> {
        let scalar = match self {
            ScalarKind::Bool => Scalar::Bool(r.varint()? != 0),
            ScalarKind::Int32 => Scalar::Int32(r.varint()? as i32),
            ScalarKind::Uint32 => Scalar::Uint32(r.varint()? as u32),
            ScalarKind::Sint32 => Scalar::Sint32(decode_zigzag32(r.varint()? as u32)),
            ScalarKind::Int64 => Scalar::Int64(r.varint()? as i64),
            ScalarKind::Uint64 => Scalar::Uint64(r.varint()?),
            ScalarKind::Sint64 => Scalar::Sint64(decode_zigzag64(r.varint()?)),
            ScalarKind::Fixed32 => Scalar::Fixed32(r.fixed32()?),
            ScalarKind::Sfixed32 => Scalar::Sfixed32(r.fixed32()? as i32),
            ScalarKind::Float => Scalar::Float(f32::from_bits(r.fixed32()?)),
            ScalarKind::Fixed64 => Scalar::Fixed64(r.fixed64()?),
            ScalarKind::Sfixed64 => Scalar::Sfixed64(r.fixed64()? as i64),
            ScalarKind::Double => Scalar::Double(f64::from_bits(r.fixed64()?)),
            ScalarKind::String => {
                let rest = r.bytes(r.remaining())?;
                Scalar::String(decode_utf8(rest)?)
            }
            ScalarKind::Bytes => {
                let rest = r.bytes(r.remaining())?;
                Scalar::Bytes(Bytes::copy_from_slice(rest))
            }
        };
        Ok(scalar)
    }
}

fn decode_utf8(content: &[u8]) -> Result<String, AccessorError> {
    if checks::CRITICAL_STATE {
        Ok(std::str::from_utf8(content)
            .map_err(|_| WireError::InvalidUtf8)?
            .to_owned())
    } else {
        Ok(String::from_utf8_lossy(content).into_owned())
    }
}

/// A materialized scalar value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Scalar {
    Bool(bool),
    Int32(i32),
    Uint32(u32),
    Sint32(i32),
    Int64(i64),
    Uint64(u64),
    Sint64(i64),
    Fixed32(u32),
    Sfixed32(i32),
    Fixed64(u64),
    Sfixed64(i64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Bytes),
}

impl Scalar {
    pub(crate) fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Int32(_) => ScalarKind::Int32,
            Scalar::Uint32(_) => ScalarKind::Uint32,
            Scalar::Sint32(_) => ScalarKind::Sint32,
            Scalar::Int64(_) => ScalarKind::Int64,
            Scalar::Uint64(_) => ScalarKind::Uint64,
            Scalar::Sint64(_) => ScalarKind::Sint64,
            Scalar::Fixed32(_) => ScalarKind::Fixed32,
            Scalar::Sfixed32(_) => ScalarKind::Sfixed32,
            Scalar::Fixed64(_) => ScalarKind::Fixed64,
            Scalar::Sfixed64(_) => ScalarKind::Sfixed64,
            Scalar::Float(_) => ScalarKind::Float,
            Scalar::Double(_) => ScalarKind::Double,
            Scalar::String(_) => ScalarKind::String,
            Scalar::Bytes(_) => ScalarKind::Bytes,
        }
    }

    #[inline]
    pub(crate) fn wire_type(&self) -> WireType {
        self.kind().wire_type()
    }

    /// Appends this value's payload bytes, without tag or length prefix.
    pub(crate) fn encode_raw(&self, w: &mut WireWriter) {
        match self {
            Scalar::Bool(v) => w.varint(*v as u64),
            Scalar::Int32(v) => w.varint(*v as i64 as u64),
            Scalar::Uint32(v) => w.varint(*v as u64),
            Scalar::Sint32(v) => w.varint(encode_zigzag32(*v) as u64),
            Scalar::Int64(v) => w.varint(*v as u64),
            Scalar::Uint64(v) => w.varint(*v),
            Scalar::Sint64(v) => w.varint(encode_zigzag64(*v)),
            Scalar::Fixed32(v) => w.fixed32(*v),
            Scalar::Sfixed32(v) => w.fixed32(*v as u32),
            Scalar::Float(v) => w.fixed32(v.to_bits()),
            Scalar::Fixed64(v) => w.fixed64(*v),
            Scalar::Sfixed64(v) => w.fixed64(*v as u64),
            Scalar::Double(v) => w.fixed64(v.to_bits()),
            Scalar::String(v) => w.raw(v.as_bytes()),
            Scalar::Bytes(v) => w.raw(v),
        }
    }

    /// Appends the complete field record: tag plus payload, length-prefixed
    /// for the delimited kinds.
    pub(crate) fn encode_field(&self, field_number: u32, w: &mut WireWriter) {
        w.tag(field_number, self.wire_type());
        match self {
            Scalar::String(v) => w.len_prefixed(v.as_bytes()),
            Scalar::Bytes(v) => w.len_prefixed(v),
            _ => self.encode_raw(w),
        }
    }
}

/// Re-reads `scalar` as `kind` through its wire representation, exactly as
/// if the value had round-tripped the wire.
pub(crate) fn reinterpret(kind: ScalarKind, scalar: &Scalar) -> Result<Scalar, AccessorError> {
    if scalar.kind() == kind {
        return Ok(scalar.clone());
    }
    let mut w = WireWriter::new();
    scalar.encode_raw(&mut w);
    let buf = Bytes::from(w.flush());
    let len = buf.len();
    kind.decode(&buf, 0..len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(kind: ScalarKind, scalar: Scalar) {
        let mut w = WireWriter::new();
        scalar.encode_raw(&mut w);
        let buf = Bytes::from(w.flush());
        let len = buf.len();
        assert_eq!(kind.decode(&buf, 0..len).unwrap(), scalar);
    }

    #[test]
    fn payload_roundtrip_per_kind() {
        roundtrip(ScalarKind::Bool, Scalar::Bool(true));
        roundtrip(ScalarKind::Int32, Scalar::Int32(-1));
        roundtrip(ScalarKind::Uint32, Scalar::Uint32(u32::MAX));
        roundtrip(ScalarKind::Sint32, Scalar::Sint32(i32::MIN));
        roundtrip(ScalarKind::Int64, Scalar::Int64(i64::MIN));
        roundtrip(ScalarKind::Uint64, Scalar::Uint64(u64::MAX));
        roundtrip(ScalarKind::Sint64, Scalar::Sint64(-736_983));
        roundtrip(ScalarKind::Fixed32, Scalar::Fixed32(1));
        roundtrip(ScalarKind::Sfixed32, Scalar::Sfixed32(-2));
        roundtrip(ScalarKind::Fixed64, Scalar::Fixed64(u64::MAX));
        roundtrip(ScalarKind::Sfixed64, Scalar::Sfixed64(-3));
        roundtrip(ScalarKind::Float, Scalar::Float(1.5));
        roundtrip(ScalarKind::Double, Scalar::Double(-0.25));
        roundtrip(ScalarKind::String, Scalar::String("héllo".to_owned()));
        roundtrip(ScalarKind::Bytes, Scalar::Bytes(Bytes::from_static(b"\x00\xff")));
    }

    #[test]
    fn negative_int32_sign_extends_to_ten_bytes() {
        let mut w = WireWriter::new();
        Scalar::Int32(-1).encode_raw(&mut w);
        assert_eq!(
            w.flush(),
            [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]
        );
    }

    #[test]
    fn sint32_zigzags() {
        let mut w = WireWriter::new();
        Scalar::Sint32(-1).encode_raw(&mut w);
        assert_eq!(w.flush(), [0x01]);
        Scalar::Sint32(1).encode_raw(&mut w);
        assert_eq!(w.flush(), [0x02]);
    }

    #[test]
    fn reinterpret_between_varint_kinds() {
        // sint32 value 1 encodes as varint 2; reading it back as int32 sees 2.
        let v = reinterpret(ScalarKind::Int32, &Scalar::Sint32(1)).unwrap();
        assert_eq!(v, Scalar::Int32(2));
        // uint32 reinterprets as the same bits.
        let v = reinterpret(ScalarKind::Int32, &Scalar::Uint32(u32::MAX)).unwrap();
        assert_eq!(v, Scalar::Int32(-1));
    }

    #[test]
    fn reinterpret_between_delimited_kinds() {
        let v = reinterpret(ScalarKind::Bytes, &Scalar::String("a".to_owned())).unwrap();
        assert_eq!(v, Scalar::Bytes(Bytes::from_static(b"a")));
    }
}

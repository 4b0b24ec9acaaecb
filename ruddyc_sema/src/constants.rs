//! Literal parsing: overflow detection and best-fit constant typing
//! (spec §4.5).
//!
//! Grounded in `original_source/Ast/Primitives.h` — in particular the
//! `CharConstant` expression's escape-sequence parser (`\\ \0 \n \r \t \'`
//! plus `\u`/`\x` hex up to `0xFFFF`, anything past that an
//! `UnknownControlCharacterException`) and `IntegerConstantType`'s
//! narrowing checks against each primitive's width.

use ruddyc_ast::FileLocation;

use crate::error::{SemaError, SemaResult};
use crate::types::{FloatKind, FloatingConstantValue, IntegerConstantRepr, IntegerKind, TypeInfo};

fn overflow(location: FileLocation, text: &str) -> SemaError {
    SemaError::Overflow {
        location,
        detail: format!("integer literal '{text}' does not fit in 64 bits"),
    }
}

/// Parses an integer literal's *source form* (spec §4.5): a leading `0x`/
/// `0X` always yields [`IntegerConstantRepr::HexUnsigned`] (narrowing
/// later additionally rejects any set bit above the target width, not
/// just range); otherwise the literal is signed if it parses as `i64`,
/// falling back to unsigned only when it is too large to be.
pub fn parse_integer_literal(text: &str, location: FileLocation) -> SemaResult<TypeInfo> {
    let repr = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        let v = u64::from_str_radix(hex, 16).map_err(|_| overflow(location, text))?;
        IntegerConstantRepr::HexUnsigned(v)
    } else if text.starts_with('-') {
        let v: i64 = text.parse().map_err(|_| overflow(location, text))?;
        IntegerConstantRepr::SignedI64(v)
    } else {
        match text.parse::<i64>() {
            Ok(v) => IntegerConstantRepr::SignedI64(v),
            Err(_) => {
                let v: u64 = text.parse().map_err(|_| overflow(location, text))?;
                IntegerConstantRepr::UnsignedU64(v)
            }
        }
    };
    Ok(TypeInfo::IntegerConstant(repr))
}

pub fn parse_float_literal(text: &str, location: FileLocation) -> SemaResult<TypeInfo> {
    let value: f64 = text
        .parse()
        .map_err(|_| SemaError::Overflow { location, detail: format!("'{text}' is not a valid float literal") })?;
    let fits_in_f32 = value == 0.0 || (value.abs() <= f32::MAX as f64 && value.abs() >= f32::MIN_POSITIVE as f64);
    Ok(TypeInfo::FloatingConstant(FloatingConstantValue { value, fits_in_f32 }))
}

fn unsigned_max(bits: u8) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

fn signed_range(bits: u8) -> (i64, i64) {
    match bits {
        32 => (i32::MIN as i64, i32::MAX as i64),
        _ => (i64::MIN, i64::MAX),
    }
}

fn signed_max_as_u64(bits: u8) -> u64 {
    match bits {
        32 => i32::MAX as u64,
        _ => i64::MAX as u64,
    }
}

/// spec §4.5 / §8.3 boundary cases: `2147483647` fits `int32`;
/// `2147483648` does not fit `int32` but does fit `uint32`; a hex literal
/// fits a target width only if it sets no bit above that width,
/// independent of sign.
pub fn integer_fits(repr: IntegerConstantRepr, target: IntegerKind) -> bool {
    let bits = target.bits();
    match repr {
        IntegerConstantRepr::SignedI64(v) => {
            if target.signed() {
                let (lo, hi) = signed_range(bits);
                v >= lo && v <= hi
            } else {
                v >= 0 && (v as u64) <= unsigned_max(bits)
            }
        }
        IntegerConstantRepr::UnsignedU64(v) => {
            if target.signed() {
                v <= signed_max_as_u64(bits)
            } else {
                v <= unsigned_max(bits)
            }
        }
        IntegerConstantRepr::HexUnsigned(v) => {
            let mask = unsigned_max(bits);
            v & !mask == 0
        }
    }
}

/// spec §4.3 line 194 / §4.5: an `auto`-typed integer or floating literal
/// resolves to the narrowest primitive that holds it losslessly —
/// `int32` before `int64` before `uint64`, `float` before `float64` —
/// rather than staying the raw constant type it parsed as.
pub fn best_fit_type_info(ty: &TypeInfo) -> TypeInfo {
    match ty {
        TypeInfo::IntegerConstant(repr) => TypeInfo::Integer(best_fit_integer(*repr)),
        TypeInfo::FloatingConstant(v) => {
            TypeInfo::Floating(if v.fits_in_f32 { FloatKind::F32 } else { FloatKind::F64 })
        }
        other => other.clone(),
    }
}

fn best_fit_integer(repr: IntegerConstantRepr) -> IntegerKind {
    [IntegerKind::Int32, IntegerKind::Int64, IntegerKind::UInt64]
        .into_iter()
        .find(|&kind| integer_fits(repr, kind))
        .unwrap_or(IntegerKind::UInt64)
}

pub fn check_integer_fits(repr: IntegerConstantRepr, target: IntegerKind, location: FileLocation) -> SemaResult<()> {
    if integer_fits(repr, target) {
        Ok(())
    } else {
        Err(SemaError::Overflow {
            location,
            detail: format!("literal does not fit in {}", target.logical_name()),
        })
    }
}

fn decode_one_char(chars: &mut std::iter::Peekable<std::str::Chars>, location: FileLocation) -> SemaResult<u32> {
    match chars.next() {
        None => Err(SemaError::UnknownControlCharacter { location, sequence: String::new() }),
        Some('\\') => match chars.next() {
            Some('\\') => Ok('\\' as u32),
            Some('0') => Ok(0),
            Some('n') => Ok('\n' as u32),
            Some('r') => Ok('\r' as u32),
            Some('t') => Ok('\t' as u32),
            Some('\'') => Ok('\'' as u32),
            Some('"') => Ok('"' as u32),
            Some(marker @ ('u' | 'x')) => {
                let mut hex = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_hexdigit() {
                        hex.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = u32::from_str_radix(&hex, 16)
                    .map_err(|_| SemaError::UnknownControlCharacter { location, sequence: format!("\\{marker}{hex}") })?;
                if value > 0xFFFF {
                    return Err(SemaError::UnknownControlCharacter { location, sequence: format!("\\{marker}{hex}") });
                }
                Ok(value)
            }
            Some(other) => Err(SemaError::UnknownControlCharacter { location, sequence: format!("\\{other}") }),
            None => Err(SemaError::UnknownControlCharacter { location, sequence: "\\".to_string() }),
        },
        Some(c) => Ok(c as u32),
    }
}

/// spec §4.5: a char literal's single escape (or literal character)
/// resolves to a 16-bit code point; whether it best-fits `charbyte` or
/// `char` is decided at the use site.
pub fn parse_char_literal(raw: &str, location: FileLocation) -> SemaResult<TypeInfo> {
    let mut chars = raw.chars().peekable();
    let code = decode_one_char(&mut chars, location)?;
    if chars.next().is_some() {
        return Err(SemaError::UnknownControlCharacter { location, sequence: raw.to_string() });
    }
    Ok(TypeInfo::CharConstant(code))
}

pub fn parse_string_literal(raw: &str, location: FileLocation) -> SemaResult<TypeInfo> {
    let mut chars = raw.chars().peekable();
    let mut out = String::new();
    while chars.peek().is_some() {
        let code = decode_one_char(&mut chars, location)?;
        out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
    }
    Ok(TypeInfo::StringConstant(out))
}

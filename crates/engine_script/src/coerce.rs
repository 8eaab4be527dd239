//! Script-style coercion of dynamic values to field kinds.
//!
//! Follows what a script runtime accepts when it checks arguments: numbers
//! and numeric strings are interchangeable, numbers are converted to their
//! string form where a string is expected, and numbers are narrowed to the
//! field width with C cast semantics: fractions truncate toward zero,
//! integers wrap to 32 bits and doubles beyond `f32` become infinite.

use std::borrow::Cow;

use crate::error::EncodeError;
use crate::host::{ScriptValue, ValueKind};
use crate::path::FieldPath;

pub(crate) fn to_i32<V: ScriptValue>(value: &V, path: &FieldPath<'_>) -> Result<i32, EncodeError> {
    Ok(integer(value, "int32", path)? as i32)
}

pub(crate) fn to_u32<V: ScriptValue>(value: &V, path: &FieldPath<'_>) -> Result<u32, EncodeError> {
    Ok(integer(value, "uint32", path)? as u32)
}

pub(crate) fn to_f32<V: ScriptValue>(value: &V, path: &FieldPath<'_>) -> Result<f32, EncodeError> {
    Ok(number(value, "float", path)? as f32)
}

pub(crate) fn to_str<'v, V: ScriptValue>(
    value: &'v V,
    path: &FieldPath<'_>,
) -> Result<Cow<'v, str>, EncodeError> {
    match value.kind() {
        ValueKind::String => value
            .as_str()
            .map(Cow::Borrowed)
            .ok_or_else(|| mismatch(path, "string", value.kind())),
        ValueKind::Integer => value
            .as_integer()
            .map(|i| Cow::Owned(i.to_string()))
            .ok_or_else(|| mismatch(path, "string", value.kind())),
        ValueKind::Number => value
            .as_number()
            .map(|n| Cow::Owned(n.to_string()))
            .ok_or_else(|| mismatch(path, "string", value.kind())),
        other => Err(mismatch(path, "string", other)),
    }
}

pub(crate) fn mismatch(path: &FieldPath<'_>, expected: &str, found: ValueKind) -> EncodeError {
    EncodeError::TypeMismatch {
        field: path.to_string(),
        expected: expected.to_string(),
        found,
    }
}

fn integer<V: ScriptValue>(
    value: &V,
    expected: &str,
    path: &FieldPath<'_>,
) -> Result<i64, EncodeError> {
    let number = match value.kind() {
        ValueKind::Integer => {
            return value
                .as_integer()
                .ok_or_else(|| mismatch(path, expected, ValueKind::Integer));
        }
        ValueKind::Number => value.as_number(),
        ValueKind::String => {
            let s = value.as_str().unwrap_or_default().trim();
            if let Ok(i) = s.parse::<i64>() {
                return Ok(i);
            }
            s.parse::<f64>().ok()
        }
        _ => None,
    };
    // Truncates toward zero; NaN becomes 0 and infinities saturate.
    number
        .map(|n| n as i64)
        .ok_or_else(|| mismatch(path, expected, value.kind()))
}

fn number<V: ScriptValue>(
    value: &V,
    expected: &str,
    path: &FieldPath<'_>,
) -> Result<f64, EncodeError> {
    let n = match value.kind() {
        ValueKind::Integer => value.as_integer().map(|i| i as f64),
        ValueKind::Number => value.as_number(),
        ValueKind::String => value.as_str().and_then(|s| s.trim().parse::<f64>().ok()),
        _ => None,
    };
    n.ok_or_else(|| mismatch(path, expected, value.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DynamicValue;

    const PATH: FieldPath<'static> = FieldPath::root("f");

    #[test]
    fn test_int32_accepts_integral_numbers() {
        assert_eq!(to_i32(&DynamicValue::Integer(-1), &PATH), Ok(-1));
        assert_eq!(to_i32(&DynamicValue::Number(7.0), &PATH), Ok(7));
        assert_eq!(to_i32(&DynamicValue::from(" 12 "), &PATH), Ok(12));
    }

    #[test]
    fn test_int32_truncates_and_wraps() {
        assert_eq!(to_i32(&DynamicValue::Number(1.5), &PATH), Ok(1));
        assert_eq!(to_i32(&DynamicValue::Number(-2.9), &PATH), Ok(-2));
        assert_eq!(to_i32(&DynamicValue::from("3.75"), &PATH), Ok(3));
        assert_eq!(
            to_i32(&DynamicValue::Integer(i64::from(i32::MAX) + 1), &PATH),
            Ok(i32::MIN)
        );
    }

    #[test]
    fn test_uint32_full_range() {
        assert_eq!(
            to_u32(&DynamicValue::Integer(4_294_967_295), &PATH),
            Ok(u32::MAX)
        );
        assert_eq!(to_u32(&DynamicValue::Integer(-1), &PATH), Ok(0xFFFF_FFFF));
        assert_eq!(to_u32(&DynamicValue::Integer(1 << 32), &PATH), Ok(0));
    }

    #[test]
    fn test_non_finite_numbers_into_integers() {
        assert_eq!(to_i32(&DynamicValue::Number(f64::NAN), &PATH), Ok(0));
        assert_eq!(to_u32(&DynamicValue::Number(f64::INFINITY), &PATH), Ok(u32::MAX));
    }

    #[test]
    fn test_non_numeric_is_type_mismatch() {
        assert_eq!(
            to_i32(&DynamicValue::Boolean(true), &PATH),
            Err(EncodeError::TypeMismatch {
                field: "f".into(),
                expected: "int32".into(),
                found: ValueKind::Boolean,
            })
        );
        assert!(matches!(
            to_f32(&DynamicValue::from("abc"), &PATH),
            Err(EncodeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_float_widths() {
        assert_eq!(to_f32(&DynamicValue::Integer(2), &PATH), Ok(2.0));
        assert_eq!(to_f32(&DynamicValue::Number(0.5), &PATH), Ok(0.5));
        assert_eq!(to_f32(&DynamicValue::Number(1e300), &PATH), Ok(f32::INFINITY));
        assert_eq!(
            to_f32(&DynamicValue::Number(-1e300), &PATH),
            Ok(f32::NEG_INFINITY)
        );
    }

    #[test]
    fn test_numbers_coerce_to_strings() {
        assert_eq!(to_str(&DynamicValue::Integer(42), &PATH).unwrap(), "42");
        assert_eq!(to_str(&DynamicValue::Number(0.25), &PATH).unwrap(), "0.25");
        assert!(matches!(
            to_str(&DynamicValue::Table(Default::default()), &PATH),
            Err(EncodeError::TypeMismatch { .. })
        ));
    }
}

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// This type holds dynamically decoded command arguments.
///
/// Generated decoders produce strongly typed `...Arguments` records; a
/// [Value] is what those records look like once type erased, which is what a
/// dispatch table hands back when the concrete command is only known at
/// runtime. Object fields keep schema order.
#[derive(Clone, PartialEq)]
pub enum Value {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    Float(f32),
    Double(f64),
    String(String),
    Object(String, Vec<(String, Value)>),
}

impl Value {
    /// A convenience method to widen any unsigned integer value to `u64`.
    /// Returns `0` for other value kinds.
    pub fn as_u64(&self) -> u64 {
        match *self {
            Value::U8(value) => value as u64,
            Value::U16(value) => value as u64,
            Value::U32(value) => value as u64,
            Value::U64(value) => value,
            _ => 0,
        }
    }

    /// A convenience method to widen any signed integer value to `i64`.
    /// Returns `0` for other value kinds.
    pub fn as_i64(&self) -> i64 {
        match *self {
            Value::I8(value) => value as i64,
            Value::I16(value) => value as i64,
            Value::I32(value) => value as i64,
            Value::I64(value) => value,
            _ => 0,
        }
    }

    /// A convenience method to extract a [Float](#variant.Float) or
    /// [Double](#variant.Double) as `f64`. Returns `0.0` for other value kinds.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Float(value) => value as f64,
            Value::Double(value) => value,
            _ => 0.0,
        }
    }

    /// A convenience method to extract the value out of a [String](#variant.String).
    /// Returns `""` for other value kinds.
    pub fn as_string(&self) -> &str {
        match *self {
            Value::String(ref value) => value.as_str(),
            _ => "",
        }
    }

    /// The number of fields of an [Object](#variant.Object), `0` otherwise.
    pub fn len(&self) -> usize {
        match *self {
            Value::Object(_, ref fields) => fields.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A convenience method to extract a field out of an [Object](#variant.Object).
    /// Returns `None` for other value kinds or if the field isn't present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match *self {
            Value::Object(_, ref fields) => {
                fields.iter().find(|(key, _)| key == name).map(|(_, value)| value)
            }
            _ => None,
        }
    }

    /// A convenience method to append or replace a field on an
    /// [Object](#variant.Object). Does nothing for other value kinds.
    pub fn set(&mut self, name: &str, value: Value) {
        if let Value::Object(_, ref mut fields) = *self {
            match fields.iter_mut().find(|(key, _)| key == name) {
                Some(slot) => slot.1 = value,
                None => fields.push((name.to_owned(), value)),
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match *self {
            Value::U8(value) => fmt::Debug::fmt(&value, f),
            Value::I8(value) => fmt::Debug::fmt(&value, f),
            Value::U16(value) => fmt::Debug::fmt(&value, f),
            Value::I16(value) => fmt::Debug::fmt(&value, f),
            Value::U32(value) => fmt::Debug::fmt(&value, f),
            Value::I32(value) => fmt::Debug::fmt(&value, f),
            Value::U64(value) => fmt::Debug::fmt(&value, f),
            Value::I64(value) => fmt::Debug::fmt(&value, f),
            Value::Float(value) => fmt::Debug::fmt(&value, f),
            Value::Double(value) => fmt::Debug::fmt(&value, f),
            Value::String(ref value) => fmt::Debug::fmt(value, f),

            Value::Object(ref name, ref fields) => {
                let mut first = true;
                write!(f, "{} {{", name)?;

                for (key, value) in fields {
                    if first {
                        first = false;
                    } else {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {:?}", key, value)?;
                }

                write!(f, "}}")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Value::U8(value) => serializer.serialize_u8(value),
            Value::I8(value) => serializer.serialize_i8(value),
            Value::U16(value) => serializer.serialize_u16(value),
            Value::I16(value) => serializer.serialize_i16(value),
            Value::U32(value) => serializer.serialize_u32(value),
            Value::I32(value) => serializer.serialize_i32(value),
            Value::U64(value) => serializer.serialize_u64(value),
            Value::I64(value) => serializer.serialize_i64(value),
            Value::Float(value) => serializer.serialize_f32(value),
            Value::Double(value) => serializer.serialize_f64(value),
            Value::String(ref value) => serializer.serialize_str(value),
            Value::Object(_, ref fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcmd() -> Value {
        Value::Object(
            "Ardrone3PilotingPCMD".to_owned(),
            vec![
                ("flag".to_owned(), Value::U8(1)),
                ("roll".to_owned(), Value::I8(-10)),
                ("timestamp_and_seq_num".to_owned(), Value::U32(7)),
            ],
        )
    }

    #[test]
    fn value_basic() {
        let value = pcmd();
        assert_eq!(value.len(), 3);
        assert_eq!(value.get("flag"), Some(&Value::U8(1)));
        assert_eq!(value.get("roll").map(Value::as_i64), Some(-10));
        assert_eq!(value.get("timestamp_and_seq_num").map(Value::as_u64), Some(7));
        assert_eq!(value.get("missing"), None);
        assert_eq!(Value::U8(3).get("flag"), None);
        assert_eq!(Value::Double(0.25).as_f64(), 0.25);
        assert_eq!(Value::String("abc".to_owned()).as_string(), "abc");
        assert_eq!(Value::U8(3).as_string(), "");
    }

    #[test]
    fn value_set() {
        let mut value = Value::Object("Foo".to_owned(), vec![]);
        assert!(value.is_empty());

        value.set("x", Value::I32(123));
        value.set("y", Value::I32(456));
        value.set("x", Value::I32(789));
        assert_eq!(value.get("x"), Some(&Value::I32(789)));
        assert_eq!(value.get("y"), Some(&Value::I32(456)));
        assert_eq!(value.len(), 2);
    }

    #[test]
    fn value_debug_keeps_field_order() {
        assert_eq!(
            format!("{:?}", pcmd()),
            "Ardrone3PilotingPCMD {flag: 1, roll: -10, timestamp_and_seq_num: 7}"
        );
        assert_eq!(format!("{:?}", Value::String("AB".to_owned())), "\"AB\"");
    }

    #[test]
    fn value_serializes_as_json_object() {
        let json = serde_json::to_string(&pcmd()).unwrap();
        assert_eq!(json, r#"{"flag":1,"roll":-10,"timestamp_and_seq_num":7}"#);
    }
}

use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use serde_json::{Map, Number, Value};
use std::io;

/// Push-style JSON output used by the GeoJSON encoder.
///
/// Calls arrive in document order; the sink is responsible for separators and
/// nesting. Any failure is returned unchanged to the encoder's caller.
pub trait JsonSink {
    fn write_object_start(&mut self) -> io::Result<()>;

    fn write_object_end(&mut self) -> io::Result<()>;

    /// Start an object member; the next value written belongs to it
    fn write_field_name(&mut self, name: &str) -> io::Result<()>;

    fn write_string_field(&mut self, name: &str, value: &str) -> io::Result<()>;

    fn write_array_start(&mut self) -> io::Result<()>;

    fn write_array_end(&mut self) -> io::Result<()>;

    /// Write a complete array of numbers, e.g. one coordinate tuple
    fn write_number_array(&mut self, values: &[f64]) -> io::Result<()>;
}

fn misuse(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg.to_string())
}

#[derive(Debug)]
enum Scope {
    Object { first: bool, awaiting_value: bool },
    Array { first: bool },
}

/// Streams JSON text to a writer through a `serde_json` formatter.
///
/// Examples
/// ```rust
/// use geoser::serialization::{JsonSink, JsonWriterSink};
///
/// let mut sink = JsonWriterSink::compact(Vec::new());
/// sink.write_object_start().unwrap();
/// sink.write_field_name("coordinates").unwrap();
/// sink.write_number_array(&[1.0, 2.5]).unwrap();
/// sink.write_object_end().unwrap();
/// assert_eq!(sink.into_inner(), br#"{"coordinates":[1.0,2.5]}"#);
/// ```
pub struct JsonWriterSink<W, F = CompactFormatter> {
    writer: W,
    formatter: F,
    scopes: Vec<Scope>,
}

impl<W: io::Write> JsonWriterSink<W> {
    pub fn compact(writer: W) -> Self {
        Self::with_formatter(writer, CompactFormatter)
    }
}

impl<'a, W: io::Write> JsonWriterSink<W, PrettyFormatter<'a>> {
    /// Two-space indented output
    pub fn pretty(writer: W) -> Self {
        Self::with_formatter(writer, PrettyFormatter::new())
    }
}

impl<W: io::Write, F: Formatter> JsonWriterSink<W, F> {
    pub fn with_formatter(writer: W, formatter: F) -> Self {
        Self {
            writer,
            formatter,
            scopes: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn begin_value(&mut self) -> io::Result<()> {
        match self.scopes.last_mut() {
            None => Ok(()),
            Some(Scope::Array { first }) => {
                let was_first = *first;
                *first = false;
                self.formatter.begin_array_value(&mut self.writer, was_first)
            }
            Some(Scope::Object { awaiting_value, .. }) => {
                if *awaiting_value {
                    Ok(())
                } else {
                    Err(misuse("Object value written without a field name"))
                }
            }
        }
    }

    fn end_value(&mut self) -> io::Result<()> {
        match self.scopes.last_mut() {
            None => Ok(()),
            Some(Scope::Array { .. }) => self.formatter.end_array_value(&mut self.writer),
            Some(Scope::Object { awaiting_value, .. }) => {
                *awaiting_value = false;
                self.formatter.end_object_value(&mut self.writer)
            }
        }
    }

    fn write_str(&mut self, value: &str) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, value).map_err(io::Error::from)
    }

    fn write_number(&mut self, value: f64) -> io::Result<()> {
        // Same as serde_json: no JSON representation for NaN and infinities
        if value.is_finite() {
            self.formatter.write_f64(&mut self.writer, value)
        } else {
            self.formatter.write_null(&mut self.writer)
        }
    }
}

impl<W: io::Write, F: Formatter> JsonSink for JsonWriterSink<W, F> {
    fn write_object_start(&mut self) -> io::Result<()> {
        self.begin_value()?;
        self.formatter.begin_object(&mut self.writer)?;
        self.scopes.push(Scope::Object {
            first: true,
            awaiting_value: false,
        });
        Ok(())
    }

    fn write_object_end(&mut self) -> io::Result<()> {
        if !matches!(
            self.scopes.last(),
            Some(Scope::Object {
                awaiting_value: false,
                ..
            })
        ) {
            return Err(misuse("Object end does not match an open object"));
        }
        self.scopes.pop();
        self.formatter.end_object(&mut self.writer)?;
        self.end_value()
    }

    fn write_field_name(&mut self, name: &str) -> io::Result<()> {
        let first = match self.scopes.last_mut() {
            Some(Scope::Object {
                first,
                awaiting_value,
            }) if !*awaiting_value => {
                let was_first = *first;
                *first = false;
                *awaiting_value = true;
                was_first
            }
            _ => return Err(misuse("Field name written outside of an object")),
        };
        self.formatter.begin_object_key(&mut self.writer, first)?;
        self.write_str(name)?;
        self.formatter.end_object_key(&mut self.writer)?;
        self.formatter.begin_object_value(&mut self.writer)
    }

    fn write_string_field(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.write_field_name(name)?;
        self.begin_value()?;
        self.write_str(value)?;
        self.end_value()
    }

    fn write_array_start(&mut self) -> io::Result<()> {
        self.begin_value()?;
        self.formatter.begin_array(&mut self.writer)?;
        self.scopes.push(Scope::Array { first: true });
        Ok(())
    }

    fn write_array_end(&mut self) -> io::Result<()> {
        if !matches!(self.scopes.last(), Some(Scope::Array { .. })) {
            return Err(misuse("Array end does not match an open array"));
        }
        self.scopes.pop();
        self.formatter.end_array(&mut self.writer)?;
        self.end_value()
    }

    fn write_number_array(&mut self, values: &[f64]) -> io::Result<()> {
        self.begin_value()?;
        self.formatter.begin_array(&mut self.writer)?;
        for (i, value) in values.iter().enumerate() {
            self.formatter.begin_array_value(&mut self.writer, i == 0)?;
            self.write_number(*value)?;
            self.formatter.end_array_value(&mut self.writer)?;
        }
        self.formatter.end_array(&mut self.writer)?;
        self.end_value()
    }
}

#[derive(Debug)]
enum Frame {
    Object(Map<String, Value>, Option<String>),
    Array(Vec<Value>),
}

/// Builds an in-memory `serde_json::Value` tree from sink calls
#[derive(Debug, Default)]
pub struct ValueSink {
    stack: Vec<Frame>,
    root: Option<Value>,
}

impl ValueSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The completed document; `None` until the root value has been closed
    pub fn into_value(self) -> Option<Value> {
        self.root
    }

    fn push_value(&mut self, value: Value) -> io::Result<()> {
        match self.stack.last_mut() {
            None if self.root.is_none() => {
                self.root = Some(value);
                Ok(())
            }
            None => Err(misuse("Document already has a root value")),
            Some(Frame::Array(items)) => {
                items.push(value);
                Ok(())
            }
            Some(Frame::Object(map, key)) => match key.take() {
                Some(k) => {
                    map.insert(k, value);
                    Ok(())
                }
                None => Err(misuse("Object value written without a field name")),
            },
        }
    }
}

impl JsonSink for ValueSink {
    fn write_object_start(&mut self) -> io::Result<()> {
        self.stack.push(Frame::Object(Map::new(), None));
        Ok(())
    }

    fn write_object_end(&mut self) -> io::Result<()> {
        if !matches!(self.stack.last(), Some(Frame::Object(_, None))) {
            return Err(misuse("Object end does not match an open object"));
        }
        match self.stack.pop() {
            Some(Frame::Object(map, _)) => self.push_value(Value::Object(map)),
            _ => Err(misuse("Object end does not match an open object")),
        }
    }

    fn write_field_name(&mut self, name: &str) -> io::Result<()> {
        match self.stack.last_mut() {
            Some(Frame::Object(_, key @ None)) => {
                *key = Some(name.to_string());
                Ok(())
            }
            _ => Err(misuse("Field name written outside of an object")),
        }
    }

    fn write_string_field(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.write_field_name(name)?;
        self.push_value(Value::String(value.to_string()))
    }

    fn write_array_start(&mut self) -> io::Result<()> {
        self.stack.push(Frame::Array(Vec::new()));
        Ok(())
    }

    fn write_array_end(&mut self) -> io::Result<()> {
        if !matches!(self.stack.last(), Some(Frame::Array(_))) {
            return Err(misuse("Array end does not match an open array"));
        }
        match self.stack.pop() {
            Some(Frame::Array(items)) => self.push_value(Value::Array(items)),
            _ => Err(misuse("Array end does not match an open array")),
        }
    }

    fn write_number_array(&mut self, values: &[f64]) -> io::Result<()> {
        let items = values
            .iter()
            .map(|v| Number::from_f64(*v).map_or(Value::Null, Value::Number))
            .collect();
        self.push_value(Value::Array(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn write_sample<S: JsonSink>(sink: &mut S) -> io::Result<()> {
        sink.write_object_start()?;
        sink.write_string_field("name", "quote \" and \\ slash")?;
        sink.write_field_name("rings")?;
        sink.write_array_start()?;
        sink.write_number_array(&[0.0, -1.5])?;
        sink.write_number_array(&[])?;
        sink.write_array_end()?;
        sink.write_field_name("nested")?;
        sink.write_object_start()?;
        sink.write_string_field("k", "v")?;
        sink.write_object_end()?;
        sink.write_object_end()
    }

    #[test]
    fn test_compact_writer() {
        let mut sink = JsonWriterSink::compact(Vec::new());
        write_sample(&mut sink).unwrap();
        let txt = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            txt,
            r#"{"name":"quote \" and \\ slash","rings":[[0.0,-1.5],[]],"nested":{"k":"v"}}"#
        );
    }

    #[test]
    fn test_pretty_writer() {
        let mut sink = JsonWriterSink::pretty(Vec::new());
        sink.write_object_start().unwrap();
        sink.write_string_field("type", "Point").unwrap();
        sink.write_field_name("coordinates").unwrap();
        sink.write_number_array(&[10.0, 20.0]).unwrap();
        sink.write_object_end().unwrap();
        let txt = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            txt,
            "{\n  \"type\": \"Point\",\n  \"coordinates\": [\n    10.0,\n    20.0\n  ]\n}"
        );
    }

    #[test]
    fn test_writer_non_finite_as_null() {
        let mut sink = JsonWriterSink::compact(Vec::new());
        sink.write_number_array(&[f64::NAN, 1.0, f64::INFINITY]).unwrap();
        assert_eq!(sink.into_inner(), b"[null,1.0,null]");
    }

    #[test]
    fn test_writer_misuse() {
        let mut sink = JsonWriterSink::compact(Vec::new());
        let err = sink.write_field_name("type").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let mut sink = JsonWriterSink::compact(Vec::new());
        sink.write_object_start().unwrap();
        if let Ok(_) = sink.write_number_array(&[1.0]) {
            panic!("Wrote an object value without a field name");
        }
        if let Ok(_) = sink.write_array_end() {
            panic!("Closed an array that was never opened");
        }

        let mut sink = JsonWriterSink::compact(Vec::new());
        sink.write_object_start().unwrap();
        sink.write_field_name("dangling").unwrap();
        if let Ok(_) = sink.write_object_end() {
            panic!("Closed an object with a pending field");
        }
    }

    #[test]
    fn test_value_sink() {
        let mut sink = ValueSink::new();
        write_sample(&mut sink).unwrap();
        assert_eq!(
            sink.into_value(),
            Some(json!({
                "name": "quote \" and \\ slash",
                "rings": [[0.0, -1.5], []],
                "nested": {"k": "v"}
            }))
        );
    }

    #[test]
    fn test_writer_recovers_after_rejected_end() {
        let mut sink = JsonWriterSink::compact(Vec::new());
        sink.write_object_start().unwrap();
        sink.write_field_name("dangling").unwrap();
        assert!(sink.write_object_end().is_err());
        assert!(sink.write_array_end().is_err());

        // The object is still open and still waiting for the member value
        sink.write_number_array(&[1.0]).unwrap();
        sink.write_object_end().unwrap();
        assert_eq!(sink.into_inner(), br#"{"dangling":[1.0]}"#);
    }

    #[test]
    fn test_value_sink_recovers_after_rejected_end() {
        let mut sink = ValueSink::new();
        sink.write_object_start().unwrap();
        sink.write_field_name("dangling").unwrap();
        assert!(sink.write_object_end().is_err());
        assert!(sink.write_array_end().is_err());

        sink.write_number_array(&[1.0]).unwrap();
        sink.write_object_end().unwrap();
        assert_eq!(sink.into_value(), Some(json!({"dangling": [1.0]})));
    }

    #[test]
    fn test_value_sink_keeps_member_order() {
        let mut sink = ValueSink::new();
        sink.write_object_start().unwrap();
        sink.write_string_field("type", "Point").unwrap();
        sink.write_field_name("crs").unwrap();
        sink.write_object_start().unwrap();
        sink.write_string_field("type", "name").unwrap();
        sink.write_object_end().unwrap();
        sink.write_field_name("coordinates").unwrap();
        sink.write_number_array(&[10.0, 20.0]).unwrap();
        sink.write_object_end().unwrap();

        let txt = serde_json::to_string(&sink.into_value().unwrap()).unwrap();
        assert_eq!(
            txt,
            r#"{"type":"Point","crs":{"type":"name"},"coordinates":[10.0,20.0]}"#
        );
    }

    #[test]
    fn test_value_sink_misuse() {
        let mut sink = ValueSink::new();
        sink.write_array_start().unwrap();
        if let Ok(_) = sink.write_field_name("x") {
            panic!("Wrote a field name inside an array");
        }

        let mut sink = ValueSink::new();
        sink.write_number_array(&[1.0]).unwrap();
        if let Ok(_) = sink.write_number_array(&[2.0]) {
            panic!("Wrote a second root value");
        }
    }
}

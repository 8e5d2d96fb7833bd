//! Total deep serialization over a small tagged shape set.
//!
//! Values describe themselves through [`Introspect::shape`]; [`serialize_deep`]
//! walks the shapes and always produces JSON. Leaves that are not JSON-safe are
//! rendered through `Display`, and a rendering that fails degrades to `{}`.

use cdi_protocol::ProcessingResult;
use serde_json::{Map, Number, Value};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

const MAX_DEPTH: usize = 256;

pub type Fields<'a> = Vec<(Cow<'a, str>, &'a dyn Introspect)>;

pub enum Primitive<'a> {
    Null,
    Bool(bool),
    Number(Number),
    Float(f64),
    Text(Cow<'a, str>),
}

/// A value that is neither a plain mapping nor a primitive.
///
/// When it exposes fields they become a mapping; otherwise it is rendered.
pub struct Opaque<'a> {
    fields: Fields<'a>,
    render: Option<&'a dyn fmt::Display>,
}

impl<'a> Opaque<'a> {
    pub fn with_fields(fields: Fields<'a>) -> Self {
        Self {
            fields,
            render: None,
        }
    }

    pub fn rendered(value: &'a dyn fmt::Display) -> Self {
        Self {
            fields: Vec::new(),
            render: Some(value),
        }
    }
}

pub enum Shape<'a> {
    Mapping(Fields<'a>),
    Sequence(Vec<&'a dyn Introspect>),
    Primitive(Primitive<'a>),
    Opaque(Opaque<'a>),
}

pub trait Introspect {
    fn shape(&self) -> Shape<'_>;
}

/// Render any introspectable value as JSON. Never fails.
pub fn serialize_deep<T: Introspect + ?Sized>(value: &T) -> Value {
    visit(value.shape(), 0)
}

fn visit(shape: Shape<'_>, depth: usize) -> Value {
    if depth >= MAX_DEPTH {
        return Value::Object(Map::new());
    }
    match shape {
        Shape::Mapping(fields) => visit_fields(fields, depth),
        Shape::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(|item| visit(item.shape(), depth + 1))
                .collect(),
        ),
        Shape::Primitive(primitive) => visit_primitive(primitive),
        Shape::Opaque(opaque) => visit_opaque(opaque, depth),
    }
}

fn visit_fields(fields: Fields<'_>, depth: usize) -> Value {
    let mut map = Map::new();
    for (key, value) in fields {
        map.insert(key.into_owned(), visit(value.shape(), depth + 1));
    }
    Value::Object(map)
}

fn visit_primitive(primitive: Primitive<'_>) -> Value {
    match primitive {
        Primitive::Null => Value::Null,
        Primitive::Bool(flag) => Value::Bool(flag),
        Primitive::Number(n) => Value::Number(n),
        Primitive::Float(f) => match Number::from_f64(f) {
            Some(n) => Value::Number(n),
            None => Value::String(f.to_string()),
        },
        Primitive::Text(text) => Value::String(text.into_owned()),
    }
}

fn visit_opaque(opaque: Opaque<'_>, depth: usize) -> Value {
    if !opaque.fields.is_empty() {
        return visit_fields(opaque.fields, depth);
    }
    let Some(render) = opaque.render else {
        return Value::Object(Map::new());
    };
    let mut out = String::new();
    match write!(out, "{render}") {
        Ok(()) => Value::String(out),
        Err(fmt::Error) => Value::Object(Map::new()),
    }
}

/// Wrapper that serializes any `Display` value as an opaque rendered leaf.
pub struct Rendered<T>(pub T);

impl<T: fmt::Display> Introspect for Rendered<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Opaque(Opaque::rendered(&self.0))
    }
}

impl Introspect for Value {
    fn shape(&self) -> Shape<'_> {
        match self {
            Value::Null => Shape::Primitive(Primitive::Null),
            Value::Bool(flag) => Shape::Primitive(Primitive::Bool(*flag)),
            Value::Number(n) => Shape::Primitive(Primitive::Number(n.clone())),
            Value::String(s) => Shape::Primitive(Primitive::Text(Cow::Borrowed(s))),
            Value::Array(items) => {
                Shape::Sequence(items.iter().map(|v| v as &dyn Introspect).collect())
            }
            Value::Object(map) => Shape::Mapping(
                map.iter()
                    .map(|(k, v)| (Cow::Borrowed(k.as_str()), v as &dyn Introspect))
                    .collect(),
            ),
        }
    }
}

impl Introspect for str {
    fn shape(&self) -> Shape<'_> {
        Shape::Primitive(Primitive::Text(Cow::Borrowed(self)))
    }
}

impl Introspect for String {
    fn shape(&self) -> Shape<'_> {
        Shape::Primitive(Primitive::Text(Cow::Borrowed(self)))
    }
}

impl Introspect for bool {
    fn shape(&self) -> Shape<'_> {
        Shape::Primitive(Primitive::Bool(*self))
    }
}

macro_rules! integer_shape {
    ($($ty:ty),*) => {
        $(
            impl Introspect for $ty {
                fn shape(&self) -> Shape<'_> {
                    Shape::Primitive(Primitive::Number(Number::from(*self)))
                }
            }
        )*
    };
}

integer_shape!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl Introspect for f64 {
    fn shape(&self) -> Shape<'_> {
        Shape::Primitive(Primitive::Float(*self))
    }
}

impl Introspect for f32 {
    fn shape(&self) -> Shape<'_> {
        Shape::Primitive(Primitive::Float(f64::from(*self)))
    }
}

impl Introspect for Path {
    fn shape(&self) -> Shape<'_> {
        Shape::Primitive(Primitive::Text(self.to_string_lossy()))
    }
}

impl Introspect for PathBuf {
    fn shape(&self) -> Shape<'_> {
        self.as_path().shape()
    }
}

impl<T: Introspect> Introspect for Option<T> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Some(value) => value.shape(),
            None => Shape::Primitive(Primitive::Null),
        }
    }
}

impl<T: Introspect> Introspect for [T] {
    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(self.iter().map(|v| v as &dyn Introspect).collect())
    }
}

impl<T: Introspect> Introspect for Vec<T> {
    fn shape(&self) -> Shape<'_> {
        self.as_slice().shape()
    }
}

impl<T: Introspect + ?Sized> Introspect for &T {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Introspect + ?Sized> Introspect for Box<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Introspect + ?Sized> Introspect for Rc<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Introspect + ?Sized> Introspect for Arc<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<K: AsRef<str>, V: Introspect> Introspect for BTreeMap<K, V> {
    fn shape(&self) -> Shape<'_> {
        Shape::Mapping(
            self.iter()
                .map(|(k, v)| (Cow::Borrowed(k.as_ref()), v as &dyn Introspect))
                .collect(),
        )
    }
}

impl<K: AsRef<str>, V: Introspect, S> Introspect for HashMap<K, V, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Mapping(
            self.iter()
                .map(|(k, v)| (Cow::Borrowed(k.as_ref()), v as &dyn Introspect))
                .collect(),
        )
    }
}

fn present<T: Introspect>(value: &Option<T>) -> Option<&dyn Introspect> {
    value.as_ref().map(|v| v as &dyn Introspect)
}

impl Introspect for ProcessingResult {
    fn shape(&self) -> Shape<'_> {
        let named = [
            ("file_name", present(&self.file_name)),
            ("extraction_data", present(&self.extraction_data)),
            ("payer_results", present(&self.payer_results)),
            ("payer_summary", present(&self.payer_summary)),
            ("total_cost", present(&self.total_cost)),
            ("execution_times", present(&self.execution_times)),
            ("usage", present(&self.usage)),
            ("sources", present(&self.sources)),
            ("numbered_medical_chart", present(&self.numbered_medical_chart)),
            ("multi_chart_info", present(&self.multi_chart_info)),
            ("error", present(&self.error)),
        ];
        let mut fields: Fields<'_> = named
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (Cow::Borrowed(name), v)))
            .collect();
        fields.extend(
            self.extra
                .iter()
                .map(|(k, v)| (Cow::Borrowed(k.as_str()), v as &dyn Introspect)),
        );
        Shape::Opaque(Opaque::with_fields(fields))
    }
}

//! Error Codec
//!
//! Bidirectional conversion between a thrown-error object graph and a
//! transmissible, cycle-free JSON structure.
//!
//! Thrown errors are modeled as a [`ThrownError`]: the four identifying
//! fields (name, message, stack, code) plus an arbitrary property graph.
//! Property objects are reference-counted with interior mutability so the
//! graph may legitimately contain cycles, as thrown errors in dynamic
//! runtimes often do (e.g. a request object that links back to its owner).
//!
//! Encoding walks the graph depth-first and tracks the identities of the
//! objects on the current path; revisiting one substitutes the literal
//! marker `"[Circular]"` instead of recursing. Identity means pointer
//! equality, never structural equality — two distinct but equal-valued
//! objects are both encoded in full.
//!
//! Decoding is deliberately lossy on cycles: markers stay literal strings
//! and true cyclic identity is not reconstructed, matching the safety
//! tradeoff made on the encode side.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

/// Marker substituted for an object already visited on the current path
pub const CIRCULAR_MARKER: &str = "[Circular]";

/// A shared, mutable property object; the graph node type that permits cycles
pub type GraphObject = Rc<RefCell<BTreeMap<String, GraphValue>>>;

/// A value in a thrown-error property graph
#[derive(Clone, Debug)]
pub enum GraphValue {
    /// Absent / null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// String value
    String(String),
    /// Array of values (may contain objects, which may cycle)
    Array(Vec<GraphValue>),
    /// Shared object node
    Object(GraphObject),
}

impl GraphValue {
    /// Create an empty shared object node
    #[must_use]
    pub fn empty_object() -> GraphObject {
        Rc::new(RefCell::new(BTreeMap::new()))
    }
}

/// An error as thrown by delegated work, with its full property graph
#[derive(Clone, Debug, Default)]
pub struct ThrownError {
    /// Error class name (e.g. "TypeError")
    pub name: Option<String>,
    /// Human-readable message
    pub message: Option<String>,
    /// Stack trace captured at the throw site
    pub stack: Option<String>,
    /// Machine-readable error code (e.g. "ECONNREFUSED")
    pub code: Option<String>,
    /// Every other own property of the error
    pub properties: GraphObject,
}

impl ThrownError {
    /// Create an error with a name and message
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            message: Some(message.into()),
            stack: None,
            code: None,
            properties: GraphValue::empty_object(),
        }
    }

    /// Attach a stack trace
    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Attach an error code
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach an additional property
    #[must_use]
    pub fn with_property(self, key: impl Into<String>, value: GraphValue) -> Self {
        self.properties.borrow_mut().insert(key.into(), value);
        self
    }
}

/// Encode a thrown error into a cycle-free JSON structure
///
/// The property graph is walked depth-first; objects already visited on the
/// current path are replaced with [`CIRCULAR_MARKER`]. Afterwards the four
/// identifying fields are (re)attached from the error itself when present,
/// overriding any like-named properties.
#[must_use]
pub fn encode(error: &ThrownError) -> Value {
    let mut visited: Vec<*const RefCell<BTreeMap<String, GraphValue>>> = Vec::new();
    let mut encoded = match encode_object(&error.properties, &mut visited) {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    for (key, field) in [
        ("name", &error.name),
        ("message", &error.message),
        ("stack", &error.stack),
        ("code", &error.code),
    ] {
        if let Some(text) = field {
            encoded.insert(key.to_string(), Value::String(text.clone()));
        }
    }

    Value::Object(encoded)
}

fn encode_object(
    object: &GraphObject,
    visited: &mut Vec<*const RefCell<BTreeMap<String, GraphValue>>>,
) -> Value {
    let identity = Rc::as_ptr(object);
    if visited.contains(&identity) {
        return Value::String(CIRCULAR_MARKER.to_string());
    }

    visited.push(identity);
    let mut map = Map::new();
    for (key, value) in object.borrow().iter() {
        map.insert(key.clone(), encode_value(value, visited));
    }
    visited.pop();

    Value::Object(map)
}

fn encode_value(
    value: &GraphValue,
    visited: &mut Vec<*const RefCell<BTreeMap<String, GraphValue>>>,
) -> Value {
    match value {
        GraphValue::Null => Value::Null,
        GraphValue::Bool(b) => Value::Bool(*b),
        GraphValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        GraphValue::String(s) => Value::String(s.clone()),
        GraphValue::Array(items) => {
            Value::Array(items.iter().map(|v| encode_value(v, visited)).collect())
        }
        GraphValue::Object(object) => encode_object(object, visited),
    }
}

/// An error reconstructed from an encoded structure received off the wire
///
/// The identifying fields live as struct fields; everything else the remote
/// error carried is preserved in [`RemoteError::properties`]. Circular
/// markers remain literal strings.
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteError {
    /// Error class name; defaults to "Error" when the wire omitted it
    pub name: String,
    /// Human-readable message
    pub message: String,
    /// Remote stack trace, if one was captured
    pub stack: Option<String>,
    /// Machine-readable error code, if one was set
    pub code: Option<String>,
    /// Remaining own properties of the remote error
    pub properties: Map<String, Value>,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl std::error::Error for RemoteError {}

/// Decode an encoded error structure into a [`RemoteError`]
///
/// Objects overlay their name/message/stack/code fields (when string-valued)
/// onto the result and keep all other properties. A bare string becomes the
/// message; any other value is stringified into the message.
#[must_use]
pub fn decode(encoded: &Value) -> RemoteError {
    match encoded {
        Value::Object(map) => {
            let mut error = RemoteError {
                name: "Error".to_string(),
                message: String::new(),
                stack: None,
                code: None,
                properties: Map::new(),
            };

            for (key, value) in map {
                match (key.as_str(), value) {
                    ("name", Value::String(s)) => error.name = s.clone(),
                    ("message", Value::String(s)) => error.message = s.clone(),
                    ("stack", Value::String(s)) => error.stack = Some(s.clone()),
                    ("code", Value::String(s)) => error.code = Some(s.clone()),
                    _ => {
                        error.properties.insert(key.clone(), value.clone());
                    }
                }
            }

            error
        }
        Value::String(message) => RemoteError {
            name: "Error".to_string(),
            message: message.clone(),
            stack: None,
            code: None,
            properties: Map::new(),
        },
        other => RemoteError {
            name: "Error".to_string(),
            message: other.to_string(),
            stack: None,
            code: None,
            properties: Map::new(),
        },
    }
}

use std::fmt;
use std::rc::Rc;

/// A property key. Numeric-looking string keys canonicalize to `Index` so
/// that `o[0]` and `o["0"]` address the same slot and array elements keep
/// integer keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    String(Rc<str>),
    Index(u32),
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(s) => write!(f, "{s}"),
            PropertyKey::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        if let Ok(i) = s.parse::<u32>()
            && i.to_string() == s
        {
            return PropertyKey::Index(i);
        }
        PropertyKey::String(Rc::from(s))
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        PropertyKey::from(s.as_str())
    }
}

impl From<&Rc<str>> for PropertyKey {
    fn from(s: &Rc<str>) -> Self {
        if let Ok(i) = s.parse::<u32>()
            && i.to_string() == **s
        {
            return PropertyKey::Index(i);
        }
        PropertyKey::String(s.clone())
    }
}

impl From<u32> for PropertyKey {
    fn from(i: u32) -> Self {
        PropertyKey::Index(i)
    }
}

impl From<usize> for PropertyKey {
    fn from(i: usize) -> Self {
        match u32::try_from(i) {
            Ok(i) => PropertyKey::Index(i),
            Err(_) => PropertyKey::String(Rc::from(i.to_string().as_str())),
        }
    }
}

impl From<f64> for PropertyKey {
    fn from(n: f64) -> Self {
        if n.fract() == 0.0 && n >= 0.0 && n < u32::MAX as f64 {
            return PropertyKey::Index(n as u32);
        }
        PropertyKey::String(Rc::from(crate::core::number::number_to_string(n).as_str()))
    }
}

impl PropertyKey {
    pub fn as_index(&self) -> Option<u32> {
        match self {
            PropertyKey::Index(i) => Some(*i),
            PropertyKey::String(_) => None,
        }
    }
}

use std::fmt;

/// Scalar query-string value.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl QueryValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn integer(value: i64) -> Self {
        Self::Integer(value)
    }

    pub fn float(value: f64) -> Self {
        Self::Float(value)
    }

    pub fn bool(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use crate::QueryValue;

    #[test]
    fn helper_constructors() {
        assert_eq!(QueryValue::text("abc"), QueryValue::Text("abc".to_owned()));
        assert_eq!(QueryValue::integer(7), QueryValue::Integer(7));
        assert_eq!(QueryValue::float(1.25), QueryValue::Float(1.25));
        assert_eq!(QueryValue::bool(true), QueryValue::Bool(true));
    }

    #[test]
    fn stringifies_like_a_query_string() {
        assert_eq!(QueryValue::from(20).to_string(), "20");
        assert_eq!(QueryValue::from(-10).to_string(), "-10");
        assert_eq!(QueryValue::from(1.5).to_string(), "1.5");
        assert_eq!(QueryValue::from(2.0).to_string(), "2");
        assert_eq!(QueryValue::from(false).to_string(), "false");
        assert_eq!(QueryValue::from("fire").to_string(), "fire");
    }
}

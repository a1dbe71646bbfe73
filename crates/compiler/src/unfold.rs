//! Symbolic evaluation of encoded programs
//!
//! Walks an `exec(…)==exec(…)==…` chain the way Python would, but instead
//! of running arbitrary code it only understands the statement forms the
//! encoder itself produces:
//!
//! ```text
//! NAME=11          NAME=0b101       NAME=''       NAME+=chr(97)
//! ```
//!
//! Everything else is recorded as executed and otherwise ignored. The text
//! executed last is the program the encoded text ultimately runs, which is
//! how `decode` and encoder verification recover the input.
//!
//! The `%` operator is evaluated with Python's rules for the conversions
//! that appear (`%%`, `%x`, `%c`), including the errors Python raises when
//! a template and its argument disagree.

use std::collections::HashMap;
use std::fmt;

/// Error raised while unfolding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnfoldError {
    /// The text is not an `exec` chain this evaluator can read
    Syntax { position: usize, message: String },
    /// A variable was read before being bound (Python's `NameError`)
    Name(String),
    /// Python's `TypeError`
    Type(String),
    /// Python's `ValueError` or `OverflowError`
    Value(String),
}

impl fmt::Display for UnfoldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnfoldError::Syntax { position, message } => {
                write!(f, "Syntax error at position {}: {}", position, message)
            }
            UnfoldError::Name(name) => write!(f, "NameError: name '{}' is not defined", name),
            UnfoldError::Type(msg) => write!(f, "TypeError: {}", msg),
            UnfoldError::Value(msg) => write!(f, "ValueError: {}", msg),
        }
    }
}

impl std::error::Error for UnfoldError {}

/// A runtime value in the restricted language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(String),
    Tuple(Vec<Value>),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::Tuple(_) => "tuple",
        }
    }

    fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    fn py_eq(&self, other: &Value) -> bool {
        match (self.as_int(), other.as_int()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }
}

/// Result of unfolding an encoded program.
#[derive(Debug, Clone, Default)]
pub struct Unfolded {
    /// Every text passed to `exec`, in execution order
    pub executed: Vec<String>,
    /// Variables bound by the recognised statement forms
    pub bindings: HashMap<String, Value>,
}

impl Unfolded {
    /// The text executed last: the original program.
    pub fn payload(&self) -> Option<&str> {
        self.executed.last().map(String::as_str)
    }
}

/// Evaluate an encoded program.
pub fn unfold(text: &str) -> Result<Unfolded, UnfoldError> {
    let mut unfolder = Unfolder::new(text);
    unfolder.chain()?;
    Ok(unfolder.state)
}

struct Unfolder {
    chars: Vec<char>,
    pos: usize,
    state: Unfolded,
}

impl Unfolder {
    fn new(text: &str) -> Self {
        Unfolder {
            chars: text.chars().collect(),
            pos: 0,
            state: Unfolded::default(),
        }
    }

    fn syntax<T>(&self, message: impl Into<String>) -> Result<T, UnfoldError> {
        Err(UnfoldError::Syntax {
            position: self.pos,
            message: message.into(),
        })
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn check(&self, expected: &str) -> bool {
        let mut i = self.pos;
        for c in expected.chars() {
            if self.chars.get(i) != Some(&c) {
                return false;
            }
            i += 1;
        }
        true
    }

    fn consume(&mut self, expected: &str) -> bool {
        if self.check(expected) {
            self.pos += expected.chars().count();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &str) -> Result<(), UnfoldError> {
        if self.consume(expected) {
            Ok(())
        } else {
            self.syntax(format!("expected '{}'", expected))
        }
    }

    /// chain := call ('==' call)*
    fn chain(&mut self) -> Result<(), UnfoldError> {
        if self.chars.is_empty() {
            return self.syntax("empty program");
        }
        loop {
            self.call()?;
            if !self.consume("==") {
                break;
            }
        }
        if self.pos != self.chars.len() {
            return self.syntax("trailing text after last statement");
        }
        Ok(())
    }

    /// call := 'exec(' expr ')'
    fn call(&mut self) -> Result<(), UnfoldError> {
        self.expect("exec(")?;
        let value = self.expr()?;
        self.expect(")")?;
        match value {
            Value::Str(source) => {
                self.execute(source);
                Ok(())
            }
            other => Err(UnfoldError::Type(format!(
                "exec() arg 1 must be a string, bytes or code object, not {}",
                other.type_name()
            ))),
        }
    }

    /// expr := atom ('%' atom)*, evaluated left to right
    fn expr(&mut self) -> Result<Value, UnfoldError> {
        let mut value = self.atom()?;
        while self.consume("%") {
            let arg = self.atom()?;
            value = apply_format(value, arg)?;
        }
        Ok(value)
    }

    fn atom(&mut self) -> Result<Value, UnfoldError> {
        match self.peek() {
            Some('\'') => self.string_literal(),
            Some('(') => self.parenthesized(),
            Some(c) if c.is_ascii_alphabetic() => {
                let name = self.identifier();
                self.state
                    .bindings
                    .get(&name)
                    .cloned()
                    .ok_or(UnfoldError::Name(name))
            }
            Some(c) => self.syntax(format!("unexpected '{}'", c)),
            None => self.syntax("unexpected end of input"),
        }
    }

    fn string_literal(&mut self) -> Result<Value, UnfoldError> {
        let start = self.pos;
        self.expect("'")?;
        let mut text = String::new();
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == '\'' {
                return Ok(Value::Str(text));
            }
            text.push(c);
        }
        Err(UnfoldError::Syntax {
            position: start,
            message: "unterminated string literal".to_string(),
        })
    }

    /// `()` or `(expr)` or `(expr==expr)`
    ///
    /// Comparisons only appear inside parentheses; at the top level `==`
    /// separates statements.
    fn parenthesized(&mut self) -> Result<Value, UnfoldError> {
        self.expect("(")?;
        if self.consume(")") {
            return Ok(Value::Tuple(Vec::new()));
        }
        let left = self.expr()?;
        let value = if self.consume("==") {
            let right = self.expr()?;
            Value::Bool(left.py_eq(&right))
        } else {
            left
        };
        self.expect(")")?;
        Ok(value)
    }

    fn identifier(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Record an executed text and apply it if it is a recognised form.
    fn execute(&mut self, source: String) {
        if let Some((name, value)) = recognise_statement(&source, &self.state.bindings) {
            self.state.bindings.insert(name, value);
        }
        self.state.executed.push(source);
    }
}

/// Interpret the statement forms the encoder emits, returning the binding
/// they make. Anything else, or a form that would fail, is left alone.
fn recognise_statement(source: &str, bindings: &HashMap<String, Value>) -> Option<(String, Value)> {
    if let Some((name, rest)) = source.split_once("+=") {
        if !is_identifier(name) {
            return None;
        }
        let code: u32 = rest.strip_prefix("chr(")?.strip_suffix(')')?.parse().ok()?;
        let c = char::from_u32(code)?;
        return match bindings.get(name) {
            Some(Value::Str(current)) => {
                let mut appended = current.clone();
                appended.push(c);
                Some((name.to_string(), Value::Str(appended)))
            }
            _ => None,
        };
    }

    let (name, literal) = source.split_once('=')?;
    if !is_identifier(name) {
        return None;
    }
    let value = if literal == "''" {
        Value::Str(String::new())
    } else if let Some(bits) = literal.strip_prefix("0b") {
        Value::Int(i64::from_str_radix(bits, 2).ok()?)
    } else if !literal.is_empty() && literal.bytes().all(|b| b.is_ascii_digit()) {
        Value::Int(literal.parse().ok()?)
    } else {
        return None;
    };
    Some((name.to_string(), value))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Python's `str % arg` for the conversions the encoder uses.
fn apply_format(template: Value, arg: Value) -> Result<Value, UnfoldError> {
    let template = match template {
        Value::Str(s) => s,
        other => {
            return Err(UnfoldError::Type(format!(
                "unsupported operand type(s) for %: '{}' and '{}'",
                other.type_name(),
                arg.type_name()
            )));
        }
    };
    let mut args = match arg {
        Value::Tuple(items) => items,
        single => vec![single],
    }
    .into_iter();

    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let conversion = chars
            .next()
            .ok_or_else(|| UnfoldError::Value("incomplete format".to_string()))?;
        if conversion == '%' {
            out.push('%');
            continue;
        }
        let value = args.next().ok_or_else(|| {
            UnfoldError::Type("not enough arguments for format string".to_string())
        })?;
        match conversion {
            'x' => {
                let n = value.as_int().ok_or_else(|| {
                    UnfoldError::Type(format!(
                        "%x format: an integer is required, not {}",
                        value.type_name()
                    ))
                })?;
                if n < 0 {
                    out.push('-');
                }
                out.push_str(&format!("{:x}", n.unsigned_abs()));
            }
            'c' => out.push(format_char(&value)?),
            other => {
                return Err(UnfoldError::Value(format!(
                    "unsupported format character '{}' (0x{:x})",
                    other, other as u32
                )));
            }
        }
    }
    if args.next().is_some() {
        return Err(UnfoldError::Type(
            "not all arguments converted during string formatting".to_string(),
        ));
    }
    Ok(Value::Str(out))
}

fn format_char(value: &Value) -> Result<char, UnfoldError> {
    match value {
        Value::Str(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(UnfoldError::Type(
                    "%c requires an int or a unicode character, not a string of length != 1"
                        .to_string(),
                )),
            }
        }
        other => {
            let n = other.as_int().ok_or_else(|| {
                UnfoldError::Type(format!(
                    "%c requires an int or a unicode character, not {}",
                    other.type_name()
                ))
            })?;
            u32::try_from(n)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| UnfoldError::Value("%c arg not in range(0x110000)".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn str_value(s: &str) -> Value {
        Value::Str(s.to_string())
    }

    #[test]
    fn test_format_halves_escapes() {
        let out = apply_format(str_value("%c%%c%%%%c"), Value::Int(97)).unwrap();
        assert_eq!(out, str_value("a%c%%c"));
    }

    #[test]
    fn test_format_hex_of_bools() {
        assert_eq!(
            apply_format(str_value("%x"), Value::Bool(true)).unwrap(),
            str_value("1")
        );
        assert_eq!(
            apply_format(str_value("%x"), Value::Int(11)).unwrap(),
            str_value("b")
        );
    }

    #[test]
    fn test_format_argument_mismatch() {
        assert_eq!(
            apply_format(str_value("%%"), Value::Int(1)),
            Err(UnfoldError::Type(
                "not all arguments converted during string formatting".to_string()
            ))
        );
        assert_eq!(
            apply_format(str_value("%c%c"), Value::Int(1)),
            Err(UnfoldError::Type(
                "not enough arguments for format string".to_string()
            ))
        );
    }

    #[test]
    fn test_format_empty_tuple_consumes_nothing() {
        assert_eq!(
            apply_format(str_value("%%"), Value::Tuple(vec![])).unwrap(),
            str_value("%")
        );
    }

    #[test]
    fn test_unfold_bootstrap() {
        let unfolded = unfold("exec('x=%x%%x'%(''=='')%(''==''))").unwrap();
        assert_eq!(unfolded.executed, vec!["x=11".to_string()]);
        assert_eq!(unfolded.bindings.get("x"), Some(&Value::Int(11)));
    }

    #[test]
    fn test_unfold_boolean_literals() {
        let unfolded = unfold("exec('%x'%(''==()))").unwrap();
        assert_eq!(unfolded.payload(), Some("0"));
    }

    #[test]
    fn test_unfold_accumulator_forms() {
        // The quote ends the literal early, as it would in Python
        let err = unfold("exec('xx=''')").unwrap_err();
        assert!(matches!(err, UnfoldError::Syntax { .. }));

        let mut bindings = HashMap::new();
        bindings.insert("xx".to_string(), str_value("pr"));
        assert_eq!(
            recognise_statement("xx+=chr(105)", &bindings),
            Some(("xx".to_string(), str_value("pri")))
        );
        assert_eq!(recognise_statement("yy+=chr(105)", &bindings), None);
        assert_eq!(
            recognise_statement("eec=0b110", &bindings),
            Some(("eec".to_string(), Value::Int(6)))
        );
        assert_eq!(recognise_statement("print(3)", &bindings), None);
    }

    #[test]
    fn test_unfold_unbound_name() {
        assert_eq!(
            unfold("exec(eec)").unwrap_err(),
            UnfoldError::Name("eec".to_string())
        );
    }

    #[test]
    fn test_unfold_exec_of_non_string() {
        let err = unfold("exec((''==''))").unwrap_err();
        assert!(err.to_string().contains("not bool"));
    }

    #[test]
    fn test_unfold_rejects_trailing_text() {
        assert!(matches!(
            unfold("exec('')\nprint(1)"),
            Err(UnfoldError::Syntax { .. })
        ));
        assert!(matches!(unfold(""), Err(UnfoldError::Syntax { .. })));
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pipe expressions: `{{ "hello" 4 | repeat }}`.
//!
//! Arguments are double-quoted strings without inner whitespace or bare
//! 64-bit integers. The function after the last `|` is resolved in a
//! [`FunctionRegistry`] and must return exactly one string.

use crate::error::{BindError, BindResult};
use crate::invoke::FunctionRegistry;
use crate::types::Kind;
use crate::value::DynamicData;
use std::fmt;
use std::str::FromStr;

/// An argument literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    String(String),
    Int(i64),
}

impl Literal {
    fn parse(token: &str) -> BindResult<Self> {
        if let Some(quoted) = token.strip_prefix('"') {
            return match quoted.strip_suffix('"') {
                Some(inner) if !inner.contains('"') => Ok(Self::String(inner.to_string())),
                _ => Err(BindError::parse(token, "unterminated string literal")),
            };
        }
        token
            .parse::<i64>()
            .map(Self::Int)
            .map_err(|_| BindError::parse(token, "expected a quoted string or an integer"))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::String(_) => Kind::String,
            Self::Int(_) => Kind::I64,
        }
    }

    pub fn to_data(&self) -> DynamicData {
        match self {
            Self::String(s) => DynamicData::string(s.clone()),
            Self::Int(v) => DynamicData::of(*v),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "\"{}\"", s),
            Self::Int(v) => write!(f, "{}", v),
        }
    }
}

/// A parsed pipe expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub args: Vec<Literal>,
    pub function: String,
}

impl Expression {
    pub fn parse(input: &str) -> BindResult<Self> {
        let body = input
            .trim()
            .strip_prefix("{{")
            .and_then(|t| t.strip_suffix("}}"))
            .ok_or_else(|| BindError::parse(input, "expression must be wrapped in {{ }}"))?;
        let (args_text, function) = body
            .rsplit_once('|')
            .ok_or_else(|| BindError::parse(input, "missing '|' before function name"))?;

        let function = function.trim();
        let valid_name = !function.is_empty()
            && function
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '.');
        if !valid_name {
            return Err(BindError::parse(input, "invalid function name"));
        }

        let args = args_text
            .split_whitespace()
            .map(Literal::parse)
            .collect::<BindResult<Vec<_>>>()?;
        if args.is_empty() {
            return Err(BindError::parse(input, "expected at least one argument"));
        }
        Ok(Self {
            args,
            function: function.to_string(),
        })
    }

    /// Resolve the function, check the literals against its parameters
    /// and call it.
    pub fn evaluate(&self, registry: &FunctionRegistry) -> BindResult<String> {
        let callable = registry
            .get(&self.function)
            .ok_or_else(|| BindError::UnknownFunction(self.function.clone()))?;

        let params = callable.signature().params();
        if self.args.len() != params.len() {
            return Err(BindError::ArityMismatch {
                expected: params.len(),
                found: self.args.len(),
                variadic: false,
            });
        }
        let args = self
            .args
            .iter()
            .zip(params)
            .enumerate()
            .map(|(index, (literal, param))| {
                if literal.kind() != param.kind() && !param.accepts_any() {
                    return Err(BindError::TypeMismatch {
                        index,
                        expected: param.kind(),
                        found: literal.kind(),
                    });
                }
                Ok(literal.to_data())
            })
            .collect::<BindResult<Vec<_>>>()?;

        log::trace!("[invoke] evaluating {}", self);
        let results = callable.call(&args)?;
        match results.as_slice() {
            [single] if single.kind() == Kind::String => single.get::<String>(),
            other => Err(BindError::InvalidResultShape(format!(
                "{} must return one string, returned {} value(s)",
                self.function,
                other.len()
            ))),
        }
    }
}

impl FromStr for Expression {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{{ ")?;
        for arg in &self.args {
            write!(f, "{} ", arg)?;
        }
        write!(f, "| {} }}}}", self.function)
    }
}

/// Parse and evaluate `input` against `registry`.
pub fn evaluate(input: &str, registry: &FunctionRegistry) -> BindResult<String> {
    Expression::parse(input)?.evaluate(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoke::Callable;

    #[test]
    fn test_parse() {
        let expr: Expression = r#"  {{ "hello"   4 |repeat}} "#.parse().expect("valid");
        assert_eq!(
            expr.args,
            vec![Literal::String("hello".into()), Literal::Int(4)]
        );
        assert_eq!(expr.function, "repeat");
        assert_eq!(expr.to_string(), r#"{{ "hello" 4 | repeat }}"#);
    }

    #[test]
    fn test_parse_errors() {
        for bad in [
            r#""hello" | repeat"#,
            r#"{{ "hello" 4 }}"#,
            r#"{{ | repeat }}"#,
            r#"{{ "hello world" | upper }}"#,
            r#"{{ "hello" 4x | repeat }}"#,
            r#"{{ "hello" | }}"#,
            r#"{{ "a"b" | upper }}"#,
        ] {
            assert!(
                matches!(Expression::parse(bad), Err(BindError::ParseError { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_evaluate_repeat() {
        let registry = FunctionRegistry::with_builtins();
        assert_eq!(
            evaluate(r#"{{ "hello" 4 | repeat }}"#, &registry).ok().as_deref(),
            Some("hellohellohellohello")
        );
    }

    #[test]
    fn test_evaluate_errors() {
        let registry = FunctionRegistry::with_builtins();
        assert_eq!(
            evaluate(r#"{{ "x" | nope }}"#, &registry),
            Err(BindError::UnknownFunction("nope".into()))
        );
        assert_eq!(
            evaluate(r#"{{ "x" | repeat }}"#, &registry),
            Err(BindError::ArityMismatch {
                expected: 2,
                found: 1,
                variadic: false
            })
        );
        assert_eq!(
            evaluate(r#"{{ 4 "x" | repeat }}"#, &registry),
            Err(BindError::TypeMismatch {
                index: 0,
                expected: Kind::String,
                found: Kind::I64
            })
        );
        assert!(matches!(
            evaluate(r#"{{ "abc" | len }}"#, &registry),
            Err(BindError::InvalidResultShape(_))
        ));
    }

    #[test]
    fn test_interface_parameters_accept_any_literal() {
        let mut registry = FunctionRegistry::new();
        registry.register(Callable::native("show", |v: DynamicData| v.to_string()));
        assert_eq!(
            evaluate("{{ 42 | show }}", &registry).ok().as_deref(),
            Some("42")
        );
    }
}

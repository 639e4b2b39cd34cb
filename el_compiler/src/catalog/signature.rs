//! Function signatures and the static catalog table

use super::functions::*;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    String,
    Boolean,
    Numeric,
    DateTime,
    Encoding,
    Json,
    MultiAttribute,
    Standalone,
    Hash,
    State,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Numeric => "numeric",
            Self::DateTime => "datetime",
            Self::Encoding => "encoding",
            Self::Json => "json",
            Self::MultiAttribute => "multiAttribute",
            Self::Standalone => "standalone",
            Self::Hash => "hash",
            Self::State => "state",
        }
    }
}

/// Statically known result type of a call or expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueType {
    String,
    Number,
    Boolean,
    DateTime,
    Multi,
    /// Depends on argument values
    Any,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "String",
            Self::Number => "Number",
            Self::Boolean => "Boolean",
            Self::DateTime => "DateTime",
            Self::Multi => "Multi",
            Self::Any => "Any",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FunctionSignature {
    pub name: &'static str,
    pub function: Function,
    pub category: Category,
    pub min_args: usize,
    /// `None` for variadic functions
    pub max_args: Option<usize>,
    pub requires_subject: bool,
    pub produces_multi: bool,
    pub is_reducing: bool,
    /// Applied element-wise to a multi-value subject
    pub multi_aware: bool,
    /// Receives `Null` for an absent attribute instead of `""`
    pub null_safe: bool,
    pub supported: bool,
    pub output: ValueType,
}

impl FunctionSignature {
    const fn subject(
        function: Function,
        name: &'static str,
        category: Category,
        min_args: usize,
        max_args: Option<usize>,
        output: ValueType,
    ) -> Self {
        Self {
            name,
            function,
            category,
            min_args,
            max_args,
            requires_subject: true,
            produces_multi: false,
            is_reducing: false,
            multi_aware: true,
            null_safe: false,
            supported: true,
            output,
        }
    }

    const fn standalone(
        function: Function,
        name: &'static str,
        min_args: usize,
        max_args: Option<usize>,
        output: ValueType,
    ) -> Self {
        Self {
            requires_subject: false,
            multi_aware: false,
            ..Self::subject(function, name, Category::Standalone, min_args, max_args, output)
        }
    }

    const fn producer(function: Function, name: &'static str, min_args: usize, max_args: Option<usize>) -> Self {
        Self {
            category: Category::MultiAttribute,
            produces_multi: true,
            ..Self::standalone(function, name, min_args, max_args, ValueType::Multi)
        }
    }

    const fn reducing(self) -> Self {
        Self {
            is_reducing: true,
            ..self
        }
    }

    const fn scalar_only(self) -> Self {
        Self {
            multi_aware: false,
            ..self
        }
    }

    const fn null_safe(self) -> Self {
        Self {
            null_safe: true,
            ..self
        }
    }

    const fn unsupported(self) -> Self {
        Self {
            supported: false,
            ..self
        }
    }

    pub fn accepts_arity(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }

    /// Human readable arity, e.g. `1`, `1-2`, `1+`
    pub fn arity_description(&self) -> String {
        match self.max_args {
            Some(max) if max == self.min_args => max.to_string(),
            Some(max) => format!("{}-{}", self.min_args, max),
            None => format!("{}+", self.min_args),
        }
    }
}

use Category as C;
use ValueType as T;

const fn string_fn(f: StringFn, name: &'static str, min: usize, max: usize, out: ValueType) -> FunctionSignature {
    FunctionSignature::subject(Function::String(f), name, C::String, min, Some(max), out)
}

const fn boolean_fn(f: BooleanFn, name: &'static str, min: usize, max: Option<usize>) -> FunctionSignature {
    FunctionSignature::subject(Function::Boolean(f), name, C::Boolean, min, max, T::Boolean)
}

const fn numeric_fn(f: NumericFn, name: &'static str, min: usize, max: usize, out: ValueType) -> FunctionSignature {
    FunctionSignature::subject(Function::Numeric(f), name, C::Numeric, min, Some(max), out)
}

const fn datetime_fn(f: DateTimeFn, name: &'static str, min: usize, max: usize, out: ValueType) -> FunctionSignature {
    FunctionSignature::subject(Function::DateTime(f), name, C::DateTime, min, Some(max), out)
}

const fn encoding_fn(f: EncodingFn, name: &'static str, out: ValueType) -> FunctionSignature {
    FunctionSignature::subject(Function::Encoding(f), name, C::Encoding, 0, Some(0), out)
}

const fn json_fn(f: JsonFn, name: &'static str, args: usize) -> FunctionSignature {
    FunctionSignature::subject(Function::Json(f), name, C::Json, args, Some(args), T::String).unsupported()
}

const fn standalone_fn(f: StandaloneFn, name: &'static str, min: usize, max: usize, out: ValueType) -> FunctionSignature {
    FunctionSignature::standalone(Function::Standalone(f), name, min, Some(max), out)
}

pub(super) static SIGNATURES: &[FunctionSignature] = &[
    // String
    string_fn(StringFn::ToUpper, "toUpper", 0, 0, T::String),
    string_fn(StringFn::ToLower, "toLower", 0, 0, T::String),
    string_fn(StringFn::Trim, "trim", 0, 0, T::String),
    string_fn(StringFn::Length, "length", 0, 0, T::Number),
    string_fn(StringFn::Substring, "substring", 1, 2, T::String),
    string_fn(StringFn::SubstringBefore, "substringBefore", 1, 1, T::String),
    string_fn(StringFn::SubstringAfter, "substringAfter", 1, 1, T::String),
    string_fn(StringFn::SubstringBeforeLast, "substringBeforeLast", 1, 1, T::String),
    string_fn(StringFn::SubstringAfterLast, "substringAfterLast", 1, 1, T::String),
    string_fn(StringFn::Append, "append", 1, 1, T::String),
    string_fn(StringFn::Prepend, "prepend", 1, 1, T::String),
    string_fn(StringFn::Replace, "replace", 2, 2, T::String),
    string_fn(StringFn::ReplaceFirst, "replaceFirst", 2, 2, T::String),
    string_fn(StringFn::ReplaceAll, "replaceAll", 2, 2, T::String),
    string_fn(StringFn::ReplaceNull, "replaceNull", 1, 1, T::String).null_safe(),
    string_fn(StringFn::ReplaceEmpty, "replaceEmpty", 1, 1, T::String),
    string_fn(StringFn::IndexOf, "indexOf", 1, 1, T::Number),
    string_fn(StringFn::LastIndexOf, "lastIndexOf", 1, 1, T::Number),
    string_fn(StringFn::PadLeft, "padLeft", 1, 2, T::String),
    string_fn(StringFn::PadRight, "padRight", 1, 2, T::String),
    string_fn(StringFn::Repeat, "repeat", 1, 2, T::String),
    string_fn(StringFn::GetDelimitedField, "getDelimitedField", 1, 5, T::String),
    string_fn(StringFn::EvaluateElString, "evaluateELString", 0, 0, T::Any).scalar_only(),
    // Boolean
    boolean_fn(BooleanFn::IsNull, "isNull", 0, Some(0)).null_safe(),
    boolean_fn(BooleanFn::NotNull, "notNull", 0, Some(0)).null_safe(),
    boolean_fn(BooleanFn::IsEmpty, "isEmpty", 0, Some(0)),
    boolean_fn(BooleanFn::Equals, "equals", 1, Some(1)),
    boolean_fn(BooleanFn::EqualsIgnoreCase, "equalsIgnoreCase", 1, Some(1)),
    boolean_fn(BooleanFn::StartsWith, "startsWith", 1, Some(1)),
    boolean_fn(BooleanFn::EndsWith, "endsWith", 1, Some(1)),
    boolean_fn(BooleanFn::Contains, "contains", 1, Some(1)),
    boolean_fn(BooleanFn::In, "in", 1, None),
    boolean_fn(BooleanFn::Matches, "matches", 1, Some(1)),
    boolean_fn(BooleanFn::Find, "find", 1, Some(1)),
    boolean_fn(BooleanFn::Not, "not", 0, Some(0)),
    boolean_fn(BooleanFn::And, "and", 1, Some(1)).scalar_only(),
    boolean_fn(BooleanFn::Or, "or", 1, Some(1)).scalar_only(),
    FunctionSignature::subject(Function::Boolean(BooleanFn::IfElse), "ifElse", C::Boolean, 2, Some(2), T::Any)
        .scalar_only(),
    // Numeric
    numeric_fn(NumericFn::Plus, "plus", 1, 1, T::Number),
    numeric_fn(NumericFn::Minus, "minus", 1, 1, T::Number),
    numeric_fn(NumericFn::Multiply, "multiply", 1, 1, T::Number),
    numeric_fn(NumericFn::Divide, "divide", 1, 1, T::Number),
    numeric_fn(NumericFn::Mod, "mod", 1, 1, T::Number),
    numeric_fn(NumericFn::Gt, "gt", 1, 1, T::Boolean),
    numeric_fn(NumericFn::Ge, "ge", 1, 1, T::Boolean),
    numeric_fn(NumericFn::Lt, "lt", 1, 1, T::Boolean),
    numeric_fn(NumericFn::Le, "le", 1, 1, T::Boolean),
    numeric_fn(NumericFn::ToNumber, "toNumber", 0, 0, T::Number),
    numeric_fn(NumericFn::ToDecimal, "toDecimal", 0, 0, T::Number),
    numeric_fn(NumericFn::Math, "math", 1, 2, T::Number),
    numeric_fn(NumericFn::ToRadix, "toRadix", 1, 2, T::String),
    numeric_fn(NumericFn::FromRadix, "fromRadix", 1, 1, T::Number),
    // Date/time
    datetime_fn(DateTimeFn::Format, "format", 1, 2, T::String),
    datetime_fn(DateTimeFn::FormatInstant, "formatInstant", 1, 2, T::String),
    datetime_fn(DateTimeFn::ToDate, "toDate", 0, 2, T::DateTime),
    datetime_fn(DateTimeFn::ToInstant, "toInstant", 0, 2, T::DateTime),
    // Encoding
    encoding_fn(EncodingFn::Base64Encode, "base64Encode", T::String),
    encoding_fn(EncodingFn::Base64Decode, "base64Decode", T::String),
    encoding_fn(EncodingFn::EscapeJson, "escapeJson", T::String),
    encoding_fn(EncodingFn::UnescapeJson, "unescapeJson", T::String),
    encoding_fn(EncodingFn::IsJson, "isJson", T::Boolean),
    encoding_fn(EncodingFn::UrlEncode, "urlEncode", T::String).unsupported(),
    encoding_fn(EncodingFn::UrlDecode, "urlDecode", T::String).unsupported(),
    encoding_fn(EncodingFn::EscapeXml, "escapeXml", T::String).unsupported(),
    encoding_fn(EncodingFn::EscapeCsv, "escapeCsv", T::String).unsupported(),
    encoding_fn(EncodingFn::EscapeHtml3, "escapeHtml3", T::String).unsupported(),
    encoding_fn(EncodingFn::EscapeHtml4, "escapeHtml4", T::String).unsupported(),
    encoding_fn(EncodingFn::UnescapeXml, "unescapeXml", T::String).unsupported(),
    encoding_fn(EncodingFn::UnescapeCsv, "unescapeCsv", T::String).unsupported(),
    encoding_fn(EncodingFn::UnescapeHtml3, "unescapeHtml3", T::String).unsupported(),
    encoding_fn(EncodingFn::UnescapeHtml4, "unescapeHtml4", T::String).unsupported(),
    encoding_fn(EncodingFn::Base32Encode, "base32Encode", T::String).unsupported(),
    encoding_fn(EncodingFn::Base32Decode, "base32Decode", T::String).unsupported(),
    // JSON
    json_fn(JsonFn::JsonPath, "jsonPath", 1),
    json_fn(JsonFn::JsonPathDelete, "jsonPathDelete", 1),
    json_fn(JsonFn::JsonPathAdd, "jsonPathAdd", 2),
    json_fn(JsonFn::JsonPathSet, "jsonPathSet", 2),
    json_fn(JsonFn::JsonPathPut, "jsonPathPut", 3),
    // Multi-attribute
    FunctionSignature::producer(Function::Multi(MultiFn::AllAttributes), "allAttributes", 1, None),
    FunctionSignature::producer(Function::Multi(MultiFn::AnyAttribute), "anyAttribute", 1, None),
    FunctionSignature::producer(
        Function::Multi(MultiFn::AllMatchingAttributes),
        "allMatchingAttributes",
        1,
        None,
    ),
    FunctionSignature::producer(
        Function::Multi(MultiFn::AnyMatchingAttribute),
        "anyMatchingAttribute",
        1,
        None,
    ),
    FunctionSignature::producer(
        Function::Multi(MultiFn::AllDelineatedValues),
        "allDelineatedValues",
        2,
        Some(2),
    ),
    FunctionSignature::producer(
        Function::Multi(MultiFn::AnyDelineatedValue),
        "anyDelineatedValue",
        2,
        Some(2),
    ),
    FunctionSignature::subject(Function::Multi(MultiFn::Join), "join", C::MultiAttribute, 1, Some(1), T::String)
        .reducing(),
    FunctionSignature::subject(Function::Multi(MultiFn::Count), "count", C::MultiAttribute, 0, Some(0), T::Number)
        .reducing(),
    // Standalone
    standalone_fn(StandaloneFn::Uuid, "UUID", 0, 0, T::String),
    standalone_fn(StandaloneFn::Uuid3, "UUID3", 1, 2, T::String).unsupported(),
    standalone_fn(StandaloneFn::Uuid5, "UUID5", 1, 2, T::String).unsupported(),
    standalone_fn(StandaloneFn::Random, "random", 0, 0, T::Number),
    standalone_fn(StandaloneFn::NextInt, "nextInt", 0, 0, T::Number),
    standalone_fn(StandaloneFn::Hostname, "hostname", 0, 1, T::String),
    standalone_fn(StandaloneFn::Literal, "literal", 1, 1, T::Any),
    standalone_fn(StandaloneFn::Thread, "thread", 0, 0, T::String),
    standalone_fn(StandaloneFn::Now, "now", 0, 0, T::DateTime),
    standalone_fn(StandaloneFn::Ip, "ip", 0, 0, T::String).unsupported(),
    standalone_fn(StandaloneFn::GetUri, "getUri", 1, 7, T::String).unsupported(),
    // Hash and state
    FunctionSignature::subject(Function::Hash(HashFn::Hash), "hash", C::Hash, 1, Some(1), T::String).unsupported(),
    FunctionSignature {
        category: C::State,
        ..FunctionSignature::standalone(Function::State(StateFn::GetStateValue), "getStateValue", 1, Some(1), T::String)
    }
    .unsupported(),
];

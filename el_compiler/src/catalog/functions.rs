//! Closed set of catalog functions, one enum per category

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! function_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Name as written in expression source
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }
    };
}

function_enum!(
    /// String manipulation applied to a subject
    StringFn {
        ToUpper => "toUpper",
        ToLower => "toLower",
        Trim => "trim",
        Length => "length",
        Substring => "substring",
        SubstringBefore => "substringBefore",
        SubstringAfter => "substringAfter",
        SubstringBeforeLast => "substringBeforeLast",
        SubstringAfterLast => "substringAfterLast",
        Append => "append",
        Prepend => "prepend",
        Replace => "replace",
        ReplaceFirst => "replaceFirst",
        ReplaceAll => "replaceAll",
        ReplaceNull => "replaceNull",
        ReplaceEmpty => "replaceEmpty",
        IndexOf => "indexOf",
        LastIndexOf => "lastIndexOf",
        PadLeft => "padLeft",
        PadRight => "padRight",
        Repeat => "repeat",
        GetDelimitedField => "getDelimitedField",
        EvaluateElString => "evaluateELString",
    }
);

function_enum!(
    /// Predicates and logical combinators
    BooleanFn {
        IsNull => "isNull",
        NotNull => "notNull",
        IsEmpty => "isEmpty",
        Equals => "equals",
        EqualsIgnoreCase => "equalsIgnoreCase",
        StartsWith => "startsWith",
        EndsWith => "endsWith",
        Contains => "contains",
        In => "in",
        Matches => "matches",
        Find => "find",
        Not => "not",
        And => "and",
        Or => "or",
        IfElse => "ifElse",
    }
);

function_enum!(
    NumericFn {
        Plus => "plus",
        Minus => "minus",
        Multiply => "multiply",
        Divide => "divide",
        Mod => "mod",
        Gt => "gt",
        Ge => "ge",
        Lt => "lt",
        Le => "le",
        ToNumber => "toNumber",
        ToDecimal => "toDecimal",
        Math => "math",
        ToRadix => "toRadix",
        FromRadix => "fromRadix",
    }
);

function_enum!(
    DateTimeFn {
        Format => "format",
        FormatInstant => "formatInstant",
        ToDate => "toDate",
        ToInstant => "toInstant",
    }
);

function_enum!(
    EncodingFn {
        Base64Encode => "base64Encode",
        Base64Decode => "base64Decode",
        EscapeJson => "escapeJson",
        UnescapeJson => "unescapeJson",
        IsJson => "isJson",
        UrlEncode => "urlEncode",
        UrlDecode => "urlDecode",
        EscapeXml => "escapeXml",
        EscapeCsv => "escapeCsv",
        EscapeHtml3 => "escapeHtml3",
        EscapeHtml4 => "escapeHtml4",
        UnescapeXml => "unescapeXml",
        UnescapeCsv => "unescapeCsv",
        UnescapeHtml3 => "unescapeHtml3",
        UnescapeHtml4 => "unescapeHtml4",
        Base32Encode => "base32Encode",
        Base32Decode => "base32Decode",
    }
);

function_enum!(
    JsonFn {
        JsonPath => "jsonPath",
        JsonPathDelete => "jsonPathDelete",
        JsonPathAdd => "jsonPathAdd",
        JsonPathSet => "jsonPathSet",
        JsonPathPut => "jsonPathPut",
    }
);

function_enum!(
    /// Multi-value producers and the reducers that collapse them
    MultiFn {
        AllAttributes => "allAttributes",
        AnyAttribute => "anyAttribute",
        AllMatchingAttributes => "allMatchingAttributes",
        AnyMatchingAttribute => "anyMatchingAttribute",
        AllDelineatedValues => "allDelineatedValues",
        AnyDelineatedValue => "anyDelineatedValue",
        Join => "join",
        Count => "count",
    }
);

function_enum!(
    /// Functions valid only at the head of an expression
    StandaloneFn {
        Uuid => "UUID",
        Uuid3 => "UUID3",
        Uuid5 => "UUID5",
        Random => "random",
        NextInt => "nextInt",
        Hostname => "hostname",
        Literal => "literal",
        Thread => "thread",
        Now => "now",
        Ip => "ip",
        GetUri => "getUri",
    }
);

function_enum!(HashFn { Hash => "hash" });

function_enum!(StateFn { GetStateValue => "getStateValue" });

/// Any function known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    String(StringFn),
    Boolean(BooleanFn),
    Numeric(NumericFn),
    DateTime(DateTimeFn),
    Encoding(EncodingFn),
    Json(JsonFn),
    Multi(MultiFn),
    Standalone(StandaloneFn),
    Hash(HashFn),
    State(StateFn),
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::String(f) => f.as_str(),
            Function::Boolean(f) => f.as_str(),
            Function::Numeric(f) => f.as_str(),
            Function::DateTime(f) => f.as_str(),
            Function::Encoding(f) => f.as_str(),
            Function::Json(f) => f.as_str(),
            Function::Multi(f) => f.as_str(),
            Function::Standalone(f) => f.as_str(),
            Function::Hash(f) => f.as_str(),
            Function::State(f) => f.as_str(),
        }
    }

    /// Every catalog function, grouped by category
    pub fn all() -> impl Iterator<Item = Function> {
        StringFn::ALL
            .iter()
            .map(|f| Function::String(*f))
            .chain(BooleanFn::ALL.iter().map(|f| Function::Boolean(*f)))
            .chain(NumericFn::ALL.iter().map(|f| Function::Numeric(*f)))
            .chain(DateTimeFn::ALL.iter().map(|f| Function::DateTime(*f)))
            .chain(EncodingFn::ALL.iter().map(|f| Function::Encoding(*f)))
            .chain(JsonFn::ALL.iter().map(|f| Function::Json(*f)))
            .chain(MultiFn::ALL.iter().map(|f| Function::Multi(*f)))
            .chain(StandaloneFn::ALL.iter().map(|f| Function::Standalone(*f)))
            .chain(HashFn::ALL.iter().map(|f| Function::Hash(*f)))
            .chain(StateFn::ALL.iter().map(|f| Function::State(*f)))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

use super::coercion::to_string;
use crate::types::{EvalError, EvalResult, ResolvedValue};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use el_compiler::catalog::EncodingFn;

pub fn call(function: EncodingFn, subject: &ResolvedValue) -> EvalResult<ResolvedValue> {
    let text = to_string(subject);
    match function {
        EncodingFn::Base64Encode => Ok(STANDARD.encode(text.as_bytes()).into()),
        EncodingFn::Base64Decode => {
            let bytes = STANDARD
                .decode(text.as_bytes())
                .map_err(|e| EvalError::invalid_argument("base64Decode", e.to_string()))?;
            Ok(String::from_utf8_lossy(&bytes).into_owned().into())
        }
        EncodingFn::EscapeJson => {
            let quoted = serde_json::to_string(&text)
                .map_err(|e| EvalError::invalid_argument("escapeJson", e.to_string()))?;
            Ok(quoted[1..quoted.len() - 1].to_string().into())
        }
        EncodingFn::UnescapeJson => serde_json::from_str::<String>(&format!("\"{}\"", text))
            .map(ResolvedValue::Str)
            .map_err(|e| EvalError::invalid_argument("unescapeJson", e.to_string())),
        EncodingFn::IsJson => Ok(serde_json::from_str::<serde_json::Value>(text.trim()).is_ok().into()),
        unsupported => Err(EvalError::Unsupported {
            name: unsupported.as_str().to_string(),
        }),
    }
}

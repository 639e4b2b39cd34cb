//! Generators valid only at the head of an expression
//!
//! `UUID`, `random`, `nextInt` and `now` are impure: repeated evaluation of
//! one compiled expression may differ.

use super::arg;
use super::coercion::to_bool;
use crate::types::{EvalError, EvalResult, ResolvedValue};
use chrono::Utc;
use el_compiler::catalog::StandaloneFn;
use rand::Rng;
use std::sync::atomic::{AtomicI64, Ordering};

/// Process-wide counter behind `nextInt()`
static NEXT_INT: AtomicI64 = AtomicI64::new(0);

pub fn call(function: StandaloneFn, args: &[ResolvedValue]) -> EvalResult<ResolvedValue> {
    match function {
        StandaloneFn::Uuid => Ok(ResolvedValue::Str(uuid::Uuid::new_v4().to_string())),
        StandaloneFn::Random => Ok(ResolvedValue::int(rand::rng().random_range(0..=i64::MAX))),
        StandaloneFn::NextInt => Ok(ResolvedValue::int(NEXT_INT.fetch_add(1, Ordering::Relaxed))),
        StandaloneFn::Hostname => {
            // fqdn flag is checked but both forms return the host name
            if !args.is_empty() {
                to_bool(arg(args, 0))?;
            }
            let name = hostname::get().map_err(|e| EvalError::Host {
                reason: e.to_string(),
            })?;
            Ok(ResolvedValue::Str(name.to_string_lossy().into_owned()))
        }
        StandaloneFn::Literal => Ok(arg(args, 0).clone()),
        StandaloneFn::Thread => {
            let current = std::thread::current();
            let name = match current.name() {
                Some(name) => name.to_string(),
                None => format!("{:?}", current.id()),
            };
            Ok(ResolvedValue::Str(name))
        }
        StandaloneFn::Now => Ok(ResolvedValue::temporal(Utc::now())),
        StandaloneFn::Uuid3 | StandaloneFn::Uuid5 | StandaloneFn::Ip | StandaloneFn::GetUri => {
            Err(EvalError::Unsupported {
                name: function.as_str().to_string(),
            })
        }
    }
}

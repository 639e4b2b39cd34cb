//! Python helper module for the Python dialect
//!
//! Values are represented as `str`, `int`, `float`, `bool`, aware
//! `datetime`, `list` (multi-value) and `None` (absent attribute).

use crate::config::compile_time::evaluation::MAX_STRING_LENGTH;
use std::sync::OnceLock;

/// Source of the helpers referenced by Python-rendered expressions
pub fn python_prelude() -> &'static str {
    static PRELUDE: OnceLock<String> = OnceLock::new();
    PRELUDE.get_or_init(|| PYTHON_PRELUDE.replace("@MAX_STRING_LENGTH@", &MAX_STRING_LENGTH.to_string()))
}

const PYTHON_PRELUDE: &str = r#"# Helpers for rendered flow expressions
import base64
import itertools
import json
import math
import random as _random
import re
import socket
import threading
import uuid
from datetime import datetime, timedelta, timezone
from decimal import Decimal


class ELTypeCoercionError(ValueError):
    pass


class ELArithmeticError(ArithmeticError):
    pass


class ELInvalidArgument(ValueError):
    pass


EL_DEFAULT_TZ = timezone.utc
EL_DEFAULT_HOST_PATTERN = '%a %b %d %H:%M:%S %Z %Y'
EL_MAX_STRING_LENGTH = @MAX_STRING_LENGTH@
_I64_MIN = -(1 << 63)
_I64_MAX = (1 << 63) - 1
_INT_RE = re.compile(r'[+-]?[0-9]+')
_next_int = itertools.count()


def el_wrap(i):
    return ((i - _I64_MIN) % (1 << 64)) + _I64_MIN


def el_fmt_float(d):
    if d != d:
        return 'NaN'
    if math.isinf(d):
        return 'Infinity' if d > 0 else '-Infinity'
    if d == 0:
        return '-0.0' if math.copysign(1.0, d) < 0 else '0.0'
    if 1e-3 <= abs(d) < 1e7:
        s = repr(d)
        return s if '.' in s else s + '.0'
    sign, digits, exponent = Decimal(repr(d)).as_tuple()
    digits = ''.join(str(x) for x in digits).rstrip('0') or '0'
    mantissa = digits[0] + '.' + (digits[1:] or '0')
    power = exponent + len(Decimal(repr(d)).as_tuple().digits) - 1
    return ('-' if sign else '') + mantissa + 'E' + str(power)


def el_str(v):
    if v is None:
        return ''
    if v is True:
        return 'true'
    if v is False:
        return 'false'
    if isinstance(v, int):
        return str(v)
    if isinstance(v, float):
        return el_fmt_float(v)
    if isinstance(v, datetime):
        return el_strftime(v, EL_DEFAULT_HOST_PATTERN, EL_DEFAULT_TZ)
    if isinstance(v, list):
        return ','.join(el_str(x) for x in v)
    return v


def el_num(v):
    if v is None or isinstance(v, bool):
        raise ELTypeCoercionError('cannot convert %r to a number' % (v,))
    if isinstance(v, (int, float)):
        return v
    if isinstance(v, datetime):
        return el_epoch_ms(v)
    s = el_str(v).strip()
    try:
        if any(c in s for c in '.eE'):
            return float(s)
        if _INT_RE.fullmatch(s):
            i = int(s)
            if _I64_MIN <= i <= _I64_MAX:
                return i
    except ValueError:
        pass
    raise ELTypeCoercionError('cannot convert %r to a number' % (s,))


def el_int(v):
    n = el_num(v)
    return int(n)


def el_bool(v):
    if isinstance(v, bool):
        return v
    s = el_str(v).strip().lower()
    if s == 'true':
        return True
    if s == 'false':
        return False
    raise ELTypeCoercionError('cannot convert %r to a boolean' % (s,))


def _arith(a, b, int_op, float_op):
    x, y = el_num(a), el_num(b)
    if isinstance(x, int) and isinstance(y, int):
        return el_wrap(int_op(x, y))
    return float_op(float(x), float(y))


def _int_div(x, y):
    if y == 0:
        raise ELArithmeticError('division by zero')
    q = abs(x) // abs(y)
    return q if (x >= 0) == (y >= 0) else -q


def _int_mod(x, y):
    if y == 0:
        raise ELArithmeticError('division by zero')
    return x - _int_div(x, y) * y


def _float_div(x, y):
    if y == 0:
        return math.copysign(math.inf, x) * math.copysign(1.0, y) if x != 0 else math.nan
    return x / y


def _float_mod(x, y):
    return math.fmod(x, y) if y != 0 else math.nan


def el_plus(a, b):
    return _arith(a, b, lambda x, y: x + y, lambda x, y: x + y)


def el_minus(a, b):
    return _arith(a, b, lambda x, y: x - y, lambda x, y: x - y)


def el_multiply(a, b):
    return _arith(a, b, lambda x, y: x * y, lambda x, y: x * y)


def el_divide(a, b):
    return _arith(a, b, _int_div, _float_div)


def el_mod(a, b):
    return _arith(a, b, _int_mod, _float_mod)


def el_gt(a, b):
    return el_num(a) > el_num(b)


def el_ge(a, b):
    return el_num(a) >= el_num(b)


def el_lt(a, b):
    return el_num(a) < el_num(b)


def el_le(a, b):
    return el_num(a) <= el_num(b)


def el_toNumber(a):
    return el_num(a)


def el_toDecimal(a):
    return float(el_num(a))


def el_math(a, op, arg=None):
    op = el_str(op)
    x = el_num(a)
    unary = {
        'ceil': lambda v: float(math.ceil(v)),
        'floor': lambda v: float(math.floor(v)),
        'round': lambda v: int(math.floor(v + 0.5)),
        'sqrt': math.sqrt,
        'cbrt': getattr(math, 'cbrt', lambda v: math.copysign(abs(v) ** (1.0 / 3.0), v)),
        'signum': lambda v: float((v > 0) - (v < 0)), 'exp': math.exp,
        'log': math.log, 'log10': math.log10, 'sin': math.sin, 'cos': math.cos, 'tan': math.tan,
    }
    if op == 'abs':
        return el_wrap(abs(x)) if isinstance(x, int) else abs(x)
    if op in unary:
        try:
            return unary[op](float(x))
        except ValueError:
            return math.nan
        except OverflowError:
            return math.inf
    if op in ('pow', 'max', 'min'):
        if arg is None:
            raise ELInvalidArgument('math(%s) needs a second argument' % op)
        y = el_num(arg)
        if op == 'pow':
            try:
                return math.pow(float(x), float(y))
            except ValueError:
                return math.nan
            except OverflowError:
                return math.inf
        pick = max if op == 'max' else min
        if isinstance(x, int) and isinstance(y, int):
            return pick(x, y)
        return float(pick(float(x), float(y)))
    raise ELInvalidArgument('unsupported math operation %s' % op)


_DIGITS = '0123456789abcdefghijklmnopqrstuvwxyz'


def el_toRadix(a, radix, padding=None):
    n, r = el_int(a), el_int(radix)
    if not 2 <= r <= 36:
        raise ELInvalidArgument('radix %d out of range' % r)
    digits, m = '', abs(n)
    while True:
        digits = _DIGITS[m % r] + digits
        m //= r
        if m == 0:
            break
    if padding is not None:
        digits = digits.rjust(el_int(padding), '0')
    return ('-' if n < 0 else '') + digits


def el_fromRadix(a, radix):
    r = el_int(radix)
    if not 2 <= r <= 36:
        raise ELInvalidArgument('radix %d out of range' % r)
    s = el_str(a).strip()
    try:
        if not re.fullmatch(r'[+-]?[0-9a-zA-Z]+', s):
            raise ValueError(s)
        n = int(s, r)
    except ValueError:
        raise ELTypeCoercionError('cannot parse %r in radix %d' % (el_str(a), r))
    if not _I64_MIN <= n <= _I64_MAX:
        raise ELTypeCoercionError('%r in radix %d does not fit in 64 bits' % (s, r))
    return n


def _clamp(i, n):
    return max(0, min(i, n))


def el_substring(a, start, end=None):
    s = el_str(a)
    b = _clamp(el_int(start), len(s))
    e = len(s) if end is None else _clamp(el_int(end), len(s))
    return s[b:e] if b <= e else ''


def el_substringBefore(a, d):
    s, d = el_str(a), el_str(d)
    i = s.find(d)
    return s if i < 0 else s[:i]


def el_substringAfter(a, d):
    s, d = el_str(a), el_str(d)
    i = s.find(d)
    return s if i < 0 else s[i + len(d):]


def el_substringBeforeLast(a, d):
    s, d = el_str(a), el_str(d)
    i = s.rfind(d)
    return s if i < 0 else s[:i]


def el_substringAfterLast(a, d):
    s, d = el_str(a), el_str(d)
    i = s.rfind(d)
    return s if i < 0 else s[i + len(d):]


def el_replace(a, search, replacement):
    return el_str(a).replace(el_str(search), el_str(replacement))


def _java_replacement(r, groups):
    out, i = [], 0
    while i < len(r):
        c = r[i]
        if c == '\\' and i + 1 < len(r):
            out.append(r[i + 1].replace('\\', '\\\\'))
            i += 2
        elif c == '$' and i + 1 < len(r) and r[i + 1] in '0123456789':
            group, j = int(r[i + 1]), i + 2
            if group > groups:
                raise ELInvalidArgument('no group %d in pattern with %d groups' % (group, groups))
            while j < len(r) and r[j] in '0123456789' and group * 10 + int(r[j]) <= groups:
                group, j = group * 10 + int(r[j]), j + 1
            out.append('\\g<%d>' % group)
            i = j
        else:
            out.append('\\\\' if c == '\\' else c)
            i += 1
    return ''.join(out)


def _regex(pattern):
    try:
        return re.compile(el_str(pattern))
    except re.error as e:
        raise ELInvalidArgument('invalid regex: %s' % e)


def el_replaceFirst(a, pattern, replacement):
    compiled = _regex(pattern)
    return compiled.sub(_java_replacement(el_str(replacement), compiled.groups), el_str(a), count=1)


def el_replaceAll(a, pattern, replacement):
    compiled = _regex(pattern)
    return compiled.sub(_java_replacement(el_str(replacement), compiled.groups), el_str(a))


def el_replaceNull(a, replacement):
    return replacement if a is None else el_str(a)


def el_replaceEmpty(a, replacement):
    s = el_str(a)
    return replacement if s.strip() == '' else s


def el_indexOf(a, term):
    return el_str(a).find(el_str(term))


def el_lastIndexOf(a, term):
    return el_str(a).rfind(el_str(term))


def _fill(count, pad):
    pad = el_str(pad) or '_'
    return ''.join(itertools.islice(itertools.cycle(pad), count))


def _width(length, name):
    n = el_int(length)
    if n < 0:
        raise ELInvalidArgument('%s: %d is negative' % (name, n))
    if n > EL_MAX_STRING_LENGTH:
        raise ELInvalidArgument('%s: width %d exceeds the limit of %d' % (name, n, EL_MAX_STRING_LENGTH))
    return n


def el_padLeft(a, length, pad='_'):
    s = el_str(a)
    n = _width(length, 'padLeft')
    return s if len(s) >= n else _fill(n - len(s), pad) + s


def el_padRight(a, length, pad='_'):
    s = el_str(a)
    n = _width(length, 'padRight')
    return s if len(s) >= n else s + _fill(n - len(s), pad)


def el_repeat(a, low, high=None):
    lo = el_int(low)
    hi = lo if high is None else el_int(high)
    if lo < 0 or hi < lo:
        raise ELInvalidArgument('invalid repeat bounds %d..%d' % (lo, hi))
    s = el_str(a)
    if len(s.encode('utf-8')) * hi > EL_MAX_STRING_LENGTH:
        raise ELInvalidArgument('repeat: result exceeds the limit of %d' % EL_MAX_STRING_LENGTH)
    return s * (lo if lo == hi else _random.randint(lo, hi))


def el_getDelimitedField(a, index, delimiter=',', quote='"', escape='\\', strip=False):
    s, i = el_str(a), el_int(index)
    if i < 1:
        raise ELInvalidArgument('field index must be at least 1')
    delimiter, quote, escape = el_str(delimiter), el_str(quote), el_str(escape)
    strip = el_bool(strip)
    fields, current, quoted, k = [], [], False, 0
    while k < len(s):
        c = s[k]
        if escape and c == escape and k + 1 < len(s):
            if not strip:
                current.append(c)
            current.append(s[k + 1])
            k += 2
            continue
        if quote and c == quote:
            quoted = not quoted
            if not strip:
                current.append(c)
        elif not quoted and delimiter and s.startswith(delimiter, k):
            fields.append(''.join(current))
            current = []
            k += len(delimiter)
            continue
        else:
            current.append(c)
        k += 1
    fields.append(''.join(current))
    return fields[i - 1] if i <= len(fields) else ''


def el_isEmpty(a):
    return el_str(a).strip() == ''


def el_equalsIgnoreCase(a, b):
    return el_str(a).lower() == el_str(b).lower()


def el_in(a, *values):
    s = el_str(a)
    return any(s == el_str(v) for v in values)


def el_matches(a, pattern):
    return _regex(pattern).fullmatch(el_str(a)) is not None


def el_find(a, pattern):
    return _regex(pattern).search(el_str(a)) is not None


def el_and(a, b):
    x, y = el_bool(a), el_bool(b)
    return x and y


def el_or(a, b):
    x, y = el_bool(a), el_bool(b)
    return x or y


def el_ifElse(a, then, otherwise):
    return then if el_bool(a) else otherwise


def el_base64Encode(a):
    return base64.b64encode(el_str(a).encode('utf-8')).decode('ascii')


def el_base64Decode(a):
    try:
        return base64.b64decode(el_str(a), validate=True).decode('utf-8', errors='replace')
    except ValueError as e:
        raise ELInvalidArgument('invalid base64: %s' % e)


def el_escapeJson(a):
    return json.dumps(el_str(a), ensure_ascii=False)[1:-1]


def el_unescapeJson(a):
    try:
        return json.loads('"%s"' % el_str(a))
    except ValueError as e:
        raise ELInvalidArgument('invalid JSON string: %s' % e)


def el_isJson(a):
    try:
        json.loads(el_str(a).strip())
        return True
    except ValueError:
        return False


def el_allAttributes(attributes, *names):
    return [attributes.get(el_str(n)) for n in names]


el_anyAttribute = el_allAttributes


def el_allMatchingAttributes(attributes, *patterns):
    regexes = [_regex(p) for p in patterns]
    return [attributes[k] for k in sorted(attributes) if any(r.fullmatch(k) for r in regexes)]


el_anyMatchingAttribute = el_allMatchingAttributes


def el_allDelineatedValues(attributes, value, delimiter):
    return el_str(value).split(el_str(delimiter)) if el_str(delimiter) else [el_str(value)]


el_anyDelineatedValue = el_allDelineatedValues


def el_join(a, delimiter):
    if isinstance(a, list):
        return el_str(delimiter).join(el_str(v) for v in a)
    return el_str(a)


def el_count(a):
    return len(a) if isinstance(a, list) else 1


def el_random():
    return _random.getrandbits(63)


def el_nextInt():
    return next(_next_int)


def el_hostname(fqdn=False):
    return socket.getfqdn() if el_bool(fqdn) else socket.gethostname()


def el_thread():
    return threading.current_thread().name


def el_now():
    now = datetime.now(timezone.utc)
    return now.replace(microsecond=now.microsecond // 1000 * 1000)


def el_epoch_ms(dt):
    delta = dt - datetime(1970, 1, 1, tzinfo=timezone.utc)
    return (delta.days * 86400 + delta.seconds) * 1000 + delta.microseconds // 1000


def el_tz(name):
    if name is None:
        return EL_DEFAULT_TZ
    s = el_str(name).strip()
    if s in ('UTC', 'GMT', 'Z'):
        return timezone.utc
    m = re.fullmatch(r'(?:GMT|UTC)?([+-])(\d{1,2}):?(\d{2})?', s, re.ASCII)
    if not m:
        raise ELInvalidArgument('unknown time zone %r' % s)
    offset = timedelta(hours=int(m.group(2)), minutes=int(m.group(3) or 0))
    return timezone(offset if m.group(1) == '+' else -offset)


def _to_datetime(a, allow_iso=False):
    if isinstance(a, datetime):
        return a
    if isinstance(a, (int, float)) and not isinstance(a, bool):
        return datetime(1970, 1, 1, tzinfo=timezone.utc) + timedelta(milliseconds=int(a))
    s = el_str(a).strip()
    if _INT_RE.fullmatch(s):
        return datetime(1970, 1, 1, tzinfo=timezone.utc) + timedelta(milliseconds=int(s))
    if allow_iso:
        try:
            return datetime.fromisoformat(s.replace('Z', '+00:00')).astimezone(timezone.utc)
        except ValueError:
            pass
    raise ELTypeCoercionError('cannot convert %r to a date' % (s,))


def el_strftime(dt, pattern, tz):
    local = dt.astimezone(tz)
    ms = local.microsecond // 1000
    pattern = (pattern.replace('%3f', '%03d' % ms)
               .replace('%6f', '%03d000' % ms)
               .replace('%9f', '%03d000000' % ms))
    text = local.strftime(pattern)
    return text.replace('UTC+00:00', 'UTC')


def el_format(a, pattern, tz=None):
    return el_strftime(_to_datetime(a), pattern, el_tz(tz))


def el_formatInstant(a, pattern, tz=None):
    return el_strftime(_to_datetime(a, allow_iso=True), pattern, el_tz(tz))


def _parse_date(a, pattern, tz):
    if pattern is None:
        if isinstance(a, (datetime, int, float)) and not isinstance(a, bool):
            return _to_datetime(a)
        s = el_str(a).strip()
        if _INT_RE.fullmatch(s):
            return _to_datetime(s)
        pattern = EL_DEFAULT_HOST_PATTERN
    s = el_str(a).strip()
    zone = el_tz(tz)
    host = pattern.replace('%3f', '%f').replace('%-', '%')
    attempts = [(s, host)]
    label = re.search(r'(?:UTC|GMT)(?:[+-][0-9:]*)?', s) if '%Z' in host else None
    if label:
        try:
            offset = _offset_text(el_tz(label.group(0)))
            attempts.insert(0, (s[:label.start()] + offset + s[label.end():], host.replace('%Z', '%z')))
        except ELInvalidArgument:
            pass
    parsed, error = None, None
    for text, fmt in attempts:
        try:
            parsed = datetime.strptime(text, fmt)
            break
        except ValueError as e:
            error = error or e
    if parsed is None:
        raise ELTypeCoercionError('cannot parse %r as a date: %s' % (s, error))
    if parsed.tzinfo is None:
        parsed = parsed.replace(tzinfo=zone)
    return parsed.astimezone(timezone.utc)


def _offset_text(tz):
    minutes = int(tz.utcoffset(None).total_seconds()) // 60
    sign = '-' if minutes < 0 else '+'
    return '%s%02d:%02d' % (sign, abs(minutes) // 60, abs(minutes) % 60)


def el_toDate(a, pattern=None, tz=None):
    return _parse_date(a, pattern, tz)


def el_toInstant(a, pattern=None, tz=None):
    return _parse_date(a, pattern, tz)
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_defines_every_rendered_helper() {
        use crate::catalog::{self, Function, StandaloneFn, StringFn, BooleanFn};

        let prelude = python_prelude();
        let inline = [
            Function::String(StringFn::ToUpper),
            Function::String(StringFn::ToLower),
            Function::String(StringFn::Trim),
            Function::String(StringFn::Length),
            Function::String(StringFn::Append),
            Function::String(StringFn::Prepend),
            Function::String(StringFn::EvaluateElString),
            Function::Boolean(BooleanFn::IsNull),
            Function::Boolean(BooleanFn::NotNull),
            Function::Boolean(BooleanFn::Equals),
            Function::Boolean(BooleanFn::Contains),
            Function::Boolean(BooleanFn::StartsWith),
            Function::Boolean(BooleanFn::EndsWith),
            Function::Boolean(BooleanFn::Not),
            Function::Standalone(StandaloneFn::Uuid),
            Function::Standalone(StandaloneFn::Literal),
        ];

        for sig in catalog::all_signatures().iter().filter(|s| s.supported) {
            if inline.contains(&sig.function) {
                continue;
            }
            let def = format!("def el_{}(", sig.name);
            let alias = format!("el_{} = ", sig.name);
            assert!(
                prelude.contains(&def) || prelude.contains(&alias),
                "prelude lacks helper for {}",
                sig.name
            );
        }
    }

    #[test]
    fn test_prelude_carries_string_limit() {
        let prelude = python_prelude();
        assert!(!prelude.contains("@MAX_STRING_LENGTH@"));
        assert!(prelude.contains(&format!("EL_MAX_STRING_LENGTH = {}", MAX_STRING_LENGTH)));
    }
}

//! CSV parser for pickup/dropoff flow exports.
//!
//! Turns delimited text with a header row into [`RawRow`] mappings, inferring
//! numbers the same way a spreadsheet would: plain decimal tokens become
//! [`Value::Number`], empty cells become [`Value::Null`], the rest stays text.

use std::collections::HashMap;

use csv::ReaderBuilder;
use tracing::{debug, error};

/// A single scalar cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Number(f64),
    Text(String),
}

impl Value {
    fn infer(token: &str) -> Self {
        if token.is_empty() {
            return Value::Null;
        }
        if looks_numeric(token) {
            if let Ok(n) = token.trim().parse::<f64>() {
                if n.is_finite() {
                    return Value::Number(n);
                }
            }
        }
        Value::Text(token.to_string())
    }

    /// `false` for nulls and blank text.
    pub fn is_populated(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Number(_) => true,
            Value::Text(s) => !s.trim().is_empty(),
        }
    }

    /// Reads the value as a finite float. Text is trimmed and parsed.
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            Value::Null => return None,
            Value::Number(n) => *n,
            Value::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        n.is_finite().then_some(n)
    }

    /// Reads the value as an identifier. Integral numbers drop their fraction.
    pub fn as_id(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            Value::Number(n) => Some(n.to_string()),
            Value::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
        }
    }
}

/// Plain decimal with optional sign, fraction and exponent. Rejects words such
/// as `NaN` or `inf` that `f64::from_str` would otherwise accept.
fn looks_numeric(token: &str) -> bool {
    let t = token.trim();
    let body = t.strip_prefix('-').unwrap_or(t);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };
    let mut digits = 0;
    let mut dots = 0;
    for c in mantissa.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    if digits == 0 || dots > 1 {
        return false;
    }
    match exponent {
        None => true,
        Some(e) => {
            let e = e.strip_prefix(['+', '-']).unwrap_or(e);
            !e.is_empty() && e.chars().all(|c| c.is_ascii_digit())
        }
    }
}

/// One CSV record keyed by header name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    fields: HashMap<String, Value>,
}

impl RawRow {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    /// Builds a row from text cells, applying the same type inference as the parser.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let fields = iter
            .into_iter()
            .map(|(k, v)| {
                let v: String = v.into();
                (k.into(), Value::infer(&v))
            })
            .collect();
        RawRow { fields }
    }
}

/// Rows parsed so far, plus the error that stopped parsing, if any.
#[derive(Debug)]
pub struct ParseOutcome {
    pub rows: Vec<RawRow>,
    pub error: Option<csv::Error>,
}

/// Parses CSV text with a header row.
///
/// A malformed record ends parsing; the error is logged and returned next to
/// every row read before it.
pub fn parse_csv(text: &str) -> ParseOutcome {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(h) => h.iter().map(|s| s.trim().to_string()).collect::<Vec<_>>(),
        Err(e) => {
            error!(error = %e, "Error parsing CSV header");
            return ParseOutcome {
                rows: Vec::new(),
                error: Some(e),
            };
        }
    };

    let mut rows = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => {
                let fields = headers
                    .iter()
                    .zip(record.iter())
                    .map(|(h, v)| (h.clone(), Value::infer(v)))
                    .collect();
                rows.push(RawRow { fields });
            }
            Err(e) => {
                error!(error = %e, parsed = rows.len(), "Error parsing CSV");
                return ParseOutcome {
                    rows,
                    error: Some(e),
                };
            }
        }
    }

    debug!(rows = rows.len(), columns = headers.len(), "CSV data parsed");
    ParseOutcome { rows, error: None }
}

use serde_json::Value;

// Outcome of scanning a gateway data blob for the operation marker. An
// unconfirmed signal is not a failure of the invocation, only the absence
// of a positive confirmation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuccessSignal {
    Confirmed,
    Unconfirmed,
}

impl SuccessSignal {
    pub fn is_confirmed(self) -> bool {
        matches!(self, SuccessSignal::Confirmed)
    }
}

// The gateway body is not valid JSON as a whole: free-form diagnostic text
// is interleaved with single-line JSON fragments. Each line that looks like
// a fragment is parsed on its own; lines that fail to parse are skipped
// rather than failing the scan. The first array whose leading element
// carries the gateway's native flag `sukses` as the string "1" confirms the
// operation, and scanning stops there.
pub fn parse_success_signal(raw: &str) -> SuccessSignal {
    for line in raw.lines() {
        let line = line.trim();
        if !(line.starts_with('[') || line.starts_with('{')) {
            continue;
        }
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(_) => continue,
        };
        if line_confirms(&value) {
            return SuccessSignal::Confirmed;
        }
    }
    SuccessSignal::Unconfirmed
}

fn line_confirms(value: &Value) -> bool {
    let first = match value.as_array().and_then(|items| items.first()) {
        Some(first) => first,
        None => return false,
    };
    matches!(first.get("sukses").and_then(Value::as_str), Some("1"))
}

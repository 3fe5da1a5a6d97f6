//! Append-only record of every outbound request and its response. Pure
//! bookkeeping; telemetry lines are best-effort and never load-bearing.

use indexmap::IndexMap;

use crate::typing::Value;

pub type Payload = IndexMap<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RequestAction {
    Deploy,
    Declare,
    Invoke,
    Call,
}

impl RequestAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestAction::Deploy => "DEPLOY",
            RequestAction::Declare => "DECLARE",
            RequestAction::Invoke => "INVOKE",
            RequestAction::Call => "CALL",
        }
    }
}

impl std::fmt::Display for RequestAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response slot of a record: opened requests are `InFlight` until completed
/// exactly once. An in-flight record in a final snapshot means "attempted,
/// outcome unknown".
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum RequestOutcome {
    InFlight,
    Completed(Payload),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RequestRecord {
    pub action: RequestAction,
    pub payload: Payload,
    pub outcome: RequestOutcome,
}

impl RequestRecord {
    pub fn response(&self) -> Option<&Payload> {
        match &self.outcome {
            RequestOutcome::InFlight => None,
            RequestOutcome::Completed(payload) => Some(payload),
        }
    }
}

/// One-shot completion handle returned by [`RequestLedger::begin`]. Not
/// cloneable; completing consumes it, so a record transitions at most once.
#[derive(Debug)]
pub struct OpenRequest {
    index: usize,
}

#[derive(Debug, Default)]
pub struct RequestLedger {
    records: Vec<RequestRecord>,
}

impl RequestLedger {
    pub fn new() -> Self {
        RequestLedger::default()
    }

    pub fn begin(&mut self, action: RequestAction, payload: Payload) -> OpenRequest {
        emit(action, "OUT", &payload);
        let index = self.records.len();
        self.records.push(RequestRecord { action, payload, outcome: RequestOutcome::InFlight });
        OpenRequest { index }
    }

    pub fn complete(&mut self, request: OpenRequest, response: Payload) {
        if let Some(record) = self.records.get_mut(request.index) {
            emit(record.action, "IN", &response);
            record.outcome = RequestOutcome::Completed(response);
        }
    }

    /// Defensive copy of the whole history; callers cannot mutate ledger
    /// state through it.
    pub fn snapshot(&self) -> Vec<RequestRecord> {
        self.records.clone()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn emit(action: RequestAction, direction: &str, payload: &Payload) {
    tracing::info!(
        %action,
        direction,
        payload = %serde_json::to_string(payload).unwrap_or_default(),
        "gateway request"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(key: &str, value: &str) -> Payload {
        let mut map = Payload::new();
        map.insert(key.to_string(), Value::string(value));
        map
    }

    #[test]
    fn begin_opens_an_in_flight_record() {
        let mut ledger = RequestLedger::new();
        let _open = ledger.begin(RequestAction::Deploy, payload("contract", "./build/main.json"));
        let records = ledger.snapshot();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, RequestAction::Deploy);
        assert_eq!(records[0].outcome, RequestOutcome::InFlight);
        assert!(records[0].response().is_none());
    }

    #[test]
    fn complete_fills_the_response_once() {
        let mut ledger = RequestLedger::new();
        let open = ledger.begin(RequestAction::Declare, payload("contract", "a.json"));
        ledger.complete(open, payload("code", "TRANSACTION_RECEIVED"));
        let records = ledger.snapshot();
        let response = records[0].response().unwrap();
        assert_eq!(response.get("code"), Some(&Value::string("TRANSACTION_RECEIVED")));
    }

    #[test]
    fn snapshot_is_a_defensive_copy() {
        let mut ledger = RequestLedger::new();
        let open = ledger.begin(RequestAction::Call, payload("fn", "get_balance"));
        let mut stolen = ledger.snapshot();
        stolen[0].payload.insert("fn".to_string(), Value::string("tampered"));
        ledger.complete(open, payload("result", "0x0"));
        let records = ledger.snapshot();
        assert_eq!(records[0].payload.get("fn"), Some(&Value::string("get_balance")));
        assert!(records[0].response().is_some());
    }

    #[test]
    fn records_keep_submission_order() {
        let mut ledger = RequestLedger::new();
        let first = ledger.begin(RequestAction::Deploy, payload("contract", "a.json"));
        let second = ledger.begin(RequestAction::Invoke, payload("fn", "transfer"));
        // completion order does not reorder history
        ledger.complete(second, payload("hash", "0x2"));
        ledger.complete(first, payload("hash", "0x1"));
        let actions: Vec<_> = ledger.snapshot().iter().map(|r| r.action).collect();
        assert_eq!(actions, vec![RequestAction::Deploy, RequestAction::Invoke]);
    }
}

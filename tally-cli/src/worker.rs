use tally_interpret::{InterpretError, Interpreter, ParsedTransaction};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct InterpretRequest {
    pub request_id: u64,
    pub text: String,
}

#[derive(Debug)]
pub struct InterpretEvent {
    pub request_id: u64,
    pub result: Result<ParsedTransaction, InterpretError>,
}

/// Serve requests one at a time until either channel closes. The shell only
/// sends a new request after the previous event came back.
pub async fn run_worker<I: Interpreter>(
    interpreter: I,
    mut rx: mpsc::UnboundedReceiver<InterpretRequest>,
    tx: mpsc::UnboundedSender<InterpretEvent>,
) {
    while let Some(req) = rx.recv().await {
        tracing::debug!(request_id = req.request_id, "interpreting");
        let result = interpreter.interpret(&req.text).await;
        let event = InterpretEvent {
            request_id: req.request_id,
            result,
        };
        if tx.send(event).is_err() {
            break;
        }
    }
}

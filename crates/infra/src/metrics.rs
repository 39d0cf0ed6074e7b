use prometheus::{IntCounter, Registry, TextEncoder};

/// Process metrics behind an explicit registry. Passed as a dependency to
/// the components that record into it; nothing reaches for a global.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub inbound_messages_processed: IntCounter,
    pub llm_requests: IntCounter,
    pub reminders_sent: IntCounter,
    pub reminder_send_failures: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let inbound_messages_processed = IntCounter::new(
            "lembra_inbound_messages_processed_total",
            "Inbound provider messages that entered the pipeline",
        )
        .expect("valid metric definition");
        let llm_requests = IntCounter::new(
            "lembra_llm_requests_total",
            "Classification calls issued to the configured LLM",
        )
        .expect("valid metric definition");
        let reminders_sent = IntCounter::new(
            "lembra_reminders_sent_total",
            "Reminder notifications accepted by the provider",
        )
        .expect("valid metric definition");
        let reminder_send_failures = IntCounter::new(
            "lembra_reminder_send_failures_total",
            "Reminder notifications the provider rejected",
        )
        .expect("valid metric definition");

        for metric in [
            &inbound_messages_processed,
            &llm_requests,
            &reminders_sent,
            &reminder_send_failures,
        ] {
            registry
                .register(Box::new(metric.clone()))
                .expect("metric registers once");
        }

        Self {
            registry,
            inbound_messages_processed,
            llm_requests,
            reminders_sent,
            reminder_send_failures,
        }
    }

    /// Prometheus text exposition of everything in the registry
    pub fn export(&self) -> String {
        TextEncoder::new()
            .encode_to_string(&self.registry.gather())
            .unwrap_or_default()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

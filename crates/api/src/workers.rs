use crate::shared::fmt::format_event_time;
use chrono::Duration;
use lembra_domain::{Event, EventStatus, EventWithUser, User};
use lembra_infra::LembraContext;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{watch, Notify};
use tracing::{error, info};

/// How far ahead of their ideal fire moment events are pre-selected
const LOOKAHEAD_MINUTES: i64 = 30;

/// Periodic loop that selects due reminders, sends them over the messaging
/// provider and updates the per-event bookkeeping. Runs in parallel with the
/// HTTP server and exits when its stop channel or the process-wide shutdown
/// signal fires, whichever happens first.
pub struct ReminderWorker {
    ctx: LembraContext,
    tick_interval: std::time::Duration,
    stop: Notify,
    stopped: AtomicBool,
}

impl ReminderWorker {
    pub fn new(ctx: LembraContext) -> Self {
        let tick_interval = ctx.config.reminder_tick;
        Self {
            ctx,
            tick_interval,
            stop: Notify::new(),
            stopped: AtomicBool::new(false),
        }
    }

    pub async fn start(&self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        info!(
            "Starting reminder worker with tick interval: {:?}",
            self.tick_interval
        );
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.run_tick(&mut shutdown).await;
                    if self.stopped.load(Ordering::SeqCst) {
                        info!("Reminder worker stopped");
                        return Ok(());
                    }
                }
                _ = self.stop.notified() => {
                    info!("Reminder worker stopped");
                    return Ok(());
                }
                _ = shutdown.changed() => {
                    info!("Reminder worker stopped by shutdown signal");
                    return Ok(());
                }
            }
        }
    }

    /// Wakes the worker out of its loop; an in-flight event is finished
    /// first, remaining candidates defer to the next start.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.stop.notify_one();
    }

    /// One batch, still listening for stop/shutdown: a signal arriving
    /// mid-batch lets the in-flight event complete and skips the rest.
    async fn run_tick(&self, shutdown: &mut watch::Receiver<bool>) {
        let batch = self.process_due_reminders();
        tokio::pin!(batch);
        loop {
            if self.stopped.load(Ordering::SeqCst) {
                (&mut batch).await;
                return;
            }
            tokio::select! {
                _ = &mut batch => return,
                _ = self.stop.notified() => {
                    self.stopped.store(true, Ordering::SeqCst);
                }
                _ = shutdown.changed() => {
                    self.stopped.store(true, Ordering::SeqCst);
                }
            }
        }
    }

    async fn process_due_reminders(&self) {
        let now = self.ctx.sys.now();
        let due = self
            .ctx
            .repos
            .events
            .find_pending_reminders(now, Duration::minutes(LOOKAHEAD_MINUTES))
            .await;
        if due.is_empty() {
            return;
        }

        info!("Processing due reminders, count: {}", due.len());
        for pending in due {
            if self.stopped.load(Ordering::SeqCst) {
                info!("Stop requested, deferring remaining reminders to the next start");
                return;
            }
            if let Err(e) = self.process_event_reminder(&pending).await {
                error!(
                    "Failed to process reminder for event: {} user: {}: {:?}",
                    pending.event.id, pending.user.wa_number, e
                );
            }
        }
    }

    async fn process_event_reminder(&self, pending: &EventWithUser) -> anyhow::Result<()> {
        let now = self.ctx.sys.now();

        // The scan pre-selects near-future events; send only once the
        // moment has actually arrived.
        if !pending.event.is_reminder_due(now) {
            return Ok(());
        }

        // Fresh read: the user may have canceled, or a concurrent worker
        // may have notified, since the scan.
        let Some(mut event) = self.ctx.repos.events.find(&pending.event.id).await else {
            return Ok(());
        };
        if event.is_terminal() || event.cap_reached() || !event.frequency_gate_open(now) {
            return Ok(());
        }

        let message = if event.require_confirmation && event.status == EventStatus::Scheduled {
            build_confirmation_message(&event, &pending.user)
        } else {
            build_reminder_message(&event, &pending.user, now)
        };

        if let Err(e) = self
            .ctx
            .services
            .whatsapp
            .send_text(&pending.user.wa_number, &message)
            .await
        {
            // Bookkeeping untouched: the next tick retries once the
            // frequency gate reopens, as long as the cap allows.
            self.ctx.metrics.reminder_send_failures.inc();
            return Err(e);
        }

        event.register_notification(now);
        event.updated_at = now;
        self.ctx.repos.events.save(&event).await?;
        self.ctx.metrics.reminders_sent.inc();

        info!(
            "Sent reminder for event: {} to: {}, notifications sent: {}/{}",
            event.id, pending.user.wa_number, event.notifications_sent, event.max_notifications
        );
        Ok(())
    }
}

fn build_reminder_message(
    event: &Event,
    user: &User,
    now: chrono::DateTime<chrono::Utc>,
) -> String {
    let mut parts = vec![
        "⏰ *Lembrete de Compromisso*".to_string(),
        format!("📅 {}", event.title),
        format!("🕐 {}", format_event_time(event.starts_at, user)),
    ];

    if let Some(location) = &event.location {
        parts.push(format!("📍 {}", location));
    }

    let time_until = event.starts_at - now;
    if time_until > Duration::zero() {
        if time_until < Duration::hours(1) {
            parts.push(format!("⏱️ Começa em {} minutos", time_until.num_minutes()));
        } else {
            parts.push(format!("⏱️ Começa em {} horas", time_until.num_hours()));
        }
    }

    parts.join("\n")
}

fn build_confirmation_message(event: &Event, user: &User) -> String {
    let mut parts = vec![
        "❓ *Confirmação de Compromisso*".to_string(),
        format!("📅 {}", event.title),
        format!("🕐 {}", format_event_time(event.starts_at, user)),
    ];

    if let Some(location) = &event.location {
        parts.push(format!("📍 {}", location));
    }

    parts.push(String::new());
    parts.push("Por favor, confirme sua presença:".to_string());
    parts.push("✅ Responda 'OK' ou 'Confirmo' para confirmar".to_string());
    parts.push("❌ Responda 'Cancelar' para cancelar".to_string());

    parts.join("\n")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_helpers::{seed_user, setup, TestHarness};
    use chrono::{DateTime, Utc};
    use lembra_domain::ID;
    use std::sync::atomic::Ordering as AtomicOrdering;
    use std::sync::Arc;

    fn reminder_event(user_id: &ID, t0: DateTime<Utc>) -> Event {
        Event {
            id: Default::default(),
            user_id: user_id.clone(),
            title: "dentista".into(),
            location: None,
            starts_at: t0 + Duration::minutes(30),
            remind_before_minutes: 30,
            remind_frequency_minutes: 15,
            require_confirmation: false,
            max_notifications: 2,
            status: EventStatus::Scheduled,
            notifications_sent: 0,
            last_notified_at: None,
            created_at: t0,
            updated_at: t0,
        }
    }

    async fn seed(harness: &TestHarness, event: &Event) {
        harness.ctx.repos.events.insert(event).await.unwrap();
    }

    #[actix_web::test]
    async fn paces_and_caps_notifications() {
        let harness = setup();
        let user = seed_user(&harness.ctx, "+5511999999999", "America/Sao_Paulo").await;
        let t0 = harness.ctx.sys.now();
        let event = reminder_event(&user.id, t0);
        seed(&harness, &event).await;

        let worker = ReminderWorker::new(harness.ctx.clone());

        // first tick at the ideal fire moment
        worker.process_due_reminders().await;
        assert_eq!(harness.sender.sent_to().len(), 1);
        let stored = harness.ctx.repos.events.find(&event.id).await.unwrap();
        assert_eq!(stored.notifications_sent, 1);
        assert_eq!(stored.last_notified_at, Some(t0));

        // 10 minutes later the frequency gate is still closed
        harness.sys.set(t0 + Duration::minutes(10));
        worker.process_due_reminders().await;
        assert_eq!(harness.sender.sent_to().len(), 1);

        // 16 minutes in, second notification
        harness.sys.set(t0 + Duration::minutes(16));
        worker.process_due_reminders().await;
        assert_eq!(harness.sender.sent_to().len(), 2);
        let stored = harness.ctx.repos.events.find(&event.id).await.unwrap();
        assert_eq!(stored.notifications_sent, 2);

        // cap reached, nothing more is ever sent
        harness.sys.set(t0 + Duration::minutes(31));
        worker.process_due_reminders().await;
        assert_eq!(harness.sender.sent_to().len(), 2);
        let stored = harness.ctx.repos.events.find(&event.id).await.unwrap();
        assert!(stored.notifications_sent <= stored.max_notifications);
    }

    #[actix_web::test]
    async fn single_notification_cap_sends_exactly_once() {
        let harness = setup();
        let user = seed_user(&harness.ctx, "+5511999999999", "UTC").await;
        let t0 = harness.ctx.sys.now();
        let mut event = reminder_event(&user.id, t0);
        event.max_notifications = 1;
        seed(&harness, &event).await;

        let worker = ReminderWorker::new(harness.ctx.clone());
        worker.process_due_reminders().await;
        harness.sys.set(t0 + Duration::minutes(16));
        worker.process_due_reminders().await;

        assert_eq!(harness.sender.sent_to().len(), 1);
    }

    #[actix_web::test]
    async fn past_events_are_never_selected() {
        let harness = setup();
        let user = seed_user(&harness.ctx, "+5511999999999", "UTC").await;
        let t0 = harness.ctx.sys.now();
        let mut event = reminder_event(&user.id, t0);
        event.starts_at = t0 - Duration::minutes(1);
        seed(&harness, &event).await;

        let worker = ReminderWorker::new(harness.ctx.clone());
        worker.process_due_reminders().await;

        assert!(harness.sender.sent_to().is_empty());
    }

    #[actix_web::test]
    async fn zero_lead_time_fires_at_start() {
        let harness = setup();
        let user = seed_user(&harness.ctx, "+5511999999999", "UTC").await;
        let t0 = harness.ctx.sys.now();
        let mut event = reminder_event(&user.id, t0);
        event.starts_at = t0;
        event.remind_before_minutes = 0;
        seed(&harness, &event).await;

        let worker = ReminderWorker::new(harness.ctx.clone());
        worker.process_due_reminders().await;

        assert_eq!(harness.sender.sent_to().len(), 1);
    }

    #[actix_web::test]
    async fn near_future_candidates_wait_for_their_moment() {
        let harness = setup();
        let user = seed_user(&harness.ctx, "+5511999999999", "UTC").await;
        let t0 = harness.ctx.sys.now();
        let mut event = reminder_event(&user.id, t0);
        // due in 5 minutes, inside the lookahead window
        event.starts_at = t0 + Duration::minutes(35);
        seed(&harness, &event).await;

        let worker = ReminderWorker::new(harness.ctx.clone());
        worker.process_due_reminders().await;
        assert!(harness.sender.sent_to().is_empty());

        harness.sys.set(t0 + Duration::minutes(5));
        worker.process_due_reminders().await;
        assert_eq!(harness.sender.sent_to().len(), 1);
    }

    #[actix_web::test]
    async fn confirmation_prompt_until_confirmed_then_plain_reminder() {
        let harness = setup();
        let user = seed_user(&harness.ctx, "+5511999999999", "UTC").await;
        let t0 = harness.ctx.sys.now();
        let mut event = reminder_event(&user.id, t0);
        event.require_confirmation = true;
        seed(&harness, &event).await;

        let worker = ReminderWorker::new(harness.ctx.clone());
        worker.process_due_reminders().await;

        let sent = harness.sender.sent_to();
        assert!(sent[0].1.contains("Confirmação de Compromisso"));
        assert!(sent[0].1.contains("Responda 'OK' ou 'Confirmo' para confirmar"));

        // the user confirmed; the next notification is a plain reminder
        let mut stored = harness.ctx.repos.events.find(&event.id).await.unwrap();
        stored.status = EventStatus::Confirmed;
        harness.ctx.repos.events.save(&stored).await.unwrap();

        harness.sys.set(t0 + Duration::minutes(16));
        worker.process_due_reminders().await;

        let sent = harness.sender.sent_to();
        assert_eq!(sent.len(), 2);
        assert!(sent[1].1.contains("Lembrete de Compromisso"));
        assert!(!sent[1].1.contains("Confirmação"));
    }

    #[actix_web::test]
    async fn failed_send_leaves_bookkeeping_untouched_and_retries() {
        let harness = setup();
        let user = seed_user(&harness.ctx, "+5511999999999", "UTC").await;
        let t0 = harness.ctx.sys.now();
        let event = reminder_event(&user.id, t0);
        seed(&harness, &event).await;

        harness.sender.fail_next.store(true, AtomicOrdering::SeqCst);
        let worker = ReminderWorker::new(harness.ctx.clone());
        worker.process_due_reminders().await;

        assert!(harness.sender.sent_to().is_empty());
        let stored = harness.ctx.repos.events.find(&event.id).await.unwrap();
        assert_eq!(stored.notifications_sent, 0);
        assert_eq!(stored.last_notified_at, None);

        // next tick retries and succeeds
        harness.sys.set(t0 + Duration::minutes(1));
        worker.process_due_reminders().await;
        assert_eq!(harness.sender.sent_to().len(), 1);
        let stored = harness.ctx.repos.events.find(&event.id).await.unwrap();
        assert_eq!(stored.notifications_sent, 1);
    }

    #[actix_web::test]
    async fn event_canceled_after_selection_is_not_notified() {
        let harness = setup();
        let user = seed_user(&harness.ctx, "+5511999999999", "UTC").await;
        let t0 = harness.ctx.sys.now();
        let event = reminder_event(&user.id, t0);
        seed(&harness, &event).await;

        // cancel lands between selection and send; the stale aggregate
        // still carries status scheduled
        let stale = EventWithUser {
            event: event.clone(),
            user: user.clone(),
        };
        let mut canceled = event.clone();
        canceled.status = EventStatus::Canceled;
        harness.ctx.repos.events.save(&canceled).await.unwrap();

        let worker = ReminderWorker::new(harness.ctx.clone());
        worker.process_event_reminder(&stale).await.unwrap();

        assert!(harness.sender.sent_to().is_empty());
    }

    #[actix_web::test]
    async fn start_exits_on_stop_and_on_shutdown() {
        let harness = setup();

        let worker = Arc::new(ReminderWorker::new(harness.ctx.clone()));
        let (_tx, rx) = watch::channel(false);
        let handle = {
            let worker = worker.clone();
            tokio::spawn(async move { worker.start(rx).await })
        };
        worker.stop();
        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("worker exits after stop")
            .unwrap()
            .unwrap();

        let worker = Arc::new(ReminderWorker::new(harness.ctx.clone()));
        let (tx, rx) = watch::channel(false);
        let handle = {
            let worker = worker.clone();
            tokio::spawn(async move { worker.start(rx).await })
        };
        tx.send(true).unwrap();
        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("worker exits after shutdown signal")
            .unwrap()
            .unwrap();
    }
}

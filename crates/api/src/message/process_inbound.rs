use crate::event::{
    CancelEventUseCase, ConfirmEventUseCase, CreateEventUseCase, ListEventsUseCase,
    UpdateEventUseCase,
};
use crate::shared::fmt::format_event_time;
use crate::shared::usecase::{execute, UseCase};
use chrono::{DateTime, Utc};
use lembra_domain::{
    InboundMessage, Intent, IntentEnvelope, ParsedMessage, User,
};
use lembra_infra::{prompts, LembraContext, LlmConfigError};
use tracing::{error, info};

const REPLY_SMALL_TALK: &str = "Olá! Como posso ajudar com seus compromissos hoje?";
const REPLY_UNKNOWN: &str =
    "Desculpe, não consegui entender sua mensagem. Pode tentar novamente?";
const REPLY_NO_EVENTS: &str = "Você não tem nenhum evento agendado.";
const REPLY_UNAVAILABLE: &str =
    "Desculpe, estou com problemas para processar mensagens no momento. Tente novamente mais tarde.";

/// The inbound pipeline: dedup, log, authorize, classify, dispatch, reply.
/// Runs once per message extracted from a webhook payload; a message id that
/// was already logged is a silent success (at most one reply per id).
#[derive(Debug)]
pub struct ProcessInboundMessageUseCase {
    pub message: ParsedMessage,
}

#[derive(Debug, thiserror::Error)]
pub enum UseCaseError {
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[async_trait::async_trait(?Send)]
impl UseCase for ProcessInboundMessageUseCase {
    type Response = ();

    type Error = UseCaseError;

    const NAME: &'static str = "ProcessInboundMessage";

    async fn execute(&mut self, ctx: &LembraContext) -> Result<Self::Response, Self::Error> {
        if ctx.repos.inbound_messages.exists(&self.message.id).await {
            return Ok(());
        }

        // The log row is written before any downstream side effect so the
        // dedup decision is fixed first.
        let now = ctx.sys.now();
        let log_entry = InboundMessage {
            id: Default::default(),
            provider_message_id: self.message.id.clone(),
            from_number: self.message.from.clone(),
            raw_payload: serde_json::to_value(&self.message).map_err(anyhow::Error::from)?,
            processed_at: now,
            created_at: now,
        };
        if !ctx.repos.inbound_messages.insert(&log_entry).await? {
            // A concurrent delivery of the same id owns this message
            return Ok(());
        }
        ctx.metrics.inbound_messages_processed.inc();

        let user = match ctx.repos.users.find_by_wa_number(&self.message.from).await {
            Some(user) => user,
            None => self.provision_user(ctx, now).await?,
        };
        if !user.is_active {
            info!("Dropping message from deactivated user: {}", user.wa_number);
            return Ok(());
        }

        // A populated allow-list restricts who may talk to this agenda; an
        // empty list accepts everyone.
        let allow_list = ctx.repos.allowed_contacts.find_by_user(&user.id).await;
        if !allow_list.is_empty()
            && !allow_list
                .iter()
                .any(|contact| contact.contact_number == self.message.from)
        {
            info!(
                "Dropping message from number not in the allow-list: {}",
                self.message.from
            );
            return Ok(());
        }

        let envelope = match self.classify(ctx, &user).await {
            Ok(envelope) => envelope,
            Err(e) => {
                error!("LLM classification failed: {:?}", e);
                return self.reply(ctx, &user, REPLY_UNAVAILABLE).await;
            }
        };

        if let Some(question) = envelope.follow_up_question.clone() {
            return self.reply(ctx, &user, &question).await;
        }

        self.dispatch(ctx, &user, envelope).await
    }
}

impl ProcessInboundMessageUseCase {
    async fn provision_user(
        &self,
        ctx: &LembraContext,
        now: DateTime<Utc>,
    ) -> Result<User, UseCaseError> {
        let mut user = User::new(
            self.message.from.as_str(),
            ctx.config.default_timezone.as_str(),
            now,
        );
        user.name = self.message.contact_name.clone();
        ctx.repos.users.insert(&user).await?;
        info!("Provisioned user for new number: {}", user.wa_number);
        Ok(user)
    }

    async fn classify(
        &self,
        ctx: &LembraContext,
        user: &User,
    ) -> anyhow::Result<IntentEnvelope> {
        let model = ctx
            .repos
            .llm_configs
            .find_user_config(user)
            .await
            .ok_or(LlmConfigError::NoModelConfigured)?;
        let client = ctx.services.llm_clients.create(&model)?;

        let system_prompt = prompts::build_system_prompt(&user.timezone);
        let user_message =
            prompts::build_user_message(&self.message.from, &self.message.text, user);

        ctx.metrics.llm_requests.inc();
        client.chat(&system_prompt, &user_message).await
    }

    async fn dispatch(
        &self,
        ctx: &LembraContext,
        user: &User,
        envelope: IntentEnvelope,
    ) -> Result<(), UseCaseError> {
        match envelope.intent {
            Intent::CreateEvent => {
                let usecase = CreateEventUseCase {
                    user: user.clone(),
                    entities: envelope.entities,
                };
                match execute(usecase, ctx).await {
                    Ok(event) => {
                        let location = event
                            .location
                            .as_ref()
                            .map(|location| format!(" em {}", location))
                            .unwrap_or_default();
                        let text = format!(
                            "✅ Evento criado: {} em {}{}. Lembrete: {} minutos antes.",
                            event.title,
                            format_event_time(event.starts_at, user),
                            location,
                            event.remind_before_minutes,
                        );
                        self.reply(ctx, user, &text).await
                    }
                    Err(e) => {
                        self.reply(ctx, user, &format!("Erro ao criar evento: {}", e))
                            .await
                    }
                }
            }
            Intent::UpdateEvent => {
                let usecase = UpdateEventUseCase {
                    user_id: user.id.clone(),
                    entities: envelope.entities,
                };
                match execute(usecase, ctx).await {
                    Ok(event) => {
                        let text = format!(
                            "✏️ Evento atualizado: {} em {}",
                            event.title,
                            format_event_time(event.starts_at, user),
                        );
                        self.reply(ctx, user, &text).await
                    }
                    Err(e) => {
                        self.reply(ctx, user, &format!("Erro ao atualizar evento: {}", e))
                            .await
                    }
                }
            }
            Intent::CancelEvent | Intent::DeclineEvent => {
                let Some(identifier) = envelope.entities.identifier else {
                    return self
                        .reply(ctx, user, "Não consegui identificar qual evento cancelar.")
                        .await;
                };
                let usecase = CancelEventUseCase {
                    user_id: user.id.clone(),
                    identifier,
                };
                match execute(usecase, ctx).await {
                    Ok(event) => {
                        self.reply(ctx, user, &format!("❌ Evento cancelado: {}", event.title))
                            .await
                    }
                    Err(e) => {
                        self.reply(ctx, user, &format!("Erro ao cancelar evento: {}", e))
                            .await
                    }
                }
            }
            Intent::ConfirmEvent => {
                let Some(identifier) = envelope.entities.identifier else {
                    return self
                        .reply(ctx, user, "Não consegui identificar qual evento confirmar.")
                        .await;
                };
                let usecase = ConfirmEventUseCase {
                    user_id: user.id.clone(),
                    identifier,
                };
                match execute(usecase, ctx).await {
                    Ok(event) => {
                        self.reply(ctx, user, &format!("✅ Evento confirmado: {}", event.title))
                            .await
                    }
                    Err(e) => {
                        self.reply(ctx, user, &format!("Erro ao confirmar evento: {}", e))
                            .await
                    }
                }
            }
            Intent::ListEvents => {
                let usecase = ListEventsUseCase {
                    user_id: user.id.clone(),
                    range: None,
                };
                let events = match execute(usecase, ctx).await {
                    Ok(events) => events,
                    Err(e) => match e {},
                };
                if events.is_empty() {
                    return self.reply(ctx, user, REPLY_NO_EVENTS).await;
                }

                let mut text = String::from("📅 *Seus próximos eventos:*\n\n");
                for (i, event) in events.iter().take(10).enumerate() {
                    let location = event
                        .location
                        .as_ref()
                        .map(|location| format!(" - {}", location))
                        .unwrap_or_default();
                    text.push_str(&format!(
                        "{}. {}\n📅 {}{}\n\n",
                        i + 1,
                        event.title,
                        format_event_time(event.starts_at, user),
                        location,
                    ));
                }
                self.reply(ctx, user, &text).await
            }
            Intent::SmallTalk => self.reply(ctx, user, REPLY_SMALL_TALK).await,
            Intent::Unknown => self.reply(ctx, user, REPLY_UNKNOWN).await,
        }
    }

    async fn reply(
        &self,
        ctx: &LembraContext,
        user: &User,
        text: &str,
    ) -> Result<(), UseCaseError> {
        ctx.services
            .whatsapp
            .send_text(&user.wa_number, text)
            .await?;
        Ok(())
    }
}

//! Mock chat assistant - the local stand-in for a real agent backend
//!
//! INPUT → EXTRACT → ROUTE → ADVANCE FLOW → QUOTE → PAUSE → REPLY

use crate::classifier::{IntentClassifier, Route};
use crate::config::{AssistantConfig, DEFAULT_USER_ID};
use crate::extractor::Entities;
use crate::flow::{Flow, Reply, Turn};
use crate::models::{ChatResponse, ChatTurn, Intent, SessionContext, SessionSnapshot};
use crate::quote::{Quoter, RandomSource};
use crate::responses;
use crate::state::{ContextStore, InMemoryContextStore, SessionLocks};
use crate::Result;
use std::time::Duration;
use tracing::{debug, info};

/// Artificial latency before each reply: `delay + uniform[0, jitter)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyPacing {
    pub delay: Duration,
    pub jitter: Duration,
}

impl ReplyPacing {
    pub fn new(delay: Duration, jitter: Duration) -> Self {
        Self { delay, jitter }
    }

    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn pause(&self, random: &dyn RandomSource) -> Duration {
        self.delay + self.jitter.mul_f64(random.next_f64())
    }
}

/// Run one turn against a session context. Synchronous and free of I/O;
/// randomness only enters through the quoter.
pub fn respond(ctx: &mut SessionContext, message: &str, quoter: &Quoter) -> (String, Option<Intent>) {
    ctx.record_message(message);

    let entities = Entities::extract(message);
    let route = IntentClassifier::route(message, ctx.intent());

    debug!(
        user_id = %ctx.user_id,
        ?route,
        amounts = ?entities.amounts,
        tokens = ?entities.tokens,
        "Routed chat message"
    );

    match route {
        Route::Help => {
            ctx.reset();
            (responses::help(), None)
        }
        Route::Greeting => (responses::greeting(), ctx.intent()),
        Route::Catalog => (responses::catalog(), None),
        Route::Start(intent) => {
            ctx.flow = Some(Flow::start(intent));
            advance_flow(ctx, message, &entities, quoter)
        }
        Route::Continue(_) => advance_flow(ctx, message, &entities, quoter),
    }
}

fn advance_flow(
    ctx: &mut SessionContext,
    message: &str,
    entities: &Entities,
    quoter: &Quoter,
) -> (String, Option<Intent>) {
    let Some(flow) = ctx.flow.as_mut() else {
        return (responses::catalog(), None);
    };

    let intent = flow.intent();
    let text = match flow.advance(&Turn::new(message, entities)) {
        Reply::Prompt(text) => text,
        Reply::Completed(completion) => quoter.render(&completion, &ctx.user_id),
    };

    debug!(user_id = %ctx.user_id, %intent, step = flow.step(), "Flow advanced");

    // a finished flow releases the session
    if flow.is_completed() {
        ctx.reset();
    }

    (text, Some(intent))
}

/// Rule-based assistant with per-user session state
pub struct MockAssistant {
    store: Box<dyn ContextStore>,
    locks: SessionLocks,
    quoter: Quoter,
    pacing: ReplyPacing,
    default_user_id: String,
}

impl MockAssistant {
    pub fn new(store: Box<dyn ContextStore>, quoter: Quoter, pacing: ReplyPacing) -> Self {
        Self {
            store,
            locks: SessionLocks::new(),
            quoter,
            pacing,
            default_user_id: DEFAULT_USER_ID.to_string(),
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        Self::new(
            Box::new(InMemoryContextStore::new()),
            Quoter::default(),
            config.pacing(),
        )
        .with_default_user(config.default_user_id.clone())
    }

    pub fn with_default_user(mut self, user_id: impl Into<String>) -> Self {
        self.default_user_id = user_id.into();
        self
    }

    pub fn default_user_id(&self) -> &str {
        &self.default_user_id
    }

    /// Handle one user turn. Turns of the same user are serialized;
    /// different users proceed independently.
    pub async fn process_message(
        &self,
        user_id: Option<&str>,
        message: &str,
        prior_turns: &[ChatTurn],
    ) -> Result<ChatResponse> {
        let user_id = user_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.default_user_id)
            .to_string();

        let lock = self.locks.lock_for(&user_id).await;
        let _turn = lock.lock().await;

        if !prior_turns.is_empty() {
            debug!(
                user_id = %user_id,
                prior_turns = prior_turns.len(),
                "Prior turns supplied; session state is authoritative"
            );
        }

        let mut ctx = self
            .store
            .get(&user_id)
            .await?
            .unwrap_or_else(|| SessionContext::new(user_id.clone()));

        let (response, intent) = respond(&mut ctx, message, &self.quoter);
        let step = ctx.step();
        self.store.put(ctx).await?;

        let pause = self.pacing.pause(self.quoter.random());
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        info!(
            user_id = %user_id,
            intent = ?intent,
            step,
            delay_ms = pause.as_millis() as u64,
            "Chat message processed"
        );

        Ok(ChatResponse {
            response,
            user_id,
            intent,
        })
    }

    pub async fn session(&self, user_id: &str) -> Result<Option<SessionSnapshot>> {
        Ok(self
            .store
            .get(user_id)
            .await?
            .as_ref()
            .map(SessionSnapshot::from))
    }

    /// Delete the session and, once no turn is waiting on it, its lock entry.
    pub async fn reset_session(&self, user_id: &str) -> Result<bool> {
        let lock = self.locks.lock_for(user_id).await;
        let removed = {
            let _turn = lock.lock().await;
            self.store.delete(user_id).await?
        };
        drop(lock);
        self.locks.release_idle(user_id).await;
        Ok(removed)
    }
}

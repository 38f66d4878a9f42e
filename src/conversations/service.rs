use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::ai::{build_system_prompt, ChatCompletion, ChatMessage};
use crate::config::FollowUpConfig;
use crate::conversations::{
    Conversation, ConversationError, ConversationRepository, FollowUpReport, Message, MessageRole,
};
use crate::coupons::CouponService;
use crate::customers::CustomerService;
use crate::error::ApiError;
use crate::menu::MenuService;
use crate::phone;
use crate::restaurants::RestaurantService;
use crate::whatsapp::WhatsAppGateway;

/// Messages from the last day make up the model context
const HISTORY_WINDOW_HOURS: i64 = 24;
const HISTORY_LIMIT: i64 = 50;
/// Follow-up coupons expire after a day
const FOLLOW_UP_COUPON_HOURS: i64 = 24;

/// Prompt used when the message names a restaurant we do not know
const FALLBACK_PROMPT: &str = "Você é um atendente virtual de restaurante no WhatsApp. \
Responda em português do Brasil, de forma simpática e curta. \
Você ainda não tem acesso ao cardápio, então peça para o cliente aguardar o atendimento humano.";

/// Transcript sent to the model: system prompt first, then history oldest first
pub fn build_transcript(system_prompt: String, history: &[Message]) -> Vec<ChatMessage> {
    std::iter::once(ChatMessage::system(system_prompt))
        .chain(history.iter().map(ChatMessage::from))
        .collect()
}

pub fn follow_up_message(restaurant_name: &str, code: &str, percent: u32) -> String {
    format!(
        "Oi! Sentimos sua falta no {}. 😊\n\
         Que tal finalizar seu pedido? Use o cupom *{}* e ganhe {}% de desconto. \
         O cupom vale por 24 horas.",
        restaurant_name, code, percent
    )
}

/// WhatsApp assistant conversations
#[derive(Clone)]
pub struct ConversationService {
    repo: ConversationRepository,
    restaurants: RestaurantService,
    menu: MenuService,
    customers: CustomerService,
    coupons: CouponService,
    ai: Arc<dyn ChatCompletion>,
    gateway: Arc<dyn WhatsAppGateway>,
    follow_up: FollowUpConfig,
}

impl ConversationService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repo: ConversationRepository,
        restaurants: RestaurantService,
        menu: MenuService,
        customers: CustomerService,
        coupons: CouponService,
        ai: Arc<dyn ChatCompletion>,
        gateway: Arc<dyn WhatsAppGateway>,
        follow_up: FollowUpConfig,
    ) -> Self {
        Self {
            repo,
            restaurants,
            menu,
            customers,
            coupons,
            ai,
            gateway,
            follow_up,
        }
    }

    /// Active conversation for the phone, created on first contact
    ///
    /// An unknown restaurant yields a temporary, unsaved conversation.
    pub async fn find_or_create_conversation(
        &self,
        restaurant_id: Uuid,
        raw_phone: &str,
    ) -> Result<Conversation, ConversationError> {
        let phone_number = phone::normalize(raw_phone);

        if self.restaurants.find_optional(restaurant_id).await?.is_none() {
            tracing::warn!(
                "Restaurant {} not found, using a temporary conversation for {}",
                restaurant_id,
                phone_number
            );
            return Ok(Conversation::temporary(restaurant_id, &phone_number));
        }

        if let Some(conversation) = self.repo.find_active(restaurant_id, &phone_number).await? {
            return Ok(conversation);
        }

        let customer = self.customers.find_by_phone(restaurant_id, &phone_number).await?;
        let conversation = self
            .repo
            .create(restaurant_id, customer.map(|c| c.id), &phone_number)
            .await?;
        tracing::info!("Started conversation {} with {}", conversation.id, phone_number);
        Ok(conversation)
    }

    /// Stores the customer message, asks the model for a reply, stores and sends it
    ///
    /// `instance_hint` is the instance the webhook came from, used when the restaurant
    /// has none bound. Returns the reply text.
    pub async fn handle_incoming_message(
        &self,
        restaurant_id: Uuid,
        raw_phone: &str,
        text: &str,
        instance_hint: Option<&str>,
    ) -> Result<String, ConversationError> {
        let conversation = self.find_or_create_conversation(restaurant_id, raw_phone).await?;

        if conversation.is_temporary {
            let instance = instance_hint.ok_or(ConversationError::NoInstance)?;
            let reply = self
                .ai
                .complete(&[ChatMessage::system(FALLBACK_PROMPT), ChatMessage::user(text)])
                .await?;
            self.gateway
                .send_text(instance, &conversation.phone_number, &reply)
                .await?;
            return Ok(reply);
        }

        let restaurant = self.restaurants.find_one(restaurant_id).await?;
        let instance = restaurant
            .whatsapp_instance()
            .or(instance_hint)
            .map(str::to_string)
            .ok_or(ConversationError::NoInstance)?;

        self.repo
            .add_message(conversation.id, MessageRole::User, text)
            .await?;
        self.repo.touch(conversation.id, false).await?;

        let since = Utc::now() - Duration::hours(HISTORY_WINDOW_HOURS);
        let history = self
            .repo
            .recent_messages(conversation.id, since, HISTORY_LIMIT)
            .await?;
        let menu = self.menu.menu_for_restaurant(restaurant_id).await?;
        let transcript = build_transcript(build_system_prompt(&restaurant, &menu), &history);

        let reply = self.ai.complete(&transcript).await?;

        self.repo
            .add_message(conversation.id, MessageRole::Assistant, &reply)
            .await?;
        self.repo.touch(conversation.id, true).await?;

        self.gateway
            .send_text(&instance, &conversation.phone_number, &reply)
            .await?;

        tracing::info!(
            "Replied to {} in conversation {} ({} messages of history)",
            conversation.phone_number,
            conversation.id,
            history.len()
        );
        Ok(reply)
    }

    /// Flags idle conversations and sends each a follow-up with a fresh discount coupon
    ///
    /// A failure on one conversation is logged and the sweep moves on.
    pub async fn identify_abandoned_conversations(&self) -> Result<FollowUpReport, ConversationError> {
        let cutoff = Utc::now() - Duration::hours(self.follow_up.abandoned_after_hours);
        let candidates = self.repo.find_abandoned(cutoff).await?;

        let mut report = FollowUpReport {
            candidates: candidates.len(),
            ..Default::default()
        };

        for conversation in &candidates {
            match self.follow_up(conversation).await {
                Ok(true) => report.notified += 1,
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!("Follow-up for conversation {} failed: {}", conversation.id, e);
                }
            }
        }

        if report.candidates > 0 {
            tracing::info!(
                "Follow-up sweep: {} idle conversations, {} notified, {} failed",
                report.candidates,
                report.notified,
                report.failed
            );
        }
        Ok(report)
    }

    async fn follow_up(&self, conversation: &Conversation) -> Result<bool, ConversationError> {
        let Some(restaurant) = self.restaurants.find_optional(conversation.restaurant_id).await? else {
            return Ok(false);
        };

        if !self.repo.mark_follow_up(conversation.id).await? {
            return Ok(false);
        }
        let Some(instance) = restaurant.whatsapp_instance() else {
            tracing::debug!("Restaurant {} has no WhatsApp instance, follow-up skipped", restaurant.id);
            return Ok(false);
        };

        let percent = self.follow_up.discount_percent;
        let coupon = self
            .coupons
            .issue_follow_up_coupon(restaurant.id, percent, Duration::hours(FOLLOW_UP_COUPON_HOURS))
            .await?;
        let text = follow_up_message(&restaurant.name, &coupon.code, percent);

        self.gateway
            .send_text(instance, &conversation.phone_number, &text)
            .await?;
        self.repo
            .add_message(conversation.id, MessageRole::Assistant, &text)
            .await?;

        tracing::info!(
            "Sent follow-up with coupon {} to {}",
            coupon.code,
            conversation.phone_number
        );
        Ok(true)
    }

    pub async fn list(&self, restaurant_id: Uuid) -> Result<Vec<Conversation>, ApiError> {
        Ok(self.repo.find_by_restaurant(restaurant_id).await?)
    }

    pub async fn messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, ApiError> {
        if self.repo.find_by_id(conversation_id).await?.is_none() {
            return Err(ApiError::not_found("Conversation", conversation_id));
        }
        Ok(self.repo.messages(conversation_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ChatRole;

    fn message(role: MessageRole, content: &str) -> Message {
        Message {
            id: Uuid::new_v4(),
            conversation_id: Uuid::new_v4(),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_transcript_starts_with_system_prompt() {
        let history = vec![
            message(MessageRole::User, "Oi"),
            message(MessageRole::Assistant, "Olá! Como posso ajudar?"),
            message(MessageRole::User, "Quero uma pizza"),
        ];
        let transcript = build_transcript("prompt".to_string(), &history);

        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript[0], ChatMessage::system("prompt"));
        assert_eq!(transcript[1].role, ChatRole::User);
        assert_eq!(transcript[2].role, ChatRole::Assistant);
        assert_eq!(transcript[3].content, "Quero uma pizza");
    }

    #[test]
    fn test_follow_up_message_mentions_coupon() {
        let text = follow_up_message("Cantina", "VOLTE7KQ2M", 10);
        assert!(text.contains("Cantina"));
        assert!(text.contains("*VOLTE7KQ2M*"));
        assert!(text.contains("10%"));
    }
}

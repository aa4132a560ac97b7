//! A chat assistant that answers either from the knowledge base or from the conversation so far.

use std::sync::Arc;
use anyhow::Result;
use log::{error, info};

use crate::chain::ConversationChain;
use crate::exemplars::knowledge_base::{knowledge_documents, ASSISTANT_RAG_PROMPT, ASSISTANT_SYSTEM_PROMPT};
use crate::prompt::PromptTemplate;
use crate::utils::embedding::AsyncEmbed;
use crate::utils::llm::ChatModel;
use crate::utils::retrievers::{RetrievalQa, VectorStoreRetriever};
use crate::utils::vec_stores::InMemoryVectorStore;

pub const SESSION_ID: &str = "default_session";
pub const RETRIEVAL_K: usize = 3;

/// One `(user message, assistant reply)` pair of the visible chat log.
pub type ChatTurn = (String, String);

pub struct WorkshopAssistant {
    qa: RetrievalQa,
    conversation: ConversationChain,
}

impl WorkshopAssistant {
    /// Index the knowledge base with `embedder` and answer with `model`.
    pub async fn new(model: Arc<dyn ChatModel>, embedder: Arc<dyn AsyncEmbed>) -> Result<Self> {
        info!("Creating vector store...");
        let store = InMemoryVectorStore::from_documents(knowledge_documents(), embedder).await?;
        let retriever = VectorStoreRetriever::new(Arc::new(store)).with_k(RETRIEVAL_K);
        let qa = RetrievalQa::new(retriever, model.clone())
            .with_prompt(PromptTemplate::new(ASSISTANT_RAG_PROMPT))?;
        let conversation = ConversationChain::new(model, ASSISTANT_SYSTEM_PROMPT);
        Ok(Self { qa, conversation })
    }

    pub fn conversation(&self) -> &ConversationChain {
        &self.conversation
    }

    async fn try_chat(&self, message: &str, use_rag: bool) -> Result<String> {
        if !use_rag {
            return self.conversation.chat(SESSION_ID, message).await;
        }
        let answer = self.qa.query(message).await?;
        let sources = answer.sources();
        let mut response = answer.result.clone();
        if !sources.is_empty() {
            response.push_str(&format!("\n\n*Sources: {}*", sources.join(", ")));
        }
        Ok(response)
    }

    /// Answer `message`. Never fails: errors are turned into an apology.
    pub async fn chat(&self, message: &str, use_rag: bool) -> String {
        match self.try_chat(message, use_rag).await {
            Ok(response) => response,
            Err(e) => {
                error!("chat failed: {:#}", e);
                format!("I apologize, but I encountered an error: {}. Please try again.", e)
            }
        }
    }

    /// Handle a message from the chat box. Returns the new textbox content and chat log.
    ///
    /// A blank message changes nothing.
    pub async fn submit_message(&self, message: String, mut history: Vec<ChatTurn>, use_rag: bool) -> (String, Vec<ChatTurn>) {
        if message.trim().is_empty() {
            return (message, history);
        }
        let response = self.chat(&message, use_rag).await;
        history.push((message, response));
        (String::new(), history)
    }
}

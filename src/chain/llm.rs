use std::sync::Arc;
use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;

use crate::chain::runnable::{Runnable, RunnableStream};
use crate::prompt::chat::ChatPromptTemplate;
use crate::prompt::{PromptTemplate, Vars};
use crate::utils::llm::{ChatModel, Message, TextStream};
use crate::utils::postprocess::{OutputParser, StrOutputParser};

/// The prompt of an [LlmChain].
#[derive(Debug, Clone)]
pub enum Prompt {
    /// Sent as a single human message.
    Text(PromptTemplate),
    Chat(ChatPromptTemplate),
}

impl Prompt {
    pub fn format_messages(&self, vars: &Vars) -> Result<Vec<Message>> {
        match self {
            Prompt::Text(template) => Ok(vec![Message::human(template.format(vars)?)]),
            Prompt::Chat(template) => template.format_messages(vars),
        }
    }
}

impl From<PromptTemplate> for Prompt {
    fn from(template: PromptTemplate) -> Self {
        Prompt::Text(template)
    }
}

impl From<ChatPromptTemplate> for Prompt {
    fn from(template: ChatPromptTemplate) -> Self {
        Prompt::Chat(template)
    }
}

/// prompt, then model, then output parser.
pub struct LlmChain<P = StrOutputParser> {
    pub prompt: Prompt,
    pub model: Arc<dyn ChatModel>,
    pub parser: P,
}

impl LlmChain<StrOutputParser> {
    pub fn new(prompt: impl Into<Prompt>, model: Arc<dyn ChatModel>) -> Self {
        Self::with_parser(prompt, model, StrOutputParser)
    }

    /// Stream the reply text chunk by chunk.
    pub async fn stream_text(&self, vars: &Vars) -> Result<TextStream> {
        let messages = self.prompt.format_messages(vars)?;
        self.model.stream(&messages).await
    }
}

impl<P> LlmChain<P> {
    pub fn with_parser(prompt: impl Into<Prompt>, model: Arc<dyn ChatModel>, parser: P) -> Self {
        Self { prompt: prompt.into(), model, parser }
    }

    /// Cap the length of the replies of this chain.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.model = self.model.with_max_tokens(max_tokens);
        self
    }
}

#[async_trait]
impl<P, O> Runnable<Vars, O> for LlmChain<P>
    where P: OutputParser<O>,
          O: Send + 'static {
    async fn invoke(&self, vars: Vars) -> Result<O> {
        let messages = self.prompt.format_messages(&vars)?;
        let reply = self.model.invoke(&messages).await?;
        self.parser.parse(&reply)
    }

    /// Streams model chunks when the parser can work chunk by chunk, else yields the parsed reply once.
    async fn stream(&self, vars: Vars) -> Result<RunnableStream<O>> {
        let messages = self.prompt.format_messages(&vars)?;
        match self.parser.chunk_parser() {
            Some(parse_chunk) => {
                let chunks = self.model.stream(&messages).await?;
                Ok(chunks.map(move |chunk| chunk.map(parse_chunk)).boxed())
            }
            None => {
                let reply = self.model.invoke(&messages).await?;
                let output = self.parser.parse(&reply)?;
                Ok(futures::stream::once(async move { Ok(output) }).boxed())
            }
        }
    }
}

#[cfg(test)]
mod test_llm_chain {
    use futures::TryStreamExt;
    use serde::Deserialize;
    use super::*;
    use crate::chain::runnable::{Lambda, RunnableExt};
    use crate::demo::{DEFAULT_RESPONSE, HELLO_RESPONSE};
    use crate::prompt::vars;
    use crate::utils::llm::demo::DemoChat;
    use crate::utils::llm::testing::EchoChat;
    use crate::utils::postprocess::structured::{FieldType, StructuredOutputParser};

    #[tokio::test]
    async fn test_prompt_model_parser() {
        let model = Arc::new(EchoChat::default());
        let chain = LlmChain::new(PromptTemplate::new("Explain {{topic}} briefly"), model.clone());
        let reply: String = chain.invoke(vars([("topic", "quantum computing")])).await.unwrap();
        assert_eq!("echo: Explain quantum computing briefly", reply);
        assert_eq!(vec![Message::human("Explain quantum computing briefly")], model.requests.lock()[0]);
    }

    #[tokio::test]
    async fn test_batch_and_two_steps() {
        let model: Arc<dyn ChatModel> = Arc::new(EchoChat::default());
        let define = LlmChain::new(PromptTemplate::new("Define {{concept}} in one sentence"), model.clone());
        let example = LlmChain::new(PromptTemplate::new("Give a real-world example of: {{definition}}"), model);
        let chain = define
            .pipe(Lambda::new(|definition: String| vars([("definition", definition.as_str())])))
            .pipe(example);
        let reply: String = chain.invoke(vars([("concept", "neural networks")])).await.unwrap();
        assert_eq!("echo: Give a real-world example of: echo: Define neural networks in one sentence", reply);

        let replies: Vec<String> = chain.batch(vec![vars([("concept", "a")]), vars([("concept", "b")])]).await.unwrap();
        assert_eq!(2, replies.len());
        assert!(replies[1].ends_with("Define b in one sentence"));
        let missing: Result<String> = chain.invoke(Vars::new()).await;
        assert!(missing.is_err());
    }

    #[tokio::test]
    async fn test_stream_text_and_max_tokens() {
        let chain = LlmChain::new(PromptTemplate::new("Say {{greeting}}"), Arc::new(DemoChat::default()));
        let chunks: Vec<String> = chain.stream_text(&vars([("greeting", "hello")])).await.unwrap().try_collect().await.unwrap();
        assert_eq!(HELLO_RESPONSE, chunks.concat());

        let streamed: Vec<String> = chain.stream(vars([("greeting", "hello")])).await.unwrap().try_collect().await.unwrap();
        assert_eq!(vec![HELLO_RESPONSE.to_string()], streamed);

        let bound = chain.with_max_tokens(3);
        let reply: String = bound.invoke(vars([("greeting", "hello")])).await.unwrap();
        assert_eq!("Hello! I'm a", reply);

        let chat = LlmChain::new(
            ChatPromptTemplate::from_messages(&[("system", "Be terse"), ("human", "{{q}}")]).unwrap(),
            Arc::new(DemoChat::default()),
        );
        let reply: String = chat.invoke(vars([("q", "Capital of France?")])).await.unwrap();
        assert_eq!(DEFAULT_RESPONSE, reply);
    }

    #[tokio::test]
    async fn test_structured_chain() {
        #[derive(Debug, Deserialize)]
        struct Rating {
            rating: i64,
        }
        struct Fixed;
        #[async_trait]
        impl ChatModel for Fixed {
            fn model_name(&self) -> &str {
                "fixed"
            }
            async fn invoke(&self, _messages: &[Message]) -> Result<String> {
                Ok("Here you go: {\"rating\": 4}".to_string())
            }
            fn with_max_tokens(&self, _max_tokens: u32) -> Arc<dyn ChatModel> {
                Arc::new(Fixed)
            }
        }
        let parser = StructuredOutputParser::<Rating>::new().field("rating", FieldType::Integer);
        let chain = LlmChain::with_parser(PromptTemplate::new("Rate {{product}}"), Arc::new(Fixed), parser);
        let rating: Rating = chain.invoke(vars([("product", "iPhone 15")])).await.unwrap();
        assert_eq!(4, rating.rating);
    }
}

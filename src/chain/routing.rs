use std::collections::HashMap;
use std::sync::Arc;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;

use crate::chain::runnable::Runnable;

/// `short` below 50 characters, `medium` below 200, `long` otherwise.
pub fn route_by_length(text: &str) -> &'static str {
    match text.chars().count() {
        0..=49 => "short",
        50..=199 => "medium",
        _ => "long",
    }
}

/// `question` if the text contains `?`, else `exclamation` if it contains `!`, else `statement`.
pub fn route_by_type(text: &str) -> &'static str {
    if text.contains('?') {
        "question"
    } else if text.contains('!') {
        "exclamation"
    } else {
        "statement"
    }
}

type RouteKey<I> = Box<dyn Fn(&I) -> String + Send + Sync>;

/// Sends each input to the route picked by a key function.
pub struct Router<I, O> {
    key: RouteKey<I>,
    routes: HashMap<String, Arc<dyn Runnable<I, O>>>,
    default: Option<Arc<dyn Runnable<I, O>>>,
}

impl<I, O> Router<I, O>
    where I: Send + 'static,
          O: Send + 'static {
    pub fn new(key: impl Fn(&I) -> String + Send + Sync + 'static) -> Self {
        Self {
            key: Box::new(key),
            routes: HashMap::new(),
            default: None,
        }
    }

    pub fn route(mut self, key: impl Into<String>, runnable: impl Runnable<I, O> + 'static) -> Self {
        self.routes.insert(key.into(), Arc::new(runnable));
        self
    }

    /// Used when no route matches the key.
    pub fn default_route(mut self, runnable: impl Runnable<I, O> + 'static) -> Self {
        self.default = Some(Arc::new(runnable));
        self
    }

    /// The route key for `input`.
    pub fn key_of(&self, input: &I) -> String {
        (self.key)(input)
    }
}

#[async_trait]
impl<I, O> Runnable<I, O> for Router<I, O>
    where I: Send + 'static,
          O: Send + 'static {
    async fn invoke(&self, input: I) -> Result<O> {
        let key = (self.key)(&input);
        debug!("routing to {}", key);
        let runnable = self.routes.get(&key)
            .or(self.default.as_ref())
            .ok_or_else(|| anyhow!("no route for key {}", key))?;
        runnable.invoke(input).await
    }
}

#[cfg(test)]
mod test_routing {
    use super::*;
    use crate::chain::runnable::Lambda;

    #[test]
    fn test_route_by_length() {
        assert_eq!("short", route_by_length("AI is cool"));
        assert_eq!("short", route_by_length(&"a".repeat(49)));
        assert_eq!("medium", route_by_length(&"a".repeat(50)));
        assert_eq!("medium", route_by_length("Artificial intelligence is transforming how we work and live in many different ways"));
        assert_eq!("long", route_by_length(&"a".repeat(200)));
        // characters, not bytes
        assert_eq!("short", route_by_length(&"é".repeat(40)));
    }

    #[test]
    fn test_route_by_type() {
        assert_eq!("question", route_by_type("What is AI?"));
        assert_eq!("question", route_by_type("Wow! Really?"));
        assert_eq!("exclamation", route_by_type("AI is amazing!"));
        assert_eq!("statement", route_by_type("AI is a field of study."));
    }

    #[tokio::test]
    async fn test_router() {
        let router = Router::new(|text: &String| route_by_length(text).to_string())
            .route("short", Lambda::new(|text: String| format!("Expand this short text: {}", text)))
            .route("medium", Lambda::new(|text: String| format!("Summarize this medium text: {}", text)));
        assert_eq!("Expand this short text: AI is cool", router.invoke("AI is cool".to_string()).await.unwrap());
        assert!(router.invoke("a".repeat(300)).await.is_err());

        let router = router.default_route(Lambda::new(|_: String| "fallback".to_string()));
        assert_eq!("fallback", router.invoke("a".repeat(300)).await.unwrap());
        assert_eq!("long", router.key_of(&"a".repeat(300)));
    }
}

use std::sync::Arc;
use anyhow::Result;
use async_trait::async_trait;
use log::warn;

use crate::chain::runnable::Runnable;

/// Tries the primary step, then each fallback in order. The error of the last attempt is returned.
pub struct WithFallbacks<I, O> {
    primary: Arc<dyn Runnable<I, O>>,
    fallbacks: Vec<Arc<dyn Runnable<I, O>>>,
}

impl<I, O> WithFallbacks<I, O> {
    pub fn new(primary: Arc<dyn Runnable<I, O>>, fallbacks: Vec<Arc<dyn Runnable<I, O>>>) -> Self {
        Self { primary, fallbacks }
    }
}

#[async_trait]
impl<I, O> Runnable<I, O> for WithFallbacks<I, O>
    where I: Clone + Send + Sync + 'static,
          O: Send + 'static {
    async fn invoke(&self, input: I) -> Result<O> {
        let mut last_error = match self.primary.invoke(input.clone()).await {
            Ok(output) => return Ok(output),
            Err(e) => e,
        };
        for (idx, fallback) in self.fallbacks.iter().enumerate() {
            warn!("attempt {} failed, trying fallback {}: {:#}", idx, idx + 1, last_error);
            match fallback.invoke(input.clone()).await {
                Ok(output) => return Ok(output),
                Err(e) => last_error = e,
            }
        }
        Err(last_error)
    }
}

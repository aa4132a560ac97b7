use std::collections::HashMap;
use std::sync::Arc;
use anyhow::Result;
use async_trait::async_trait;
use futures::future::try_join_all;

use crate::chain::runnable::Runnable;

/// Named branches that all get the same input and run concurrently.
pub struct Parallel<I, O> {
    branches: Vec<(String, Arc<dyn Runnable<I, O>>)>,
}

impl<I, O> Parallel<I, O>
    where I: Send + 'static,
          O: Send + 'static {
    pub fn new() -> Self {
        Self { branches: Vec::new() }
    }

    pub fn branch(mut self, name: impl Into<String>, runnable: impl Runnable<I, O> + 'static) -> Self {
        self.branches.push((name.into(), Arc::new(runnable)));
        self
    }

    pub fn branch_names(&self) -> Vec<&str> {
        self.branches.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl<I, O> Default for Parallel<I, O>
    where I: Send + 'static,
          O: Send + 'static {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<I, O> Runnable<I, HashMap<String, O>> for Parallel<I, O>
    where I: Clone + Send + Sync + 'static,
          O: Send + 'static {
    async fn invoke(&self, input: I) -> Result<HashMap<String, O>> {
        let runs = self.branches.iter().map(|(name, runnable)| {
            let input = input.clone();
            async move {
                let output = runnable.invoke(input).await?;
                Ok::<_, anyhow::Error>((name.clone(), output))
            }
        });
        Ok(try_join_all(runs).await?.into_iter().collect())
    }
}

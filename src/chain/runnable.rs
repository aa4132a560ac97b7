use std::marker::PhantomData;
use std::sync::Arc;
use anyhow::Result;
use async_trait::async_trait;
use futures::future::try_join_all;
use futures::stream::{self, BoxStream, StreamExt};

use crate::chain::fallback::WithFallbacks;

pub type RunnableStream<O> = BoxStream<'static, Result<O>>;

/// A step that turns an `I` into an `O`, possibly by calling a model.
#[async_trait]
pub trait Runnable<I, O>: Send + Sync
    where I: Send + 'static,
          O: Send + 'static {
    async fn invoke(&self, input: I) -> Result<O>;

    /// Run all inputs concurrently. Fails as soon as one of them fails.
    async fn batch(&self, inputs: Vec<I>) -> Result<Vec<O>> {
        try_join_all(inputs.into_iter().map(|input| self.invoke(input))).await
    }

    /// Stream the output. Steps that cannot stream yield their whole output as one item.
    async fn stream(&self, input: I) -> Result<RunnableStream<O>> {
        let output = self.invoke(input).await?;
        Ok(stream::once(async move { Ok(output) }).boxed())
    }
}

#[async_trait]
impl<I, O, R> Runnable<I, O> for Arc<R>
    where I: Send + 'static,
          O: Send + 'static,
          R: Runnable<I, O> + ?Sized {
    async fn invoke(&self, input: I) -> Result<O> {
        (**self).invoke(input).await
    }

    async fn batch(&self, inputs: Vec<I>) -> Result<Vec<O>> {
        (**self).batch(inputs).await
    }

    async fn stream(&self, input: I) -> Result<RunnableStream<O>> {
        (**self).stream(input).await
    }
}

/// Combinators available on every [Runnable].
pub trait RunnableExt<I, O>: Runnable<I, O> + Sized
    where I: Send + 'static,
          O: Send + 'static {
    /// Feed the output of `self` into `next`.
    fn pipe<P, N>(self, next: N) -> Pipe<Self, N, O>
        where P: Send + 'static,
              N: Runnable<O, P> {
        Pipe { first: self, second: next, _mid: PhantomData }
    }

    /// Try `fallbacks` in order when `self` fails.
    fn with_fallbacks(self, fallbacks: Vec<Arc<dyn Runnable<I, O>>>) -> WithFallbacks<I, O>
        where Self: 'static {
        WithFallbacks::new(Arc::new(self), fallbacks)
    }

    /// Run `self` over every item of a list.
    fn each(self) -> Each<Self> {
        Each { inner: self }
    }

    fn shared(self) -> Arc<dyn Runnable<I, O>>
        where Self: 'static {
        Arc::new(self)
    }
}

impl<I, O, R> RunnableExt<I, O> for R
    where I: Send + 'static,
          O: Send + 'static,
          R: Runnable<I, O> {}

/// Two steps in sequence.
pub struct Pipe<A, B, M> {
    first: A,
    second: B,
    _mid: PhantomData<fn() -> M>,
}

#[async_trait]
impl<I, M, O, A, B> Runnable<I, O> for Pipe<A, B, M>
    where I: Send + 'static,
          M: Send + 'static,
          O: Send + 'static,
          A: Runnable<I, M>,
          B: Runnable<M, O> {
    async fn invoke(&self, input: I) -> Result<O> {
        let mid = self.first.invoke(input).await?;
        self.second.invoke(mid).await
    }

    /// Only the last step streams.
    async fn stream(&self, input: I) -> Result<RunnableStream<O>> {
        let mid = self.first.invoke(input).await?;
        self.second.stream(mid).await
    }
}

/// A plain function as a step.
pub struct Lambda<F> {
    func: F,
}

impl<F> Lambda<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<I, O, F> Runnable<I, O> for Lambda<F>
    where I: Send + 'static,
          O: Send + 'static,
          F: Fn(I) -> O + Send + Sync {
    async fn invoke(&self, input: I) -> Result<O> {
        Ok((self.func)(input))
    }
}

/// Returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

#[async_trait]
impl<I: Send + 'static> Runnable<I, I> for Passthrough {
    async fn invoke(&self, input: I) -> Result<I> {
        Ok(input)
    }
}

/// Maps a step over a list. Items run concurrently and keep their order.
pub struct Each<R> {
    inner: R,
}

#[async_trait]
impl<I, O, R> Runnable<Vec<I>, Vec<O>> for Each<R>
    where I: Send + 'static,
          O: Send + 'static,
          R: Runnable<I, O> {
    async fn invoke(&self, input: Vec<I>) -> Result<Vec<O>> {
        self.inner.batch(input).await
    }
}

#[cfg(test)]
mod test_runnable {
    use std::time::Duration;
    use anyhow::anyhow;
    use futures::TryStreamExt;
    use super::*;

    struct Delayed;

    #[async_trait]
    impl Runnable<u64, u64> for Delayed {
        async fn invoke(&self, input: u64) -> Result<u64> {
            tokio::time::sleep(Duration::from_millis(50 - input * 10)).await;
            if input == 4 {
                Err(anyhow!("four is not allowed"))
            } else {
                Ok(input * 2)
            }
        }
    }

    #[tokio::test]
    async fn test_pipe_of_lambdas() {
        let chain = Lambda::new(|text: String| text.to_uppercase())
            .pipe(Lambda::new(|text: String| format!("IMPORTANT: {}", text)));
        assert_eq!("IMPORTANT: HELLO WORLD", chain.invoke("hello world".to_string()).await.unwrap());
        let streamed: Vec<String> = chain.stream("hi".to_string()).await.unwrap().try_collect().await.unwrap();
        assert_eq!(vec!["IMPORTANT: HI".to_string()], streamed);
    }

    #[tokio::test]
    async fn test_batch_keeps_order() {
        assert_eq!(vec![0, 2, 4, 6], Delayed.batch(vec![0, 1, 2, 3]).await.unwrap());
        assert!(Delayed.batch(vec![1, 4]).await.is_err());
    }

    #[tokio::test]
    async fn test_each_and_passthrough() {
        let mapped = Lambda::new(|topic: &'static str| format!("Learning about: {}", topic))
            .each()
            .invoke(vec!["machine learning", "blockchain"])
            .await
            .unwrap();
        assert_eq!(vec!["Learning about: machine learning", "Learning about: blockchain"], mapped);
        assert_eq!(7, Passthrough.invoke(7).await.unwrap());
    }

    #[tokio::test]
    async fn test_shared() {
        let shared = Delayed.pipe(Lambda::new(|n: u64| n + 1)).shared();
        assert_eq!(7, shared.invoke(3).await.unwrap());
    }
}

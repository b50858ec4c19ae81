use std::{pin::Pin, sync::Arc, time::SystemTime};

use futures::{Stream, StreamExt};

#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub payload: T,
    pub received_at: SystemTime,
}

impl<T> Envelope<T> {
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            received_at: SystemTime::now(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(String),
    #[error("transform error: {0}")]
    Transform(String),
    #[error("sink error: {0}")]
    Sink(String),
}

pub type EnvelopeStream<T> = Pin<Box<dyn Stream<Item = Result<Envelope<T>, PipelineError>> + Send>>;

#[async_trait::async_trait]
pub trait Source<T>: Send + Sync {
    async fn stream(&self) -> EnvelopeStream<T>;
}

#[async_trait::async_trait]
pub trait Transform<I, O>: Send + Sync {
    async fn apply(&self, input: Envelope<I>) -> Result<Envelope<O>, PipelineError>;
}

/// Terminal stage. Returns the number of records it persisted.
#[async_trait::async_trait]
pub trait Sink<T>: Send + Sync {
    async fn run<S>(&self, input: S) -> Result<u64, PipelineError>
    where
        S: Stream<Item = Result<Envelope<T>, PipelineError>> + Send + Unpin + 'static;
}

pub struct Pipeline<S, T, K> {
    pub source: S,
    pub transforms: Vec<Arc<dyn Transform<T, T> + Send + Sync>>, // same-type transforms chain
    pub sink: K,
}

impl<T, S, K> Pipeline<S, T, K>
where
    T: Send + 'static,
    S: Source<T> + Send + Sync + 'static,
    K: Sink<T> + Send + Sync + 'static,
{
    pub async fn run(self) -> Result<u64, PipelineError> {
        let mut stream = self.source.stream().await;

        for t in self.transforms {
            stream = Box::pin(stream.then(move |item| {
                let t = t.clone();
                async move {
                    match item {
                        Ok(env) => t.apply(env).await,
                        Err(e) => Err(e),
                    }
                }
            }));
        }

        self.sink.run(stream).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Numbers(Vec<Result<i64, &'static str>>);

    #[async_trait::async_trait]
    impl Source<i64> for Numbers {
        async fn stream(&self) -> EnvelopeStream<i64> {
            let items: Vec<_> = self
                .0
                .iter()
                .map(|r| match r {
                    Ok(n) => Ok(Envelope::new(*n)),
                    Err(msg) => Err(PipelineError::Source(msg.to_string())),
                })
                .collect();
            Box::pin(futures::stream::iter(items))
        }
    }

    struct Double;

    #[async_trait::async_trait]
    impl Transform<i64, i64> for Double {
        async fn apply(&self, input: Envelope<i64>) -> Result<Envelope<i64>, PipelineError> {
            Ok(Envelope {
                payload: input.payload * 2,
                received_at: input.received_at,
            })
        }
    }

    #[derive(Default)]
    struct Collect(Arc<Mutex<Vec<i64>>>);

    #[async_trait::async_trait]
    impl Sink<i64> for Collect {
        async fn run<S>(&self, mut input: S) -> Result<u64, PipelineError>
        where
            S: Stream<Item = Result<Envelope<i64>, PipelineError>> + Send + Unpin + 'static,
        {
            let mut n = 0;
            while let Some(item) = input.next().await {
                self.0.lock().unwrap().push(item?.payload);
                n += 1;
            }
            Ok(n)
        }
    }

    #[tokio::test]
    async fn transforms_apply_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let pipeline: Pipeline<_, i64, _> = Pipeline {
            source: Numbers(vec![Ok(1), Ok(2)]),
            transforms: vec![Arc::new(Double), Arc::new(Double)],
            sink: Collect(seen.clone()),
        };
        assert_eq!(pipeline.run().await.unwrap(), 2);
        assert_eq!(*seen.lock().unwrap(), vec![4, 8]);
    }

    #[tokio::test]
    async fn source_errors_reach_the_sink() {
        let pipeline: Pipeline<_, i64, _> = Pipeline {
            source: Numbers(vec![Ok(1), Err("bad row")]),
            transforms: vec![Arc::new(Double)],
            sink: Collect::default(),
        };
        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, PipelineError::Source(msg) if msg == "bad row"));
    }
}

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::platform::ShareUrl;

use super::{MediaReference, ResolutionStrategy, StrategyError};

#[derive(Debug, Clone)]
pub enum Outcome {
    Succeed(MediaReference),
    Fail,
    Nothing,
    Empty,
    Hang,
    Panic,
}

impl Outcome {
    pub fn thumb(url: &str) -> Self {
        Self::Succeed(MediaReference {
            thumbnail_url: Some(url.to_string()),
            ..Default::default()
        })
    }
}

/// Scripted strategy that counts how often it was attempted.
#[derive(Clone)]
pub struct MockStrategy {
    name: String,
    outcome: Outcome,
    pub calls: Arc<AtomicUsize>,
}

impl MockStrategy {
    pub fn new(name: &str, outcome: Outcome) -> Self {
        Self {
            name: name.to_string(),
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl ResolutionStrategy for MockStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn attempt(&self, _url: &ShareUrl) -> Result<Option<MediaReference>, StrategyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.outcome {
            Outcome::Succeed(reference) => Ok(Some(reference.clone())),
            Outcome::Fail => Err(StrategyError::ParsingError("scripted failure".into())),
            Outcome::Nothing => Ok(None),
            Outcome::Empty => Ok(Some(MediaReference {
                video_url: Some(String::new()),
                ..Default::default()
            })),
            Outcome::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(None)
            }
            Outcome::Panic => panic!("scripted panic"),
        }
    }
}

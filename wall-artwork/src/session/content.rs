//! Background content fetching with results handed back to the main context.

use bevy::log::{debug, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::collaborators::{ArtworkContent, ContentFetcher};
use super::node::NodeId;
use crate::model::{ArtworkDescriptor, ContentType};

/// Fetched content for a node, possibly stale by the time it is drained.
#[derive(Debug)]
pub struct ContentDelivery {
    pub node: NodeId,
    pub content_link: String,
    pub content: ArtworkContent,
}

pub struct ContentLoader {
    fetcher: Arc<dyn ContentFetcher>,
    tx: mpsc::UnboundedSender<ContentDelivery>,
    rx: mpsc::UnboundedReceiver<ContentDelivery>,
}

impl ContentLoader {
    pub fn new(fetcher: Arc<dyn ContentFetcher>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { fetcher, tx, rx }
    }

    /// Starts loading content for `node`.
    ///
    /// Video is streamed by the renderer, so its link is returned right away.
    /// Image content is fetched on the tokio runtime and delivered through
    /// [`drain`](Self::drain).
    pub fn request(&self, node: NodeId, descriptor: &ArtworkDescriptor) -> Option<ArtworkContent> {
        if !descriptor.content_type.is_fetched() {
            return Some(ArtworkContent::VideoStream(descriptor.content_link.clone()));
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime, content for {} will not load", descriptor.content_link);
            return None;
        };

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        let link = descriptor.content_link.clone();
        let content_type = descriptor.content_type;

        runtime.spawn(async move {
            match fetcher.fetch(&link).await {
                Ok(bytes) => {
                    let bytes: Arc<[u8]> = bytes.into();
                    let content = match content_type {
                        ContentType::AnimatedImage => ArtworkContent::AnimatedImage(bytes),
                        _ => ArtworkContent::Image(bytes),
                    };
                    // Receiver is gone once the controller is dropped.
                    let _ = tx.send(ContentDelivery {
                        node,
                        content_link: link,
                        content,
                    });
                }
                Err(e) => warn!("Failed to fetch artwork content {}: {}", link, e),
            }
        });
        debug!("Requested content for {}", node);
        None
    }

    /// Everything delivered since the last drain.
    pub fn drain(&mut self) -> Vec<ContentDelivery> {
        let mut ready = Vec::new();
        while let Ok(delivery) = self.rx.try_recv() {
            ready.push(delivery);
        }
        ready
    }
}

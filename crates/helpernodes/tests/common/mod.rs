// Shared fixtures for node library tests

#![allow(dead_code)]

use async_trait::async_trait;
use helpercore::{EventBus, NodeContext, NodeError, WalkId};
use helpernodes::PageFetcher;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Serves pages from memory and records every requested URL
#[derive(Default)]
pub struct MemoryFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn with_page(mut self, url: &str, markup: &str) -> Self {
        self.pages.insert(url.to_string(), markup.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<String, NodeError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| NodeError::Fetch(format!("no page at {}", url)))
    }
}

pub fn empty_fetcher() -> Arc<dyn PageFetcher> {
    Arc::new(MemoryFetcher::default())
}

pub fn ctx() -> NodeContext {
    let bus = EventBus::default();
    NodeContext::new("n", bus.reporter(WalkId::new_v4(), "n"))
}

pub const SEARCH_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Search</title></head>
  <body>
    <ul>
      <li><a class="result" href="/watch/42">Big Buck Bunny</a></li>
      <li><a class="result" href="https://cdn.media.test/watch/43">Sintel</a></li>
    </ul>
  </body>
</html>"#;

pub const TABLE_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <body>
    <table>
      <tr class="hit"><td class="title">Big Buck Bunny</td><td><a href="/watch/42">watch</a></td></tr>
      <tr class="hit"><td class="title">Sintel</td><td><a href="/watch/43">watch</a></td></tr>
    </table>
  </body>
</html>"#;

pub const EMPTY_PAGE: &str = "<html><body><p>Nothing found</p></body></html>";

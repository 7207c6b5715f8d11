// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use intellioptics_api::{Client, PushOptions, Subscription};
use intellioptics_app::{Detector, LoadError};
use intellioptics_tui::{DashboardRuntime, InternalEvent, LiveFeed};
use log::{debug, info};
use std::sync::mpsc::Sender;
use std::thread;

use crate::config::DashboardConfig;

/// Talks to the detector backend over HTTP and the push endpoint.
pub struct ApiRuntime {
    client: Client,
    push: Option<PushOptions>,
}

impl ApiRuntime {
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let client = Client::new(&config.backend_url, config.timeout)
            .context("invalid [backend] config; fix base_url/timeout values")?;
        let push = config
            .push
            .as_ref()
            .map(|push| PushOptions::new(&push.socket_url, push.connect_timeout))
            .transpose()
            .context("invalid [push] config; fix socket_url or set enabled = false")?;
        Ok(Self { client, push })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl DashboardRuntime for ApiRuntime {
    fn fetch_detectors(&mut self) -> Result<Vec<Detector>, LoadError> {
        self.client.list_detectors()
    }

    fn spawn_fetch(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name("intellioptics-fetch".to_owned())
            .spawn(move || {
                fetch_and_deliver(&client, &tx);
            })
            .context("spawn detector fetch thread")?;
        Ok(())
    }

    fn subscribe(&mut self, tx: Sender<InternalEvent>) -> Result<Option<Box<dyn LiveFeed>>> {
        let Some(options) = self.push.clone() else {
            info!("push updates disabled");
            return Ok(None);
        };
        let subscription = Subscription::start(options, move |event| {
            let _ = tx.send(InternalEvent::Live(event));
        })?;
        Ok(Some(Box::new(LiveSubscription(subscription))))
    }
}

/// Returns false when the dashboard unmounted before the result arrived; the
/// result is discarded.
fn fetch_and_deliver(client: &Client, tx: &Sender<InternalEvent>) -> bool {
    let result = client.list_detectors();
    if tx.send(InternalEvent::Fetched(result)).is_err() {
        debug!("dashboard closed before detector fetch finished");
        return false;
    }
    true
}

struct LiveSubscription(Subscription);

impl LiveFeed for LiveSubscription {
    fn request_update(&self) -> bool {
        self.0.request_update()
    }
}

/// Offline runtime serving seeded detectors.
pub struct DemoRuntime {
    detectors: Vec<Detector>,
}

impl DemoRuntime {
    pub fn new() -> Self {
        Self {
            detectors: intellioptics_testkit::demo_detectors(),
        }
    }
}

impl Default for DemoRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardRuntime for DemoRuntime {
    fn fetch_detectors(&mut self) -> Result<Vec<Detector>, LoadError> {
        Ok(self.detectors.clone())
    }
}

//! Spawns the application on a random port for the integration tests.
use std::{net::SocketAddr, sync::OnceLock};

use anyhow::Result;
use neuronex::{config::get_or_init_config, init_dbg_tracing, model::ModelManager, App};
use serde_json::Value;

pub struct TestApp {
    pub addr: SocketAddr,
    pub http_client: reqwest::Client,
    pub model_mgr: ModelManager,
}

/// Set `TEST_LOG` to see the server logs while the tests run.
fn init_test_subscriber() {
    static SUBSCRIBER: OnceLock<()> = OnceLock::new();
    SUBSCRIBER.get_or_init(|| {
        if std::env::var("TEST_LOG").is_ok() {
            init_dbg_tracing();
        }
    });
}

impl TestApp {
    /// Tries to spawn the app in a separate tokio task, listening on a random local port.
    pub async fn spawn() -> Result<Self> {
        init_test_subscriber();

        let mut config = get_or_init_config().clone();
        config.net_config.host = [127, 0, 0, 1];
        // Trying to bind port 0 will trigger an OS scan for an available port
        // which will then be bound to the application.
        config.net_config.app_port = 0;

        let app = App::build_from_config(&config).await?;
        let addr = app.listener.local_addr()?;
        let model_mgr = app.app_state.model_mgr.clone();

        tokio::spawn(neuronex::serve(app));

        Ok(TestApp {
            addr,
            http_client: reqwest::Client::new(),
            model_mgr,
        })
    }

    pub fn subscribe_url(&self) -> String {
        format!("http://{}/api/newsletter/subscribe", self.addr)
    }

    pub async fn post_subscriptions(&self, body: &Value) -> Result<reqwest::Response> {
        let res = self
            .http_client
            .post(self.subscribe_url())
            .json(body)
            .send()
            .await?;

        Ok(res)
    }
}

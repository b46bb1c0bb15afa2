use imagegen_service::config::{AiConfig, ImagegenConfig, DEFAULT_MODEL};
use imagegen_service::startup::Application;
use secrecy::SecretString;
use service_core::config::Config as CoreConfig;

pub const TEST_API_KEY: &str = "test-api-key";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn a service pointed at `base_url` with a test API key.
    pub async fn spawn(base_url: &str) -> Self {
        Self::spawn_with(AiConfig {
            base_url: Some(base_url.to_string()),
            api_key: Some(SecretString::new(TEST_API_KEY.to_string())),
            model: DEFAULT_MODEL.to_string(),
        })
        .await
    }

    pub async fn spawn_with(ai: AiConfig) -> Self {
        let config = ImagegenConfig {
            common: CoreConfig { port: 0 }, // Random port for testing
            ai,
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, client }
    }

    pub async fn post_form(&self, fields: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(format!("{}/api/generate", self.address))
            .form(fields)
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn post_multipart(&self, fields: &[(&str, &str)]) -> reqwest::Response {
        let form = fields
            .iter()
            .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
                form.text(name.to_string(), value.to_string())
            });

        self.client
            .post(format!("{}/api/generate", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send request")
    }
}

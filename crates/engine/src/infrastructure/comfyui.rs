//! ComfyUI image generation client
//!
//! Queues a text-to-image workflow, polls the history endpoint until the
//! prompt completes, then downloads the first output image.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::infrastructure::ports::{ImageGenPort, ImageRequest, ImageResult, MediaError};

pub const DEFAULT_COMFYUI_URL: &str = "http://localhost:8188";

const DEFAULT_CHECKPOINT: &str = "sd_xl_base_1.0.safetensors";
const FILENAME_PREFIX: &str = "storyteller";

#[derive(Clone)]
pub struct ComfyUIClient {
    client: Client,
    base_url: String,
    checkpoint: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl ComfyUIClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            checkpoint: DEFAULT_CHECKPOINT.to_string(),
            poll_interval: Duration::from_secs(1),
            max_polls: 120,
        }
    }

    pub fn with_checkpoint(mut self, checkpoint: impl Into<String>) -> Self {
        self.checkpoint = checkpoint.into();
        self
    }

    async fn send(request: RequestBuilder) -> Result<reqwest::Response, MediaError> {
        let response = request
            .send()
            .await
            .map_err(|e| MediaError::GenerationFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::GenerationFailed(format!(
                "ComfyUI returned {status}: {body}"
            )));
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, MediaError> {
        Self::send(request)
            .await?
            .json()
            .await
            .map_err(|e| MediaError::GenerationFailed(e.to_string()))
    }

    async fn queue_prompt(&self, workflow: serde_json::Value) -> Result<String, MediaError> {
        let body = QueuePromptRequest {
            prompt: workflow,
            client_id: uuid::Uuid::new_v4().to_string(),
        };
        let queued: QueueResponse =
            Self::send_json(self.client.post(format!("{}/prompt", self.base_url)).json(&body))
                .await?;
        Ok(queued.prompt_id)
    }

    async fn wait_for_output(&self, prompt_id: &str) -> Result<ImageOutput, MediaError> {
        for _ in 0..self.max_polls {
            let history: HashMap<String, PromptHistory> = Self::send_json(
                self.client
                    .get(format!("{}/history/{}", self.base_url, prompt_id)),
            )
            .await?;

            if let Some(entry) = history.get(prompt_id) {
                if entry.status.completed {
                    return entry.first_image().cloned().ok_or_else(|| {
                        MediaError::GenerationFailed("No images in output".to_string())
                    });
                }
            }

            sleep(self.poll_interval).await;
        }

        Err(MediaError::GenerationFailed(
            "Generation timed out".to_string(),
        ))
    }

    async fn download(&self, image: &ImageOutput) -> Result<Vec<u8>, MediaError> {
        let response = Self::send(
            self.client
                .get(format!("{}/view", self.base_url))
                .query(&[
                    ("filename", image.filename.as_str()),
                    ("subfolder", image.subfolder.as_str()),
                    ("type", image.folder_type.as_str()),
                ]),
        )
        .await?;

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| MediaError::GenerationFailed(e.to_string()))
    }

    /// SDXL text-to-image graph with the request's prompt, negative prompt and seed.
    fn build_workflow(&self, request: &ImageRequest) -> serde_json::Value {
        serde_json::json!({
            "3": {
                "class_type": "KSampler",
                "inputs": {
                    "seed": request.seed,
                    "steps": 25,
                    "cfg": 7.0,
                    "sampler_name": "dpmpp_2m",
                    "scheduler": "karras",
                    "denoise": 1.0,
                    "model": ["4", 0],
                    "positive": ["6", 0],
                    "negative": ["7", 0],
                    "latent_image": ["5", 0]
                }
            },
            "4": {
                "class_type": "CheckpointLoaderSimple",
                "inputs": { "ckpt_name": self.checkpoint }
            },
            "5": {
                "class_type": "EmptyLatentImage",
                "inputs": {
                    "width": request.width,
                    "height": request.height,
                    "batch_size": 1
                }
            },
            "6": {
                "class_type": "CLIPTextEncode",
                "inputs": { "text": request.prompt, "clip": ["4", 1] }
            },
            "7": {
                "class_type": "CLIPTextEncode",
                "inputs": { "text": request.negative_prompt, "clip": ["4", 1] }
            },
            "8": {
                "class_type": "VAEDecode",
                "inputs": { "samples": ["3", 0], "vae": ["4", 2] }
            },
            "9": {
                "class_type": "SaveImage",
                "inputs": { "filename_prefix": FILENAME_PREFIX, "images": ["8", 0] }
            }
        })
    }
}

/// Image format implied by an output filename.
fn format_from_filename(filename: &str) -> &'static str {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "jpeg"
    } else if lower.ends_with(".webp") {
        "webp"
    } else {
        "png"
    }
}

#[async_trait]
impl ImageGenPort for ComfyUIClient {
    async fn generate(&self, request: ImageRequest) -> Result<ImageResult, MediaError> {
        let prompt_id = self.queue_prompt(self.build_workflow(&request)).await?;
        tracing::debug!(prompt_id = %prompt_id, seed = request.seed, "Queued ComfyUI prompt");

        let output = self.wait_for_output(&prompt_id).await?;
        let image_data = self.download(&output).await?;

        Ok(ImageResult {
            image_data,
            format: format_from_filename(&output.filename).to_string(),
        })
    }

    async fn check_health(&self) -> Result<bool, MediaError> {
        let response = self
            .client
            .get(format!("{}/system_stats", self.base_url))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|_| MediaError::Unavailable)?;

        Ok(response.status().is_success())
    }
}

// =============================================================================
// ComfyUI API types
// =============================================================================

#[derive(Debug, Serialize)]
struct QueuePromptRequest {
    prompt: serde_json::Value,
    client_id: String,
}

#[derive(Debug, Deserialize)]
struct QueueResponse {
    prompt_id: String,
}

#[derive(Debug, Deserialize)]
struct PromptHistory {
    #[serde(default)]
    outputs: HashMap<String, NodeOutput>,
    status: PromptStatus,
}

impl PromptHistory {
    fn first_image(&self) -> Option<&ImageOutput> {
        self.outputs
            .values()
            .filter_map(|output| output.images.as_ref())
            .find_map(|images| images.first())
    }
}

#[derive(Debug, Deserialize)]
struct NodeOutput {
    images: Option<Vec<ImageOutput>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ImageOutput {
    filename: String,
    #[serde(default)]
    subfolder: String,
    #[serde(rename = "type")]
    folder_type: String,
}

#[derive(Debug, Deserialize)]
struct PromptStatus {
    completed: bool,
}

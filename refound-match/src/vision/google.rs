//! Google Cloud Vision adapter
//!
//! One `images:annotate` call per photo, requesting label detection and
//! object localization. The annotate response is mapped to a
//! [`VisionSummary`] by a pure function; anything that goes wrong on the
//! wire (or a missing API key) is logged and yields the empty summary.

use async_trait::async_trait;
use refound_common::models::{BoundingBox, DetectedObject, VisionSummary};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::VisionAnalyzer;

const VISION_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Annotations requested per feature.
const MAX_RESULTS: u32 = 20;

/// Vision analyzer backed by the Cloud Vision annotate endpoint.
///
/// Constructed with `api_key: None` when no key is configured; every
/// `analyze` call then short-circuits to the empty summary.
pub struct GoogleVisionClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    timeout: Duration,
}

impl GoogleVisionClient {
    pub fn new(api_key: Option<String>, timeout_secs: u64) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    async fn annotate(&self, api_key: &str, image_url: &str) -> anyhow::Result<VisionSummary> {
        let url = format!("{VISION_ENDPOINT}?key={api_key}");
        let response = self
            .http_client
            .post(&url)
            .timeout(self.timeout)
            .json(&AnnotateRequest::for_image(image_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("annotate returned {status}: {body}");
        }

        let mut payload: AnnotateResponse = response.json().await?;
        if payload.responses.is_empty() {
            anyhow::bail!("annotate response carried no results");
        }

        Ok(summarize(payload.responses.remove(0)))
    }
}

#[async_trait]
impl VisionAnalyzer for GoogleVisionClient {
    async fn analyze(&self, image_url: &str) -> VisionSummary {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("Vision API key not configured, skipping image analysis");
            return VisionSummary::default();
        };

        match self.annotate(api_key, image_url).await {
            Ok(summary) => {
                debug!(
                    image_url,
                    labels = summary.labels.len(),
                    objects = summary.objects.len(),
                    "Image analysis complete"
                );
                summary
            }
            Err(e) => {
                warn!(image_url, error = %e, "Image analysis failed, continuing without it");
                VisionSummary::default()
            }
        }
    }
}

/// Map one annotate result onto a summary.
///
/// The API omits zero-valued JSON fields, so every numeric field defaults.
/// Labels without a description and objects without a name carry no signal
/// and are dropped.
fn summarize(result: AnnotateResult) -> VisionSummary {
    let labels = result
        .label_annotations
        .into_iter()
        .filter_map(|label| label.description)
        .filter(|description| !description.is_empty())
        .collect();

    let objects = result
        .object_annotations
        .into_iter()
        .filter_map(|object| {
            let name = object.name.filter(|name| !name.is_empty())?;
            Some(DetectedObject {
                name,
                score: object.score,
                bounding_box: object.bounding_poly.and_then(bounding_box),
            })
        })
        .collect();

    VisionSummary { labels, objects }
}

/// Fold a normalized-vertex polygon into an axis-aligned box.
fn bounding_box(poly: BoundingPoly) -> Option<BoundingBox> {
    let first = poly.normalized_vertices.first()?;
    let mut bounds = BoundingBox {
        x_min: first.x,
        y_min: first.y,
        x_max: first.x,
        y_max: first.y,
    };
    for vertex in &poly.normalized_vertices[1..] {
        bounds.x_min = bounds.x_min.min(vertex.x);
        bounds.y_min = bounds.y_min.min(vertex.y);
        bounds.x_max = bounds.x_max.max(vertex.x);
        bounds.y_max = bounds.y_max.max(vertex.y);
    }
    Some(bounds)
}

#[derive(Debug, Serialize)]
struct AnnotateRequest<'a> {
    requests: Vec<AnnotateItem<'a>>,
}

impl<'a> AnnotateRequest<'a> {
    fn for_image(image_url: &'a str) -> Self {
        Self {
            requests: vec![AnnotateItem {
                image: ImageRef {
                    source: ImageSource {
                        image_uri: image_url,
                    },
                },
                features: vec![
                    Feature {
                        kind: "LABEL_DETECTION",
                        max_results: MAX_RESULTS,
                    },
                    Feature {
                        kind: "OBJECT_LOCALIZATION",
                        max_results: MAX_RESULTS,
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct AnnotateItem<'a> {
    image: ImageRef<'a>,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageRef<'a> {
    source: ImageSource<'a>,
}

#[derive(Debug, Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "imageUri")]
    image_uri: &'a str,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "maxResults")]
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateResult>,
}

#[derive(Debug, Default, Deserialize)]
struct AnnotateResult {
    #[serde(rename = "labelAnnotations", default)]
    label_annotations: Vec<LabelAnnotation>,
    #[serde(rename = "localizedObjectAnnotations", default)]
    object_annotations: Vec<ObjectAnnotation>,
}

#[derive(Debug, Deserialize)]
struct LabelAnnotation {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectAnnotation {
    name: Option<String>,
    #[serde(default)]
    score: f32,
    #[serde(rename = "boundingPoly")]
    bounding_poly: Option<BoundingPoly>,
}

#[derive(Debug, Deserialize)]
struct BoundingPoly {
    #[serde(rename = "normalizedVertices", default)]
    normalized_vertices: Vec<Vertex>,
}

#[derive(Debug, Deserialize)]
struct Vertex {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_wire_field_names() {
        let json = serde_json::to_value(AnnotateRequest::for_image("http://host/img.jpg")).unwrap();
        let request = &json["requests"][0];
        assert_eq!(request["image"]["source"]["imageUri"], "http://host/img.jpg");
        assert_eq!(request["features"][0]["type"], "LABEL_DETECTION");
        assert_eq!(request["features"][1]["type"], "OBJECT_LOCALIZATION");
        assert_eq!(request["features"][0]["maxResults"], 20);
    }

    #[test]
    fn summarize_maps_labels_and_objects() {
        let result: AnnotateResult = serde_json::from_str(
            r#"{
                "labelAnnotations": [
                    {"description": "Bag", "score": 0.97},
                    {"description": "Leather", "score": 0.88}
                ],
                "localizedObjectAnnotations": [
                    {
                        "name": "Handbag",
                        "score": 0.93,
                        "boundingPoly": {
                            "normalizedVertices": [
                                {"x": 0.1, "y": 0.2},
                                {"x": 0.8, "y": 0.2},
                                {"x": 0.8, "y": 0.9},
                                {"x": 0.1, "y": 0.9}
                            ]
                        }
                    }
                ]
            }"#,
        )
        .unwrap();

        let summary = summarize(result);
        assert_eq!(summary.labels, vec!["Bag", "Leather"]);
        assert_eq!(summary.objects.len(), 1);

        let object = &summary.objects[0];
        assert_eq!(object.name, "Handbag");
        assert!((object.score - 0.93).abs() < 1e-6);

        let bounds = object.bounding_box.as_ref().unwrap();
        assert_eq!(bounds.x_min, 0.1);
        assert_eq!(bounds.x_max, 0.8);
        assert_eq!(bounds.y_min, 0.2);
        assert_eq!(bounds.y_max, 0.9);
    }

    #[test]
    fn summarize_tolerates_omitted_zero_coordinates() {
        // Vertices at the image origin arrive with the field missing
        let result: AnnotateResult = serde_json::from_str(
            r#"{
                "localizedObjectAnnotations": [
                    {
                        "name": "Umbrella",
                        "score": 0.8,
                        "boundingPoly": {
                            "normalizedVertices": [
                                {},
                                {"x": 0.5},
                                {"x": 0.5, "y": 0.4},
                                {"y": 0.4}
                            ]
                        }
                    }
                ]
            }"#,
        )
        .unwrap();

        let summary = summarize(result);
        let bounds = summary.objects[0].bounding_box.as_ref().unwrap();
        assert_eq!(bounds.x_min, 0.0);
        assert_eq!(bounds.y_min, 0.0);
        assert_eq!(bounds.x_max, 0.5);
        assert_eq!(bounds.y_max, 0.4);
    }

    #[test]
    fn summarize_drops_unusable_annotations() {
        let result: AnnotateResult = serde_json::from_str(
            r#"{
                "labelAnnotations": [{"score": 0.9}, {"description": ""}],
                "localizedObjectAnnotations": [
                    {"score": 0.7},
                    {"name": "Wallet", "score": 0.85}
                ]
            }"#,
        )
        .unwrap();

        let summary = summarize(result);
        assert!(summary.labels.is_empty());
        assert_eq!(summary.objects.len(), 1);
        assert_eq!(summary.objects[0].name, "Wallet");
        assert!(summary.objects[0].bounding_box.is_none());
    }

    #[test]
    fn summarize_empty_result_is_empty_summary() {
        let summary = summarize(AnnotateResult::default());
        assert!(summary.is_empty());
    }

    #[tokio::test]
    async fn missing_api_key_yields_empty_summary() {
        let client = GoogleVisionClient::new(None, 15);
        let summary = client.analyze("http://localhost/items/x.jpg").await;
        assert!(summary.is_empty());
    }
}

//! Blocking client for the sample persistence service.
//!
//! The service stores an image blob plus a label-file blob per sample and
//! serves the image bytes back under `<base_url>/<image_path>`. All calls
//! are synchronous and leave local editor state untouched on failure, so a
//! failed save or delete can simply be retried.

use image::RgbaImage;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::format::LabelRecord;

/// Errors from sample API calls.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Request failed or the server answered with an error status
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Fetched image bytes could not be decoded
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
}

/// One row of the sample listing.
#[derive(Debug, Clone, Deserialize)]
pub struct SampleSummary {
    pub sample_id: u64,
    pub image_path: String,
    #[serde(default)]
    pub create_at: Option<String>,
}

/// Response of `GET /samples?page=&size=`.
#[derive(Debug, Clone, Deserialize)]
pub struct SamplePage {
    pub samples: Vec<SampleSummary>,
    pub total_samples: u64,
    pub total_pages: u64,
}

/// Response of `GET /samples/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SampleDetail {
    pub sample_id: u64,
    pub image_path: String,
    pub labels: Vec<LabelRecord>,
}

#[derive(Debug, Clone, Deserialize)]
struct CreatedSample {
    sample_id: u64,
}

/// Client for the sample API.
#[derive(Debug, Clone)]
pub struct SampleClient {
    base_url: String,
    http: Client,
}

impl SampleClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: Client::new(),
        }
    }

    /// Fetch one page of the sample listing.
    pub fn list_samples(&self, page: u32, size: u32) -> Result<SamplePage, ClientError> {
        let url = format!("{}/samples", self.base_url);
        log::debug!("GET {} page={} size={}", url, page, size);
        let page = self
            .http
            .get(&url)
            .query(&[("page", page), ("size", size)])
            .send()?
            .error_for_status()?
            .json::<SamplePage>()?;
        Ok(page)
    }

    /// Fetch a sample's image path and label records.
    pub fn get_sample(&self, sample_id: u64) -> Result<SampleDetail, ClientError> {
        let url = format!("{}/samples/{}", self.base_url, sample_id);
        log::debug!("GET {}", url);
        let detail = self
            .http
            .get(&url)
            .send()?
            .error_for_status()?
            .json::<SampleDetail>()?;
        Ok(detail)
    }

    /// Delete a sample.
    pub fn delete_sample(&self, sample_id: u64) -> Result<(), ClientError> {
        let url = format!("{}/samples/{}", self.base_url, sample_id);
        log::debug!("DELETE {}", url);
        self.http.delete(&url).send()?.error_for_status()?;
        log::info!("Deleted sample {}", sample_id);
        Ok(())
    }

    /// Create a sample from an image and serialized label text.
    ///
    /// Multipart body with fields `image` (binary) and `label` (text blob in
    /// the label-file format). Returns the new sample id.
    pub fn create_sample(
        &self,
        image_name: &str,
        image_bytes: Vec<u8>,
        label_text: String,
    ) -> Result<u64, ClientError> {
        let url = format!("{}/samples", self.base_url);
        log::debug!("POST {} image={} ({} bytes)", url, image_name, image_bytes.len());

        let form = create_form(image_name, image_bytes, label_text);
        let created = self
            .http
            .post(&url)
            .multipart(form)
            .send()?
            .error_for_status()?
            .json::<CreatedSample>()?;
        log::info!("Created sample {}", created.sample_id);
        Ok(created.sample_id)
    }

    /// Replace a sample's label file, leaving its image untouched.
    pub fn update_sample(&self, sample_id: u64, label_text: String) -> Result<(), ClientError> {
        let url = format!("{}/samples/{}", self.base_url, sample_id);
        log::debug!("PUT {}", url);

        let form = update_form(label_text);
        self.http
            .put(&url)
            .multipart(form)
            .send()?
            .error_for_status()?;
        log::info!("Updated labels for sample {}", sample_id);
        Ok(())
    }

    /// Fetch and decode a sample's image.
    pub fn fetch_image(&self, image_path: &str) -> Result<RgbaImage, ClientError> {
        let url = format!("{}/{}", self.base_url, image_path.trim_start_matches('/'));
        log::debug!("GET {}", url);
        let bytes = self.http.get(&url).send()?.error_for_status()?.bytes()?;
        let image = image::load_from_memory(&bytes)?.to_rgba8();
        Ok(image)
    }
}

/// Multipart body for `POST /samples`: `image` (binary) + `label` (text).
///
/// Both parts carry file names; the service rejects unnamed parts and keys
/// the stored file's extension off the image name.
fn create_form(image_name: &str, image_bytes: Vec<u8>, label_text: String) -> Form {
    Form::new()
        .part(
            "image",
            Part::bytes(image_bytes).file_name(image_name.to_string()),
        )
        .part("label", Part::text(label_text).file_name("label.txt"))
}

/// Multipart body for `PUT /samples/{id}`: `label` only.
fn update_form(label_text: String) -> Form {
    Form::new().part("label", Part::text(label_text).file_name("label.txt"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format;
    use crate::model::{AnnotationSet, LabelRef, Point, Shape};

    #[test]
    fn test_sample_page_deserializes_service_response() {
        let json = r#"{
            "page": 0,
            "size": 10,
            "total_samples": 2,
            "total_pages": 1,
            "samples": [
                {"sample_id": 1, "image_path": "uploads/images/a.png", "create_at": "2024-01-01 10:00:00"},
                {"sample_id": 2, "image_path": "uploads/images/b.png", "create_at": null}
            ]
        }"#;
        let page: SamplePage = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_samples, 2);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.samples[0].sample_id, 1);
        assert!(page.samples[1].create_at.is_none());
    }

    #[test]
    fn test_sample_detail_deserializes_label_records() {
        let json = r#"{
            "sample_id": 7,
            "image_path": "uploads/images/c.png",
            "labels": [
                {"class_id": 3, "polygon": [[0.1, 0.1], [0.4, 0.1], [0.4, 0.4], [0.1, 0.4], [0.1, 0.1]]}
            ]
        }"#;
        let detail: SampleDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.sample_id, 7);
        assert_eq!(detail.labels.len(), 1);
        assert_eq!(detail.labels[0].class_id, 3);
        assert_eq!(detail.labels[0].polygon.len(), 5);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = SampleClient::new("http://localhost:5000/");
        assert_eq!(client.base_url, "http://localhost:5000");
    }

    #[test]
    fn test_create_form_from_serialized_set() {
        // Serialize → multipart, the save pipeline of a new sample
        let catalog = crate::model::default_catalog();
        let shape = Shape::start_bounding_box(LabelRef::Known(3), Point::new(0.1, 0.1))
            .with_box_corner(Point::new(0.4, 0.4));
        let set = AnnotationSet::from_shapes(vec![shape]);
        let label_text = format::serialize(&set, &catalog).unwrap();
        assert!(label_text.starts_with("3 "));

        let form = create_form("card.png", vec![0x89, b'P', b'N', b'G'], label_text);
        assert!(!form.boundary().is_empty());
    }

    #[test]
    fn test_update_form_builds() {
        let form = update_form("0 0.1 0.1 0.4 0.1 0.4 0.4 0.1 0.4 0.1 0.1".to_string());
        assert!(!form.boundary().is_empty());
    }
}

use crate::compress::{CompressionOptions, ImageCompressor, ImageDecoder, ImageEncoder, NativeCodec};
use crate::extract::extract_verdict;
use crate::request::AnalysisRequest;
use crate::{AnalysisError, AnalysisResult, RawImage};
use app_state::AppSettings;
use language_model::{GeminiClient, GenerateContentRequest};
use tracing::info;

/// Image in, verdict out: compress, ask the model, read its answer.
pub struct LeafAnalyzer<D = NativeCodec, E = NativeCodec> {
    client: GeminiClient,
    compressor: ImageCompressor<D, E>,
}

impl LeafAnalyzer {
    #[must_use]
    pub fn new(client: GeminiClient, options: CompressionOptions) -> Self {
        Self::with_compressor(client, ImageCompressor::native(options))
    }

    pub fn from_settings(settings: &AppSettings) -> Result<Self, AnalysisError> {
        let client = GeminiClient::with_api_key(&settings.secrets.gemini_api_key)
            .base_url(settings.gemini.base_url.as_str())
            .model(settings.gemini.model.as_str())
            .build();
        let options = CompressionOptions::try_from(&settings.compression)?;
        Ok(Self::new(client, options))
    }
}

impl<D: ImageDecoder, E: ImageEncoder> LeafAnalyzer<D, E> {
    #[must_use]
    pub fn with_compressor(client: GeminiClient, compressor: ImageCompressor<D, E>) -> Self {
        Self { client, compressor }
    }

    /// Entry point for images that arrive as `data:<mime>;base64,<payload>`.
    pub async fn analyze_data_url(&self, data_url: &str) -> Result<AnalysisResult, AnalysisError> {
        let image = RawImage::from_data_url(data_url)?;
        self.analyze(&image).await
    }

    pub async fn analyze(&self, image: &RawImage) -> Result<AnalysisResult, AnalysisError> {
        let compressed = self.compressor.compress(image)?;
        let request = AnalysisRequest::from_data_url(&compressed.to_data_url())?;

        info!(
            "Asking {} about a {}x{} leaf image",
            self.client.model(),
            compressed.width,
            compressed.height
        );
        let response = self
            .client
            .generate_content(&GenerateContentRequest::from(request))
            .await?;

        let verdict = extract_verdict(&response)?;
        info!(
            "Verdict: {} ({}%)",
            verdict.label,
            verdict.confidence_percent()
        );
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use language_model::RATE_LIMIT_MESSAGE;
    use mockito::{Matcher, Server};
    use std::io::Cursor;

    const ENDPOINT: &str = "/v1beta/models/gemini-test:generateContent";

    fn leaf_png(width: u32, height: u32) -> color_eyre::Result<RawImage> {
        let img = RgbImage::from_fn(width, height, |x, _| Rgb([40, (x % 200) as u8 + 55, 30]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(RawImage::from_bytes(bytes))
    }

    fn analyzer(server: &Server) -> LeafAnalyzer {
        let client = GeminiClient::with_api_key("test-key")
            .base_url(server.url())
            .model("gemini-test")
            .build();
        LeafAnalyzer::new(client, CompressionOptions::default())
    }

    fn model_answer(text: &str) -> String {
        serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn full_round_trip() -> color_eyre::Result<()> {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", ENDPOINT)
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::Regex(
                r#""mime_type":"image/jpeg","data":"/9j/"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(model_answer(
                "```json\n{\"label\":\"Tizón tardío\",\"confidence\":1.3,\"explanation\":\"Lesiones húmedas\",\"recommendations\":[\"Aplicar fungicida\",\"Eliminar plantas\"]}\n```",
            ))
            .expect(1)
            .create_async()
            .await;

        let verdict = analyzer(&server)
            .analyze_data_url(&leaf_png(1600, 800)?.to_data_url())
            .await?;

        mock.assert_async().await;
        assert_eq!(verdict.label, "Tizón tardío");
        assert!((verdict.confidence - 1.0).abs() < f64::EPSILON);
        assert_eq!(verdict.recommendations.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_data_url_never_reaches_the_network() {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

        let err = analyzer(&server)
            .analyze_data_url("not-a-data-url")
            .await
            .expect_err("malformed");

        assert_eq!(err.kind(), ErrorKind::MalformedImageEncoding);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn undecodable_image_never_reaches_the_network() {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

        let err = analyzer(&server)
            .analyze(&RawImage::new(b"GIF89a broken".to_vec(), "image/gif"))
            .await
            .expect_err("broken image");

        assert_eq!(err.kind(), ErrorKind::Decode);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rate_limit_surfaces_fixed_message() -> color_eyre::Result<()> {
        let mut server = Server::new_async().await;
        server
            .mock("POST", ENDPOINT)
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body(r#"{"error":{"message":"Quota exceeded for metric"}}"#)
            .create_async()
            .await;

        let err = analyzer(&server)
            .analyze(&leaf_png(300, 200)?)
            .await
            .expect_err("rate limited");

        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert_eq!(err.to_string(), RATE_LIMIT_MESSAGE);
        Ok(())
    }

    #[tokio::test]
    async fn server_error_without_body_uses_status() -> color_eyre::Result<()> {
        let mut server = Server::new_async().await;
        server
            .mock("POST", ENDPOINT)
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let err = analyzer(&server)
            .analyze(&leaf_png(300, 200)?)
            .await
            .expect_err("503");

        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(err.to_string(), "Error de Gemini API: Error 503");
        Ok(())
    }

    #[tokio::test]
    async fn candidate_without_text_is_empty_response() -> color_eyre::Result<()> {
        let mut server = Server::new_async().await;
        server
            .mock("POST", ENDPOINT)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"candidates":[{"finishReason":"MAX_TOKENS","content":{}}]}"#)
            .create_async()
            .await;

        let err = analyzer(&server)
            .analyze(&leaf_png(300, 200)?)
            .await
            .expect_err("no text");

        assert_eq!(err.kind(), ErrorKind::EmptyResponse);
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_without_key() -> color_eyre::Result<()> {
        let client = GeminiClient::with_api_key("SUPER-SECRET-KEY")
            .base_url("http://127.0.0.1:1")
            .model("gemini-test")
            .build();
        let analyzer = LeafAnalyzer::new(client, CompressionOptions::default());

        let err = analyzer
            .analyze(&leaf_png(10, 10)?)
            .await
            .expect_err("connection refused");

        assert_eq!(err.kind(), ErrorKind::Transport);
        let message = err.to_string();
        assert!(message.starts_with("Error de comunicación con Gemini API: "));
        assert!(!message.contains("SUPER-SECRET-KEY"), "{message}");
        Ok(())
    }

    #[tokio::test]
    async fn non_json_success_body_is_transport() -> color_eyre::Result<()> {
        let mut server = Server::new_async().await;
        server
            .mock("POST", ENDPOINT)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>gateway page</html>")
            .create_async()
            .await;

        let err = analyzer(&server)
            .analyze(&leaf_png(300, 200)?)
            .await
            .expect_err("undecodable body");

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(!err.to_string().contains("test-key"));
        Ok(())
    }
}

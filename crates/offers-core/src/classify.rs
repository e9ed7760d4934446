//! Relevance scoring using fastembed
//!
//! A label is rendered into a hypothesis sentence ("This example is X.")
//! and scored against the offer text. Cross-encoders read the pair
//! together, the way an entailment model would; bi-encoders compare two
//! independent embeddings.

use fastembed::{
    EmbeddingModel, InitOptions, RerankInitOptions, RerankerModel, TextEmbedding, TextRerank,
};

use crate::{Config, OffersError, Result};

/// Scores how well a text belongs to a label.
pub trait Classifier {
    /// Confidence in `[0, 1]` that `text` is about `label`.
    fn score(&self, text: &str, label: &str) -> Result<f32>;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn score(&self, text: &str, label: &str) -> Result<f32> {
        (**self).score(text, label)
    }
}

/// Which fastembed model family a configured name refers to.
#[derive(Debug, Clone)]
pub enum Backend {
    CrossEncoder(RerankerModel),
    BiEncoder(EmbeddingModel),
}

/// Map a configured model name to a fastembed model.
pub fn resolve_backend(name: &str) -> Result<Backend> {
    let backend = match name {
        // Cross-encoders (default)
        "bge-reranker-base" => Backend::CrossEncoder(RerankerModel::BGERerankerBase),
        "bge-reranker-v2-m3" => Backend::CrossEncoder(RerankerModel::BGERerankerV2M3),
        "jina-reranker-v1-turbo-en" => Backend::CrossEncoder(RerankerModel::JINARerankerV1TurboEn),
        // Bi-encoders
        "all-MiniLM-L6-v2" => Backend::BiEncoder(EmbeddingModel::AllMiniLML6V2),
        "all-MiniLM-L12-v2" => Backend::BiEncoder(EmbeddingModel::AllMiniLML12V2),
        "bge-small-en-v1.5" => Backend::BiEncoder(EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Backend::BiEncoder(EmbeddingModel::BGEBaseENV15),
        other => {
            return Err(OffersError::Classifier(format!(
                "Unknown model: {}. Supported: bge-reranker-base, bge-reranker-v2-m3, \
                 jina-reranker-v1-turbo-en, all-MiniLM-L6-v2, all-MiniLM-L12-v2, \
                 bge-small-en-v1.5, bge-base-en-v1.5",
                other
            )));
        }
    };
    Ok(backend)
}

/// Load the classifier named in the config.
///
/// Downloads the model on first use.
pub fn load_classifier(config: &Config) -> Result<Box<dyn Classifier>> {
    tracing::info!(model = %config.model, "Loading relevance model");
    let classifier: Box<dyn Classifier> = match resolve_backend(&config.model)? {
        Backend::CrossEncoder(model) => Box::new(ZeroShotClassifier::new(
            model,
            config.hypothesis_template.clone(),
        )?),
        Backend::BiEncoder(model) => Box::new(SimilarityClassifier::new(
            model,
            config.hypothesis_template.clone(),
        )?),
    };
    Ok(classifier)
}

fn render_hypothesis(template: &str, label: &str) -> String {
    template.replacen("{}", label, 1)
}

/// Cross-encoder scoring of (hypothesis, text) pairs.
pub struct ZeroShotClassifier {
    model: TextRerank,
    template: String,
}

impl ZeroShotClassifier {
    pub fn new(model: RerankerModel, template: String) -> Result<Self> {
        let model = TextRerank::try_new(
            RerankInitOptions::new(model).with_show_download_progress(true),
        )
        .map_err(|e| OffersError::Classifier(e.to_string()))?;

        Ok(Self { model, template })
    }
}

impl Classifier for ZeroShotClassifier {
    fn score(&self, text: &str, label: &str) -> Result<f32> {
        let hypothesis = render_hypothesis(&self.template, label);
        let results = self
            .model
            .rerank(hypothesis.as_str(), vec![text], false, None)
            .map_err(|e| OffersError::Classifier(e.to_string()))?;

        let logit = results
            .first()
            .map(|r| r.score)
            .ok_or_else(|| OffersError::Classifier("No score returned".to_string()))?;

        Ok(sigmoid(logit))
    }
}

/// Bi-encoder scoring by cosine similarity.
pub struct SimilarityClassifier {
    model: TextEmbedding,
    template: String,
}

impl SimilarityClassifier {
    pub fn new(model: EmbeddingModel, template: String) -> Result<Self> {
        let model =
            TextEmbedding::try_new(InitOptions::new(model).with_show_download_progress(true))
                .map_err(|e| OffersError::Classifier(e.to_string()))?;

        Ok(Self { model, template })
    }
}

impl Classifier for SimilarityClassifier {
    fn score(&self, text: &str, label: &str) -> Result<f32> {
        let hypothesis = render_hypothesis(&self.template, label);
        let embeddings = self
            .model
            .embed(vec![text, hypothesis.as_str()], None)
            .map_err(|e| OffersError::Classifier(e.to_string()))?;

        match embeddings.as_slice() {
            [a, b] => Ok(cosine(a, b).clamp(0.0, 1.0)),
            _ => Err(OffersError::Classifier(format!(
                "Expected 2 embeddings, got {}",
                embeddings.len()
            ))),
        }
    }
}

/// Logistic function, maps a raw logit into `(0, 1)`.
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Cosine similarity; zero vectors score 0.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

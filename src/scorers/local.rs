//! Local RoBERTa sentiment classifier run with candle.

use anyhow::{Context, Result};
use async_trait::async_trait;
use candle_core::{D, DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config, XLMRobertaForSequenceClassification};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokenizers::Tokenizer;
use tokenizers::models::bpe::BPE;
use tokenizers::pre_tokenizers::byte_level::ByteLevel;
use tokenizers::processors::roberta::RobertaProcessing;
use tracing::{debug, info};

use super::traits::{ChunkScorer, ScorerError};
use crate::config::LocalModelConfig;
use crate::sentiment::{ScoreVector, SentimentClass};

/// RoBERTa reserves two positions past the padding index.
const POSITION_OFFSET: usize = 2;

struct Inner {
    model: XLMRobertaForSequenceClassification,
    tokenizer: Tokenizer,
    device: Device,
    /// class for each logit index
    labels: [SentimentClass; 3],
    max_tokens: usize,
}

pub struct LocalScorer {
    inner: Arc<Inner>,
    model_id: String,
}

/// Files needed to build the classifier.
struct ModelFiles {
    config: PathBuf,
    tokenizer: TokenizerSource,
    weights: PathBuf,
}

/// Older checkpoints ship only the raw byte-level BPE files.
#[derive(Debug, PartialEq)]
enum TokenizerSource {
    Json(PathBuf),
    Bpe { vocab: PathBuf, merges: PathBuf },
}

impl LocalScorer {
    pub fn new(cfg: &LocalModelConfig) -> Result<Self> {
        let device = select_device(cfg.use_metal);
        let files = match &cfg.model_path {
            Some(dir) => local_files(Path::new(dir))?,
            None => download_files(&cfg.model_id)?,
        };

        let tokenizer = load_tokenizer(&files.tokenizer)?;

        let config_str =
            std::fs::read_to_string(&files.config).context("Failed to read config.json")?;
        let mut raw_config: Value =
            serde_json::from_str(&config_str).context("Failed to parse config.json")?;
        fill_roberta_defaults(&mut raw_config);
        let labels = labels_from_config(&raw_config)?;
        let config: Config =
            serde_json::from_value(raw_config).context("Unsupported model config.json")?;
        let max_tokens = config
            .max_position_embeddings
            .saturating_sub(POSITION_OFFSET)
            .max(2);

        let vb = if files.weights.extension().is_some_and(|e| e == "safetensors") {
            unsafe { VarBuilder::from_mmaped_safetensors(&[&files.weights], DType::F32, &device)? }
        } else {
            VarBuilder::from_pth(&files.weights, DType::F32, &device)?
        };
        let model = XLMRobertaForSequenceClassification::new(labels.len(), &config, vb)?;

        info!(
            "Loaded local sentiment model {} (max_tokens={}, device={:?})",
            cfg.model_id, max_tokens, device
        );

        Ok(Self {
            inner: Arc::new(Inner {
                model,
                tokenizer,
                device,
                labels,
                max_tokens,
            }),
            model_id: cfg.model_id.clone(),
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

impl Inner {
    fn predict(&self, text: &str) -> Result<ScoreVector, ScorerError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| ScorerError::Model(format!("Tokenization failed: {}", e)))?;

        let len = encoding.get_ids().len().min(self.max_tokens);
        let mut ids = encoding.get_ids()[..len].to_vec();
        let mask = encoding.get_attention_mask()[..len].to_vec();
        // keep the closing </s> when the text was cut
        if len < encoding.get_ids().len()
            && let (Some(last), Some(&eos)) = (ids.last_mut(), encoding.get_ids().last())
        {
            *last = eos;
        }
        let type_ids = vec![0u32; len];

        let input_ids = Tensor::new(ids.as_slice(), &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(mask.as_slice(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = Tensor::new(type_ids.as_slice(), &self.device)?.unsqueeze(0)?;

        let logits = self
            .model
            .forward(&input_ids, &attention_mask, &token_type_ids)?;
        let probs = candle_nn::ops::softmax(&logits, D::Minus1)?
            .squeeze(0)?
            .to_vec1::<f32>()?;

        let mut ordered = [0.0f64; 3];
        for (index, class) in self.labels.iter().enumerate() {
            let p = probs.get(index).copied().ok_or_else(|| {
                ScorerError::Model(format!("model returned {} logits", probs.len()))
            })?;
            ordered[*class as usize] = p as f64;
        }
        Ok(ScoreVector::from_ordered(ordered))
    }
}

#[async_trait]
impl ChunkScorer for LocalScorer {
    async fn score(&self, chunk: &str) -> Result<ScoreVector, ScorerError> {
        debug!(chars = chunk.len(), "Scoring chunk with local model");
        let inner = Arc::clone(&self.inner);
        let chunk = chunk.to_string();
        tokio::task::spawn_blocking(move || inner.predict(&chunk))
            .await
            .map_err(|e| ScorerError::Model(format!("inference task failed: {}", e)))?
    }

    fn name(&self) -> &str {
        "local"
    }
}

fn select_device(use_metal: bool) -> Device {
    #[cfg(feature = "metal")]
    let device = if use_metal {
        Device::new_metal(0).unwrap_or(Device::Cpu)
    } else {
        Device::Cpu
    };
    #[cfg(not(feature = "metal"))]
    let device = {
        let _ = use_metal;
        Device::Cpu
    };
    device
}

/// Older RoBERTa checkpoints omit fields the candle config requires.
fn fill_roberta_defaults(config: &mut Value) {
    let Some(obj) = config.as_object_mut() else {
        return;
    };
    let defaults = [
        ("position_embedding_type", Value::from("absolute")),
        ("pad_token_id", Value::from(1)),
        ("type_vocab_size", Value::from(1)),
        ("layer_norm_eps", Value::from(1e-5)),
        ("hidden_act", Value::from("gelu")),
    ];
    for (key, value) in defaults {
        obj.entry(key).or_insert(value);
    }
}

fn load_tokenizer(source: &TokenizerSource) -> Result<Tokenizer> {
    match source {
        TokenizerSource::Json(path) => Tokenizer::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e)),
        TokenizerSource::Bpe { vocab, merges } => {
            let vocab = vocab.to_str().context("Non UTF-8 vocab path")?;
            let merges = merges.to_str().context("Non UTF-8 merges path")?;
            let bpe = BPE::from_file(vocab, merges)
                .build()
                .map_err(|e| anyhow::anyhow!("Failed to build BPE tokenizer: {}", e))?;
            let mut tokenizer = Tokenizer::new(bpe);
            let cls = tokenizer.token_to_id("<s>").unwrap_or(0);
            let sep = tokenizer.token_to_id("</s>").unwrap_or(2);
            tokenizer
                .with_pre_tokenizer(Some(ByteLevel::new(false, true, true)))
                .with_post_processor(Some(RobertaProcessing::new(
                    ("</s>".to_string(), sep),
                    ("<s>".to_string(), cls),
                )));
            Ok(tokenizer)
        }
    }
}

fn local_files(dir: &Path) -> Result<ModelFiles> {
    let weights = ["model.safetensors", "pytorch_model.bin"]
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
        .with_context(|| format!("No model weights found in {}", dir.display()))?;
    let tokenizer = if dir.join("tokenizer.json").exists() {
        TokenizerSource::Json(dir.join("tokenizer.json"))
    } else if dir.join("vocab.json").exists() && dir.join("merges.txt").exists() {
        TokenizerSource::Bpe {
            vocab: dir.join("vocab.json"),
            merges: dir.join("merges.txt"),
        }
    } else {
        anyhow::bail!(
            "No tokenizer.json or vocab.json/merges.txt in {}",
            dir.display()
        );
    };
    Ok(ModelFiles {
        config: dir.join("config.json"),
        tokenizer,
        weights,
    })
}

fn download_files(model_id: &str) -> Result<ModelFiles> {
    let api = hf_hub::api::sync::Api::new().context("Failed to create Hugging Face API client")?;
    let repo = api.model(model_id.to_string());
    let config = repo.get("config.json").context("Failed to fetch config.json")?;
    let tokenizer = match repo.get("tokenizer.json") {
        Ok(path) => TokenizerSource::Json(path),
        Err(e) => {
            debug!("tokenizer.json unavailable for {} ({}), using vocab.json/merges.txt", model_id, e);
            TokenizerSource::Bpe {
                vocab: repo.get("vocab.json").context("Failed to fetch vocab.json")?,
                merges: repo.get("merges.txt").context("Failed to fetch merges.txt")?,
            }
        }
    };
    let weights = repo
        .get("model.safetensors")
        .or_else(|_| repo.get("pytorch_model.bin"))
        .context("Failed to fetch model weights")?;
    Ok(ModelFiles {
        config,
        tokenizer,
        weights,
    })
}

/// Map logit indices to classes using `id2label` from config.json.
///
/// Named labels ("negative", "Neutral", ...) are honoured; generic `LABEL_n`
/// names fall back to negative/neutral/positive order.
pub fn labels_from_config(config: &Value) -> Result<[SentimentClass; 3]> {
    let Some(id2label) = config.get("id2label").and_then(|v| v.as_object()) else {
        return Ok(SentimentClass::ALL);
    };
    if id2label.len() != 3 {
        anyhow::bail!(
            "Expected a 3-class sentiment model, config has {} labels",
            id2label.len()
        );
    }

    let mut labels = SentimentClass::ALL;
    let mut named = 0;
    for (id, name) in id2label {
        let index: usize = id
            .parse()
            .with_context(|| format!("Invalid id2label key '{}'", id))?;
        if index >= 3 {
            anyhow::bail!("id2label index {} out of range", index);
        }
        if let Some(class) = name.as_str().and_then(SentimentClass::from_name) {
            labels[index] = class;
            named += 1;
        }
    }

    if named == 0 {
        return Ok(SentimentClass::ALL);
    }
    if named != 3 {
        anyhow::bail!("id2label mixes named and generic labels");
    }
    let mut seen = labels.to_vec();
    seen.sort();
    seen.dedup();
    if seen.len() != 3 {
        anyhow::bail!("id2label repeats a sentiment class");
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generic_labels_use_enumeration_order() {
        let cfg = json!({"id2label": {"0": "LABEL_0", "1": "LABEL_1", "2": "LABEL_2"}});
        assert_eq!(labels_from_config(&cfg).unwrap(), SentimentClass::ALL);
        assert_eq!(labels_from_config(&json!({})).unwrap(), SentimentClass::ALL);
    }

    #[test]
    fn named_labels_are_mapped() {
        let cfg = json!({"id2label": {"0": "positive", "1": "Negative", "2": "neutral"}});
        assert_eq!(
            labels_from_config(&cfg).unwrap(),
            [
                SentimentClass::Positive,
                SentimentClass::Negative,
                SentimentClass::Neutral
            ]
        );
    }

    #[test]
    fn rejects_non_three_class_models() {
        let cfg = json!({"id2label": {"0": "NEG", "1": "POS"}});
        assert!(labels_from_config(&cfg).is_err());
        let cfg = json!({"id2label": {"0": "positive", "1": "positive", "2": "neutral"}});
        assert!(labels_from_config(&cfg).is_err());
    }

    #[test]
    fn fills_missing_config_fields_only() {
        let mut cfg = json!({"pad_token_id": 0, "vocab_size": 50265});
        fill_roberta_defaults(&mut cfg);
        assert_eq!(cfg["pad_token_id"], 0);
        assert_eq!(cfg["position_embedding_type"], "absolute");
        assert_eq!(cfg["type_vocab_size"], 1);
    }

    #[test]
    fn missing_model_dir_is_an_error() {
        assert!(local_files(Path::new("/nonexistent/model/dir")).is_err());
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "journal-sentiment-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_bpe_files(dir: &Path) {
        std::fs::write(
            dir.join("vocab.json"),
            r#"{"<s>": 0, "<pad>": 1, "</s>": 2, "h": 3, "i": 4, "hi": 5}"#,
        )
        .unwrap();
        std::fs::write(dir.join("merges.txt"), "#version: 0.2\nh i\n").unwrap();
    }

    #[test]
    fn model_dir_without_tokenizer_json_uses_bpe_files() {
        let dir = scratch_dir("bpe-dir");
        write_bpe_files(&dir);
        std::fs::write(dir.join("pytorch_model.bin"), b"").unwrap();

        let files = local_files(&dir).unwrap();
        assert_eq!(
            files.tokenizer,
            TokenizerSource::Bpe {
                vocab: dir.join("vocab.json"),
                merges: dir.join("merges.txt"),
            }
        );
        assert_eq!(files.weights, dir.join("pytorch_model.bin"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn bpe_tokenizer_wraps_ids_in_roberta_markers() {
        let dir = scratch_dir("bpe-encode");
        write_bpe_files(&dir);
        let tokenizer = load_tokenizer(&TokenizerSource::Bpe {
            vocab: dir.join("vocab.json"),
            merges: dir.join("merges.txt"),
        })
        .unwrap();

        let encoding = tokenizer.encode("hi", true).unwrap();
        assert_eq!(encoding.get_ids(), &[0, 5, 2]);
        std::fs::remove_dir_all(&dir).ok();
    }
}

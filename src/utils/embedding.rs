use anyhow::{anyhow, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingUsage};
use async_openai::Client;
use async_trait::async_trait;

/// Vector of floats representing an embedding.
pub type EmbedVec = Vec<f32>;

/// Trait for getting the embedding dimension.
pub trait GetEmbedDim {
    /// The dimension of the produced vectors, when known up front.
    fn embedding_dim(&self) -> Option<usize>;
}

/// Trait for embedding a string and outputting the embedding vector and extra info.
#[async_trait]
pub trait AsyncEmbed: GetEmbedDim {
    type OutputExtra;
    async fn embed(&self, string: impl Into<String> + Send) -> Result<(EmbedVec, Self::OutputExtra)>;
}

/// Trait for embedding a string and outputting only the embedding vector.
#[async_trait]
pub trait AsyncSimplyEmbed: GetEmbedDim {
    async fn embed(&self, string: impl Into<String> + Send) -> Result<EmbedVec>;
}

/// Blanket impl of AsyncSimplyEmbed for AsyncEmbed trait.
#[async_trait]
impl<T> AsyncSimplyEmbed for T
where
    T: AsyncEmbed + Sync,
    T::OutputExtra: Send,
{
    async fn embed(&self, string: impl Into<String> + Send) -> Result<EmbedVec> {
        AsyncEmbed::embed(self, string).await.map(|e| e.0)
    }
}

/// Embedding model from the OpenAI API.
#[derive(Clone, Debug)]
pub struct OpenAIEmbedding {
    pub client: Client<OpenAIConfig>,
    pub embedding_model: String,
}

impl OpenAIEmbedding {
    /// Create an embedder reading the API key from the `OPENAI_API_KEY` environment variable.
    pub fn new(embedding_model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            embedding_model: embedding_model.into(),
        }
    }

    pub fn with_client(client: Client<OpenAIConfig>, embedding_model: impl Into<String>) -> Self {
        Self {
            client,
            embedding_model: embedding_model.into(),
        }
    }

    /// Send a request to the OpenAI API to embed a string. Returns the embedding vector
    /// and embedding usage, or an error.
    async fn request_embed(&self, string: impl Into<String>) -> Result<(EmbedVec, EmbeddingUsage)> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.embedding_model.as_str())
            .input(string.into())
            .build()?;
        let mut response = self.client.embeddings().create(request).await?;
        let embedding = response
            .data
            .pop()
            .ok_or_else(|| anyhow!("embedding response carried no data"))?
            .embedding;
        Ok((embedding, response.usage))
    }
}

impl GetEmbedDim for OpenAIEmbedding {
    fn embedding_dim(&self) -> Option<usize> {
        match self.embedding_model.as_str() {
            "text-embedding-ada-002" => Some(1536),
            "text-embedding-3-small" => Some(1536),
            "text-embedding-3-large" => Some(3072),
            _ => None,
        }
    }
}

#[async_trait]
impl AsyncEmbed for OpenAIEmbedding {
    type OutputExtra = EmbeddingUsage;
    async fn embed(&self, string: impl Into<String> + Send) -> Result<(EmbedVec, Self::OutputExtra)> {
        self.request_embed(string).await
    }
}

#[cfg(test)]
mod test_embedding {
    use super::{GetEmbedDim, OpenAIEmbedding};

    #[test]
    fn test_known_dims() {
        let embedder = OpenAIEmbedding::new("text-embedding-3-small");
        assert_eq!(Some(1536), embedder.embedding_dim());
        let embedder = OpenAIEmbedding::new("some-future-model");
        assert_eq!(None, embedder.embedding_dim());
    }
}

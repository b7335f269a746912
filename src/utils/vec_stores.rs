//! Vector store pass-throughs for retrieval-augmented prompts.
//!
//! [MemoryVectorStore] keeps rows in a plain `Vec` and scores them by cosine;
//! it backs the tests and small offline corpora. [QdrantStore] (feature `qdrant`)
//! forwards the same operations to a hosted Qdrant collection and adds nothing
//! on top.

use crate::eval::cosine_similarity;
use crate::utils::embedding::EmbedVec;
use crate::utils::JsonMap;

/// One search result: the stored text, its metadata and the similarity score.
#[derive(Debug, Clone)]
pub struct ScoredHit {
    pub text: String,
    pub metadata: JsonMap,
    pub score: f32,
}

/// In-memory vector rows with cosine scoring.
#[derive(Debug, Clone, Default)]
pub struct MemoryVectorStore {
    rows: Vec<(String, JsonMap, EmbedVec)>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn upsert(&mut self, text: impl Into<String>, metadata: JsonMap, vector: EmbedVec) {
        self.rows.push((text.into(), metadata, vector));
    }

    /// The `top_k` most similar rows, best first.
    pub fn search_nearest(&self, vector: &[f32], top_k: usize) -> Vec<ScoredHit> {
        let mut hits: Vec<ScoredHit> = self
            .rows
            .iter()
            .map(|(text, metadata, row_vector)| ScoredHit {
                text: text.clone(),
                metadata: metadata.clone(),
                score: cosine_similarity(row_vector, vector),
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(top_k);
        hits
    }
}

#[cfg(feature = "qdrant")]
pub use self::qdrant::QdrantStore;

#[cfg(feature = "qdrant")]
mod qdrant {
    use anyhow::Result;
    use qdrant_client::prelude::{CreateCollection, Distance, QdrantClient, QdrantClientConfig, SearchPoints};
    use qdrant_client::qdrant::vectors_config::Config;
    use qdrant_client::qdrant::with_payload_selector::SelectorOptions::Enable;
    use qdrant_client::qdrant::{
        CollectionOperationResponse, PointStruct, ScoredPoint, VectorParams, VectorsConfig,
        WithPayloadSelector,
    };
    use url::Url;

    use crate::utils::embedding::EmbedVec;
    use crate::utils::JsonMap;

    /// Pass-through to a hosted Qdrant collection.
    pub struct QdrantStore {
        pub client: QdrantClient,
        pub collection: String,
    }

    impl QdrantStore {
        pub fn create_point(vector: EmbedVec, metadata: JsonMap) -> PointStruct {
            let metadata = metadata
                .into_iter()
                .map(|(key, val)| (key, val.into()))
                .collect();
            PointStruct {
                id: None,
                payload: metadata,
                vectors: Some(vector.into()),
            }
        }

        pub async fn new(collection: String, cluster_url: Url, api_key: String) -> Result<Self> {
            let mut config = QdrantClientConfig::from_url(cluster_url.as_str());
            config.set_api_key(&api_key);
            let client = QdrantClient::new(Some(config)).await?;
            Ok(Self { client, collection })
        }

        pub async fn create_simple_vector_collection(
            &self,
            collection_name: impl Into<String>,
            distance: Distance,
            vector_size: u64,
        ) -> Result<CollectionOperationResponse> {
            let create = CreateCollection {
                collection_name: collection_name.into(),
                vectors_config: Some(VectorsConfig {
                    config: Some(Config::Params(VectorParams {
                        size: vector_size,
                        distance: distance.into(),
                        hnsw_config: None,
                        quantization_config: None,
                    })),
                }),
                ..Default::default()
            };
            self.client.create_collection(&create).await
        }

        pub async fn upsert_point(&self, vector: EmbedVec, metadata: JsonMap) -> Result<()> {
            self.upsert_points(vec![(vector, metadata)]).await
        }

        pub async fn upsert_points(&self, points: Vec<(EmbedVec, JsonMap)>) -> Result<()> {
            let points = points
                .into_iter()
                .map(|(vector, metadata)| Self::create_point(vector, metadata))
                .collect();
            self.client
                .upsert_points(&self.collection, points, None)
                .await
                .map(|_| ())
        }

        pub async fn search_nearest_with_metadata(&self, vector: EmbedVec, top_k: u64) -> Result<Vec<ScoredPoint>> {
            self.client
                .search_points(&SearchPoints {
                    collection_name: self.collection.clone(),
                    vector,
                    filter: None,
                    limit: top_k,
                    with_payload: Some(WithPayloadSelector {
                        selector_options: Some(Enable(true)),
                    }),
                    params: None,
                    score_threshold: None,
                    offset: None,
                    vector_name: None,
                    with_vectors: None,
                    read_consistency: None,
                })
                .await
                .map(|response| response.result)
        }
    }
}

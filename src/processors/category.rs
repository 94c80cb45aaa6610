//! Domain category tagging.

use async_trait::async_trait;
use serde_json::Value;

use super::{ProcessingError, Processor};
use crate::domain::{ContentItem, Domain};

pub const NAME: &str = "category-tagger";
pub const CATEGORIES_KEY: &str = "categories";

/// Sorts items into the categories of a [`Domain`] profile
#[derive(Debug, Clone, Default)]
pub struct CategoryTagger {
    domain: Domain,
}

impl CategoryTagger {
    pub fn new(domain: Domain) -> Self {
        Self { domain }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }
}

#[async_trait]
impl Processor for CategoryTagger {
    fn name(&self) -> &str {
        NAME
    }

    async fn process_content(
        &self,
        items: Vec<ContentItem>,
    ) -> Result<Vec<ContentItem>, ProcessingError> {
        Ok(items
            .into_iter()
            .map(|mut item| {
                let categories = self.domain.categorize(&item.text());
                item.set_meta(NAME, CATEGORIES_KEY, Value::from(categories));
                item
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContentType;

    #[tokio::test]
    async fn test_research_categories() {
        let item = ContentItem::new(
            "https://arxiv.org/abs/2401.00001",
            ContentType::Research,
            "Evaluating LLM agents",
        )
        .unwrap()
        .with_description("A new benchmark for tool use");

        let out = CategoryTagger::new(Domain::Research)
            .process_single(item)
            .await
            .unwrap();
        assert_eq!(
            out.meta(NAME, CATEGORIES_KEY),
            Some(&serde_json::json!(["agents", "models", "evaluation"]))
        );
    }
}

//! URL layout of the site being harvested

use crate::config::TargetConfig;
use crate::storage::Category;
use url::Url;

/// Builds overview and page URLs for categories
#[derive(Debug, Clone)]
pub struct TargetSite {
    base: Url,
    category_param: String,
    page_param: String,
    uppercase: bool,
}

impl TargetSite {
    pub fn new(config: &TargetConfig) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(&config.base_url)?,
            category_param: config.category_param.clone(),
            page_param: config.page_param.clone(),
            uppercase: config.uppercase_categories,
        })
    }

    /// Name of the query parameter carrying the page number
    pub fn page_param(&self) -> &str {
        &self.page_param
    }

    fn category_value(&self, category: &Category) -> String {
        if self.uppercase {
            category.key().to_uppercase()
        } else {
            category.key().to_string()
        }
    }

    /// First listing of a category; its pagination reveals the last page
    pub fn overview_url(&self, category: &Category) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair(&self.category_param, &self.category_value(category));
        url
    }

    /// Page `page` (1-based) of a category
    pub fn page_url(&self, category: &Category, page: u32) -> Url {
        let mut url = self.overview_url(category);
        url.query_pairs_mut()
            .append_pair(&self.page_param, &page.to_string());
        url
    }
}

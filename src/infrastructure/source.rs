//! Business data source: JSON or CSV files and plain HTTP endpoints.

use crate::domain::models::without_nulls;
use crate::domain::{AppError, AppResult, Business, Category, Coordinates};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default, deserialize_with = "without_nulls")]
    business: Vec<Business>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    search: SearchResults,
}

/// Accepted JSON shapes, from a bare list to a full GraphQL response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BusinessPayload {
    List(Vec<Business>),
    Wrapped { businesses: Vec<Business> },
    Search { search: SearchResults },
    GraphQl { data: SearchData },
}

impl BusinessPayload {
    fn into_businesses(self) -> Vec<Business> {
        match self {
            BusinessPayload::List(businesses) => businesses,
            BusinessPayload::Wrapped { businesses } => businesses,
            BusinessPayload::Search { search } => search.business,
            BusinessPayload::GraphQl { data } => data.search.business,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CsvRecord {
    id: String,
    #[serde(default)]
    name: String,
    rating: Option<f64>,
    review_count: Option<u32>,
    price: Option<String>,
    categories: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    photo: Option<String>,
}

impl From<CsvRecord> for Business {
    fn from(record: CsvRecord) -> Self {
        let mut business = Business::new(record.id, record.name);
        business.rating = record.rating;
        business.review_count = record.review_count;
        business.price = record.price.filter(|p| !p.is_empty());
        business.categories = record
            .categories
            .unwrap_or_default()
            .split(';')
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .map(|title| Category { title: Some(title.to_string()) })
            .collect();
        business.photos = record.photo.into_iter().filter(|p| !p.is_empty()).collect();
        if record.latitude.is_some() || record.longitude.is_some() {
            business.coordinates = Some(Coordinates {
                latitude: record.latitude,
                longitude: record.longitude,
            });
        }
        business
    }
}

pub struct BusinessRepository;

impl BusinessRepository {
    /// Loads a result set, picking the format from the file extension.
    pub fn load_file(path: &Path) -> AppResult<Vec<Business>> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let businesses = match extension.as_str() {
            "json" => Self::parse_json(&fs::read_to_string(path)?)?,
            "csv" => Self::parse_csv(fs::File::open(path)?)?,
            other => return Err(AppError::UnsupportedFormat(format!("{} ({})", path.display(), other))),
        };
        info!(path = %path.display(), count = businesses.len(), "loaded businesses");
        Ok(businesses)
    }

    pub fn fetch_url(url: &str) -> AppResult<Vec<Business>> {
        let body = reqwest::blocking::get(url)?.error_for_status()?.text()?;
        let businesses = Self::parse_json(&body)?;
        info!(url, count = businesses.len(), "fetched businesses");
        Ok(businesses)
    }

    pub fn parse_json(content: &str) -> AppResult<Vec<Business>> {
        let payload: BusinessPayload = serde_json::from_str(content)?;
        Ok(dedupe(payload.into_businesses()))
    }

    pub fn parse_csv<R: std::io::Read>(reader: R) -> AppResult<Vec<Business>> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let businesses = reader
            .deserialize::<CsvRecord>()
            .map(|record| record.map(Business::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(dedupe(businesses))
    }
}

// Ids must be unique within a result set; the first occurrence wins.
fn dedupe(businesses: Vec<Business>) -> Vec<Business> {
    let mut seen = HashSet::new();
    businesses
        .into_iter()
        .filter(|business| {
            let fresh = seen.insert(business.id.clone());
            if !fresh {
                warn!(id = %business.id, "dropping duplicate business");
            }
            fresh
        })
        .collect()
}

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque identifier of a business in the current result set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessId(String);

impl BusinessId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BusinessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BusinessId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub title: Option<String>,
}

/// Reads an explicit `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a list that may itself be `null` or hold `null` entries.
pub(crate) fn without_nulls<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let entries = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(entries.into_iter().flatten().flatten().collect())
}

/// A search result as supplied by the data source. Never mutated by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub id: BusinessId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "without_nulls")]
    pub photos: Vec<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "without_nulls")]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl Business {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: BusinessId::new(id),
            name: name.into(),
            photos: Vec::new(),
            rating: None,
            review_count: None,
            price: None,
            categories: Vec::new(),
            coordinates: None,
        }
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.coordinates = Some(Coordinates {
            latitude: Some(latitude),
            longitude: Some(longitude),
        });
        self
    }

    /// The point this business can be placed at, if it has a complete and
    /// finite coordinate pair.
    pub fn location(&self) -> Option<LatLng> {
        let coordinates = self.coordinates?;
        let lat = coordinates.latitude?;
        let lng = coordinates.longitude?;
        (lat.is_finite() && lng.is_finite()).then(|| LatLng::new(lat, lng))
    }

    /// "price - category, category" with absent parts left out.
    pub fn category_line(&self) -> String {
        let categories = self
            .categories
            .iter()
            .filter_map(|c| c.title.as_deref())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        match (self.price.as_deref().filter(|p| !p.is_empty()), categories.is_empty()) {
            (Some(price), false) => format!("{} - {}", price, categories),
            (Some(price), true) => price.to_string(),
            (None, false) => categories,
            (None, true) => String::new(),
        }
    }

    /// Five-star rendering of the rating, rounded to the nearest half star.
    pub fn rating_stars(&self) -> Option<String> {
        let rating = self.rating.filter(|r| r.is_finite())?.clamp(0.0, 5.0);
        let halves = (rating * 2.0).round() as usize;
        let mut stars = "★".repeat(halves / 2);
        if halves % 2 == 1 {
            stars.push('⯪');
        }
        let filled = halves / 2 + halves % 2;
        stars.push_str(&"☆".repeat(5 - filled));
        Some(stars)
    }

    pub fn review_line(&self) -> Option<String> {
        let stars = self.rating_stars()?;
        Some(match self.review_count {
            Some(count) => format!("{} {} reviews", stars, count),
            None => stars,
        })
    }
}

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Car {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub mileage: i64,
    #[serde(default)]
    pub engine_type: String,
    #[serde(default)]
    pub engine_volume: f64,
    #[serde(default)]
    pub transmission: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Car {
    pub fn title(&self) -> String {
        format!("{} {}", self.make, self.model)
    }
}

/// Accepts RFC 3339 as well as the naive `YYYY-MM-DDTHH:MM:SS[.f]` form the
/// backend emits; anything else becomes `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct CarsPage {
    #[serde(default)]
    pub data: Vec<Car>,
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct MakeCount {
    pub make: Option<String>,
    pub count: u64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct CarStats {
    pub total_cars: u64,
    #[serde(default)]
    pub avg_price: f64,
    #[serde(default)]
    pub avg_year: f64,
    #[serde(default)]
    pub avg_mileage: f64,
    #[serde(default)]
    pub popular_makes: Vec<MakeCount>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ScraperAck {
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_page() {
        let body = r#"{
            "page": 2, "limit": 10, "total": 31, "total_pages": 4,
            "data": [{
                "id": "65f0", "make": "Toyota", "model": "Camry", "year": 2018,
                "price": 15500, "mileage": 82000, "engine_type": "petrol",
                "engine_volume": 2.5, "transmission": "automatic",
                "location": "Kyiv", "image_url": null,
                "url": "https://auto.ria.com/x.html",
                "created_at": "2025-03-01T10:15:00.123000"
            }]
        }"#;
        let page: CarsPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.total_pages, 4);
        assert_eq!(page.data.len(), 1);
        let car = &page.data[0];
        assert_eq!(car.title(), "Toyota Camry");
        assert!(car.image_url.is_none());
        assert_eq!(
            car.created_at.unwrap().format("%Y-%m-%d %H:%M").to_string(),
            "2025-03-01 10:15"
        );
    }

    #[test]
    fn unparseable_timestamp_is_dropped() {
        let car: Car = serde_json::from_str(r#"{"created_at": "yesterday"}"#).unwrap();
        assert!(car.created_at.is_none());
    }

    #[test]
    fn stats_tolerate_missing_makes() {
        let stats: CarStats =
            serde_json::from_str(r#"{"total_cars": 3, "avg_price": 12000, "avg_year": 2015, "avg_mileage": 90000}"#)
                .unwrap();
        assert_eq!(stats.total_cars, 3);
        assert!(stats.popular_makes.is_empty());
    }
}
